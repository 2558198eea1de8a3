use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::exchanger::{BUSY, EMPTY, WAITING};

use super::*;

#[test]
fn stamped_read_write() {
    let stamped: AtomicStampedRef<i32> = AtomicStampedRef::new(None, 0);
    assert_eq!(stamped.get(), None);
    assert_eq!(stamped.stamp(), 0);

    stamped.set(Some(5), 3);
    assert_eq!(stamped.get(), Some(5));
    assert_eq!(stamped.stamp(), 3);

    let guard = &crossbeam_epoch::pin();
    assert_eq!(stamped.load(guard), (3, Some(&5)));
}

#[test]
fn stamped_compare_and_set() {
    let stamped = AtomicStampedRef::new(Some(1), 0);
    let guard = &crossbeam_epoch::pin();

    // wrong stamp, no mutation
    assert!(!stamped.compare_and_set(Some(&1), Some(2), 7, 1, guard));
    assert_eq!(stamped.load(guard), (0, Some(&1)));

    // wrong value, no mutation
    assert!(!stamped.compare_and_set(Some(&9), Some(2), 0, 1, guard));
    assert_eq!(stamped.load(guard), (0, Some(&1)));

    // both match, value and stamp change together
    assert!(stamped.compare_and_set(Some(&1), Some(2), 0, 1, guard));
    assert_eq!(stamped.load(guard), (1, Some(&2)));

    // the expectation may also be the null value
    assert!(stamped.compare_and_set(Some(&2), None, 1, 2, guard));
    assert_eq!(stamped.load(guard), (2, None));
    assert!(stamped.compare_and_set(None, Some(3), 2, 0, guard));
    assert_eq!(stamped.load(guard), (0, Some(&3)));
}

#[test]
fn stamped_attempt_stamp() {
    let stamped = AtomicStampedRef::new(Some(1), 0);
    let guard = &crossbeam_epoch::pin();

    assert!(!stamped.attempt_stamp(Some(&9), 5, guard));
    assert_eq!(stamped.load(guard), (0, Some(&1)));

    // the current stamp is ignored, only the value must match
    assert!(stamped.attempt_stamp(Some(&1), 5, guard));
    assert_eq!(stamped.load(guard), (5, Some(&1)));
}

#[test]
fn stamped_single_cas_winner() {
    const THREADS: usize = 8;

    let stamped = Arc::new(AtomicStampedRef::new(Some(0), 0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let stamped = Arc::clone(&stamped);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let guard = &crossbeam_epoch::pin();
                stamped.compare_and_set(Some(&0), Some(id as i32 + 1), 0, 1, guard)
            })
        })
        .collect();

    let winners = handles.into_iter().map(|handle| handle.join().unwrap()).filter(|&won| won);
    assert_eq!(winners.count(), 1, "exactly one concurrent CAS must succeed");

    // all losers observe the post-update state on their next read
    assert_eq!(stamped.stamp(), 1);
    assert_ne!(stamped.get(), Some(0));
}

#[test]
fn exchanger_pairs_complementary_offers() {
    let exchanger = Arc::new(Exchanger::new());

    let handle = {
        let exchanger = Arc::clone(&exchanger);
        thread::spawn(move || exchanger.exchange(ExchangeOffer::Push(42), Duration::from_secs(5)))
    };
    let popped = exchanger.exchange(ExchangeOffer::<i32>::PopRequest, Duration::from_secs(5));

    assert_eq!(popped, Ok(ExchangeOffer::Push(42)));
    assert_eq!(handle.join().unwrap(), Ok(ExchangeOffer::PopRequest));
}

#[test]
fn exchanger_lone_offer_times_out() {
    let exchanger: Exchanger<i32> = Exchanger::new();
    let timeout = Duration::from_millis(20);

    let start = Instant::now();
    let res = exchanger.exchange(ExchangeOffer::Push(1), timeout);
    assert_matches!(res, Err(TimeoutError));
    assert!(start.elapsed() >= timeout);

    // the unanswered offer was retracted, the slot is empty again
    assert_eq!(exchanger.slot.stamp(), EMPTY);
    assert_eq!(exchanger.slot.get(), None);
}

#[test]
fn exchanger_retracted_offer_cannot_pair() {
    let exchanger: Exchanger<i32> = Exchanger::new();

    let res = exchanger.exchange(ExchangeOffer::Push(7), Duration::from_millis(10));
    assert_matches!(res, Err(TimeoutError));

    // a late-arriving second party finds no resident offer to pair with
    let res = exchanger.exchange(ExchangeOffer::PopRequest, Duration::from_millis(10));
    assert_matches!(res, Err(TimeoutError));
}

#[test]
fn exchanger_third_party_observes_busy() {
    let exchanger: Exchanger<i32> = Exchanger::new();

    // stage a first party's resident offer
    exchanger.slot.set(Some(ExchangeOffer::Push(1)), WAITING);

    // the second party commits and receives the resident offer immediately
    let res = exchanger.exchange(ExchangeOffer::Push(2), Duration::from_millis(100));
    assert_eq!(res, Ok(ExchangeOffer::Push(1)));

    // the slot now belongs to the pending pair until the first party collects
    // its payload; a third offer must neither pair nor disturb it
    let res = exchanger.exchange(ExchangeOffer::PopRequest, Duration::from_millis(20));
    assert_matches!(res, Err(TimeoutError));
    assert_eq!(exchanger.slot.stamp(), BUSY);
    assert_eq!(exchanger.slot.get(), Some(ExchangeOffer::Push(2)));
}

#[test]
fn elim_zero_capacity_fails_immediately() {
    let elim: EliminationArray<i32> = EliminationArray::new(0, Duration::from_secs(5));
    assert_eq!(elim.capacity(), 0);

    let start = Instant::now();
    let res = elim.visit(ExchangeOffer::Push(1));
    assert_matches!(res, Err(TimeoutError));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn elim_seeded_rngs_force_collision() {
    const SEED: u64 = 0xDECAF;

    let elim = Arc::new(EliminationArray::new(8, Duration::from_secs(5)));

    let handle = {
        let elim = Arc::clone(&elim);
        thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(SEED);
            elim.visit_with(ExchangeOffer::Push(7), &mut rng)
        })
    };
    let mut rng = StdRng::seed_from_u64(SEED);
    let res = elim.visit_with(ExchangeOffer::<i32>::PopRequest, &mut rng);

    // identical seeds select the identical slot, so the two visits must pair
    assert_eq!(res, Ok(ExchangeOffer::Push(7)));
    assert_eq!(handle.join().unwrap(), Ok(ExchangeOffer::PopRequest));
}

#[test]
fn pop_pairs_with_push_without_touching_top() {
    let config = Config::with_params(1, Duration::from_millis(50), EmptyPolicy::Retry);
    let stack = Arc::new(EliminationBackoffStack::with_config(config));

    let handle = {
        let stack = Arc::clone(&stack);
        thread::spawn(move || stack.pop())
    };

    // feed the popper through the single exchange slot; the stack's top
    // never becomes non-null
    loop {
        match stack.elim.visit(ExchangeOffer::Push(5)) {
            Ok(offer) => {
                assert_eq!(offer, ExchangeOffer::PopRequest);
                break;
            }
            Err(TimeoutError) => {}
        }
    }

    assert_eq!(handle.join().unwrap(), Ok(5));
    assert!(stack.is_empty());
}

#[test]
fn seq_stack_lifo() {
    let mut stack = SeqStack::new();
    stack.push(1);
    stack.push(2);
    stack.push(3);

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.peek(), Some(&3));
    assert_eq!(stack.pop(), Some(3));
    assert_eq!(stack.pop(), Some(2));
    assert_eq!(stack.pop(), Some(1));
    assert_eq!(stack.pop(), None);
    assert!(stack.is_empty());
}

#[test]
fn config_defaults_and_builder() {
    let config = Config::default();
    assert_eq!(config.capacity(), 100);
    assert_eq!(config.exchange_timeout(), Duration::from_millis(10));
    assert_eq!(config.empty_policy(), EmptyPolicy::FailFast);

    let config = ConfigBuilder::new()
        .capacity(4)
        .exchange_timeout(Duration::from_millis(1))
        .empty_policy(EmptyPolicy::Retry)
        .build();
    assert_eq!(config.capacity(), 4);
    assert_eq!(config.exchange_timeout(), Duration::from_millis(1));
    assert_eq!(config.empty_policy(), EmptyPolicy::Retry);
}
