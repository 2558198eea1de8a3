//! The elimination-backoff stack.
//!
//! The fast path is a classic Treiber stack: an atomic `top` pointer
//! manipulated with CAS, which gives linearizability without blocking as long
//! as contention stays low. Whenever a fast-path CAS loses its race the
//! operation falls back to the [`EliminationArray`], where a losing push and a
//! losing pop can pair up and complete by exchanging values directly, without
//! ever touching `top`. Lost fast-path races thereby turn into successful
//! pairwise eliminations instead of retries on the one hot pointer, which is
//! what lets the structure keep scaling once a plain CAS stack saturates.

use core::mem::ManuallyDrop;
use core::ptr;
use core::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned};

use crate::config::{Config, EmptyPolicy};
use crate::elim::EliminationArray;
use crate::errors::EmptyStackError;
use crate::exchanger::ExchangeOffer;

////////////////////////////////////////////////////////////////////////////////////////////////////
// Node
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A link in the chain of values reachable from `top`.
///
/// The value is immutable after construction and is moved out with
/// `ptr::read` when the node is popped, so the node's own drop code must
/// never touch it.
pub(crate) struct Node<T> {
    value: ManuallyDrop<T>,
    next: Atomic<Node<T>>,
}

/********** impl inherent *************************************************************************/

impl<T> Node<T> {
    #[inline]
    fn new(value: T) -> Self {
        Self { value: ManuallyDrop::new(value), next: Atomic::null() }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// EliminationBackoffStack
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An unbounded, linearizable, lock-free LIFO stack that backs off to an
/// elimination array under contention.
///
/// All operations may be invoked concurrently by any number of threads with
/// no external synchronization. `T` must be `Clone + PartialEq` because an
/// eliminated value travels through an exchange slot by value, where it is
/// compared by equality and cloned out by its receiver.
///
/// # Examples
///
/// ```
/// use elimstack::EliminationBackoffStack;
///
/// let stack = EliminationBackoffStack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.pop(), Ok(2));
/// assert_eq!(stack.pop(), Ok(1));
/// assert!(stack.pop().is_err());
/// ```
pub struct EliminationBackoffStack<T> {
    /// Top of the stack, null if empty.
    top: Atomic<Node<T>>,
    /// The rendezvous layer for operations that lost a fast-path race.
    pub(crate) elim: EliminationArray<T>,
    /// Behavior of `pop` on an empty stack.
    empty_policy: EmptyPolicy,
}

/********** impl inherent *************************************************************************/

impl<T: Clone + PartialEq> EliminationBackoffStack<T> {
    /// Creates a new, empty stack with the default configuration (100
    /// elimination slots, 10 ms exchange timeout, fail-fast empty pops).
    #[inline]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new, empty stack with the given configuration.
    #[inline]
    pub fn with_config(config: Config) -> Self {
        Self {
            top: Atomic::null(),
            elim: EliminationArray::new(config.capacity(), config.exchange_timeout()),
            empty_policy: config.empty_policy(),
        }
    }

    /// Pushes `value` on top of the stack.
    ///
    /// A push that wins its CAS on `top` is linearized at that CAS; a push
    /// that loses instead offers the value on the elimination array and, if a
    /// concurrent pop accepts it there, completes without `top` ever changing.
    /// This method never fails and blocks at most transiently, bounded by the
    /// configured exchange timeout per elimination attempt.
    pub fn push(&self, value: T) {
        let mut node = Owned::new(Node::new(value));

        loop {
            node = {
                let guard = &epoch::pin();
                match self.try_push(node, guard) {
                    Ok(()) => return,
                    Err(node) => node,
                }
            };

            match self.elim.visit(ExchangeOffer::Push((*node.value).clone())) {
                Ok(ExchangeOffer::PopRequest) => {
                    // a concurrent pop took the offered clone; the node never
                    // became reachable, so its own value is dropped here
                    unsafe { ManuallyDrop::drop(&mut node.value) };
                    return;
                }
                // a mismatched pairing (another push) or a timeout
                Ok(ExchangeOffer::Push(_)) | Err(_) => {}
            }
        }
    }

    /// Pops the value on top of the stack.
    ///
    /// A pop that wins its CAS on `top` is linearized at that CAS; a pop that
    /// loses instead requests a value on the elimination array and, if a
    /// concurrent push donates one there, completes without `top` ever
    /// changing.
    ///
    /// # Errors
    ///
    /// Under [`EmptyPolicy::FailFast`] this fails with [`EmptyStackError`] as
    /// soon as the fast path observes a null `top`. Under
    /// [`EmptyPolicy::Retry`] the empty observation is treated like a lost
    /// race and the pop keeps alternating between elimination attempts and
    /// the fast path until it obtains a value.
    pub fn pop(&self) -> Result<T, EmptyStackError> {
        loop {
            {
                let guard = &epoch::pin();
                match self.try_pop(guard) {
                    Ok(Some(value)) => return Ok(value),
                    // lost the race on `top`
                    Ok(None) => {}
                    Err(err) => {
                        if let EmptyPolicy::FailFast = self.empty_policy {
                            return Err(err);
                        }
                    }
                }
            }

            if let Ok(ExchangeOffer::Push(value)) = self.elim.visit(ExchangeOffer::PopRequest) {
                return Ok(value);
            }
        }
    }

    /// Returns `true` if the stack is currently observed to be empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        self.top.load(Acquire, guard).is_null()
    }

    /// Attempts the fast-path push once, returning the node back on a lost
    /// race.
    fn try_push(&self, mut node: Owned<Node<T>>, guard: &Guard) -> Result<(), Owned<Node<T>>> {
        let top = self.top.load(Relaxed, guard);
        node.next.store(top, Relaxed);

        // (TOP:1) this `Release` CAS synchronizes-with the `Acquire` load in (TOP:2)
        match self.top.compare_exchange(top, node, Release, Relaxed, guard) {
            Ok(_) => Ok(()),
            Err(fail) => Err(fail.new),
        }
    }

    /// Attempts the fast-path pop once.
    ///
    /// Returns `Ok(None)` on a lost race and an error if the stack is
    /// observed to be empty.
    fn try_pop(&self, guard: &Guard) -> Result<Option<T>, EmptyStackError> {
        // (TOP:2) this `Acquire` load synchronizes-with the `Release` CAS in (TOP:1)
        let top = self.top.load(Acquire, guard);
        match unsafe { top.as_ref() } {
            None => Err(EmptyStackError),
            Some(node) => {
                let next = node.next.load(Relaxed, guard);
                if self.top.compare_exchange(top, next, Release, Relaxed, guard).is_ok() {
                    unsafe {
                        // the node is unlinked, but other threads may still
                        // read it until the current epoch is vacated; only
                        // the value is moved out, the node itself is retired
                        let value = ptr::read(&*node.value);
                        guard.defer_destroy(top);
                        Ok(Some(value))
                    }
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/********** impl Default **************************************************************************/

impl<T: Clone + PartialEq> Default for EliminationBackoffStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/********** impl Drop *****************************************************************************/

impl<T> Drop for EliminationBackoffStack<T> {
    fn drop(&mut self) {
        // it's necessary to manually drop all remaining values iteratively
        unsafe {
            let mut curr = self.top.load(Relaxed, epoch::unprotected());
            while !curr.is_null() {
                let mut node = curr.into_owned();
                ManuallyDrop::drop(&mut node.value);
                curr = node.next.load(Relaxed, epoch::unprotected());
            }
        }
    }
}
