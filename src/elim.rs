//! A fixed-size collection of independent [`Exchanger`]s.
//!
//! A thread attempting elimination picks one slot uniformly at random, which
//! keeps the collision probability on any single slot low under high
//! contention and lets unrelated push/pop pairs eliminate concurrently
//! instead of serializing through one rendezvous point.

use std::time::Duration;

use crossbeam_utils::CachePadded;
use rand::Rng;

use crate::errors::TimeoutError;
use crate::exchanger::{ExchangeOffer, Exchanger};

////////////////////////////////////////////////////////////////////////////////////////////////////
// EliminationArray
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An array of independent exchange slots, visited one-at-random per
/// elimination attempt.
pub struct EliminationArray<T> {
    /// The slots, padded so independent exchanges do not false-share.
    slots: Box<[CachePadded<Exchanger<T>>]>,
    /// The timeout applied to every exchange attempt.
    timeout: Duration,
}

/********** impl inherent *************************************************************************/

impl<T: Clone + PartialEq> EliminationArray<T> {
    /// Creates a new [`EliminationArray`] with `capacity` slots and the given
    /// per-exchange timeout.
    ///
    /// A capacity of 0 is valid and disables elimination entirely: every
    /// visit fails immediately with [`TimeoutError`].
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        let slots: Vec<_> = (0..capacity).map(|_| CachePadded::new(Exchanger::new())).collect();
        Self { slots: slots.into_boxed_slice(), timeout }
    }

    /// Returns the number of exchange slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the per-exchange timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attempts a single exchange of `offer` on one uniformly chosen slot.
    ///
    /// # Errors
    ///
    /// Propagates [`TimeoutError`] unchanged; there is no retry across slots
    /// within one visit, that policy belongs to the caller.
    #[inline]
    pub fn visit(&self, offer: ExchangeOffer<T>) -> Result<ExchangeOffer<T>, TimeoutError> {
        self.visit_with(offer, &mut rand::thread_rng())
    }

    /// Like [`visit`][EliminationArray::visit], but drawing the slot index
    /// from the given random source, so tests can force specific slot
    /// collisions deterministically.
    pub fn visit_with<R: Rng + ?Sized>(
        &self,
        offer: ExchangeOffer<T>,
        rng: &mut R,
    ) -> Result<ExchangeOffer<T>, TimeoutError> {
        if self.slots.is_empty() {
            return Err(TimeoutError);
        }

        let index = rng.gen_range(0, self.slots.len());
        self.slots[index].exchange(offer, self.timeout)
    }
}
