//! A two-party, timeout-bounded rendezvous point.
//!
//! An [`Exchanger`] lets exactly one offering thread and one accepting thread
//! swap [`ExchangeOffer`]s without meeting at a central lock. Its single slot
//! is an [`AtomicStampedRef`] whose stamp acts as a three-state machine:
//!
//! ```text
//! EMPTY ──(first party CAS)──> WAITING ──(second party CAS)──> BUSY
//!   ^                                                            │
//!   └───────────────(first party collects & resets)──────────────┘
//! ```
//!
//! All transitions are guarded by CAS preconditions on both the stamp and the
//! resident offer, so a third party arriving mid-exchange can only observe
//! `BUSY` and retry, never corrupt the pending pair.

use std::time::{Duration, Instant};

use crossbeam_epoch as epoch;
use crossbeam_utils::Backoff;

use crate::errors::TimeoutError;
use crate::stamped::AtomicStampedRef;

/// Stamp of a slot holding no offer.
pub(crate) const EMPTY: usize = 0;
/// Stamp of a slot holding the first party's offer.
pub(crate) const WAITING: usize = 1;
/// Stamp of a slot holding the second party's offer, ready for pickup.
pub(crate) const BUSY: usize = 2;

////////////////////////////////////////////////////////////////////////////////////////////////////
// ExchangeOffer
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The payload carried through an [`Exchanger`] slot.
///
/// A thread offering a value to donate submits [`Push`][ExchangeOffer::Push];
/// a thread seeking a value submits [`PopRequest`][ExchangeOffer::PopRequest].
/// An empty slot is a distinct state (the slot holding no offer at all) and is
/// never conflated with a resident `PopRequest`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExchangeOffer<T> {
    /// A value offered by a pushing thread.
    Push(T),
    /// The empty-handed offer of a popping thread.
    PopRequest,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Exchanger
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A lock-free rendezvous slot on which two threads can swap offers, or give
/// up after a caller-specified timeout.
pub struct Exchanger<T> {
    /// The slot, holding `(offer, stamp)`.
    pub(crate) slot: AtomicStampedRef<ExchangeOffer<T>>,
}

/********** impl inherent *************************************************************************/

impl<T: Clone + PartialEq> Exchanger<T> {
    /// Creates a new, empty [`Exchanger`].
    #[inline]
    pub fn new() -> Self {
        Self { slot: AtomicStampedRef::new(None, EMPTY) }
    }

    /// Attempts to swap `offer` against the offer of a second thread arriving
    /// within `timeout`.
    ///
    /// The first arriving party installs its offer and polls the slot until a
    /// partner commits, then resets the slot to empty and returns the
    /// partner's offer. The second arriving party replaces the resident offer
    /// with its own and returns immediately. While a pair is mid-exchange any
    /// further caller keeps retrying the outer loop.
    ///
    /// # Errors
    ///
    /// Fails with [`TimeoutError`] if no partner arrives before the deadline.
    /// An unanswered offer is taken back out of the slot with a CAS-guarded
    /// reset before this method returns, so a late partner can never pair
    /// with a thread that has already given up; conversely, if that reset is
    /// beaten by a concurrently committing partner, the exchange completes
    /// successfully instead of timing out.
    pub fn exchange(
        &self,
        offer: ExchangeOffer<T>,
        timeout: Duration,
    ) -> Result<ExchangeOffer<T>, TimeoutError> {
        let deadline = Instant::now() + timeout;
        let backoff = Backoff::new();

        while Instant::now() < deadline {
            let mut installed = false;
            {
                let guard = &epoch::pin();
                let (stamp, current) = self.slot.load(guard);
                match stamp {
                    EMPTY => {
                        // (EXC:1) become the first party
                        installed = self.slot.compare_and_set(
                            None,
                            Some(offer.clone()),
                            EMPTY,
                            WAITING,
                            guard,
                        );
                    }
                    WAITING => {
                        if let Some(first) = current {
                            // (EXC:2) commit as the second party; this is the
                            // linearization point of both exchanges
                            if self.slot.compare_and_set(
                                Some(first),
                                Some(offer.clone()),
                                WAITING,
                                BUSY,
                                guard,
                            ) {
                                return Ok(first.clone());
                            }
                        }
                    }
                    // BUSY: another pair occupies the slot
                    _ => {}
                }
            }

            if installed {
                return self.wait_for_partner(&offer, deadline);
            }

            backoff.spin();
        }

        Err(TimeoutError)
    }

    /// Polls the slot for a second party committing against the own resident
    /// offer, until the deadline runs out.
    fn wait_for_partner(
        &self,
        own: &ExchangeOffer<T>,
        deadline: Instant,
    ) -> Result<ExchangeOffer<T>, TimeoutError> {
        let backoff = Backoff::new();
        loop {
            {
                let guard = &epoch::pin();
                let (stamp, current) = self.slot.load(guard);
                if stamp == BUSY {
                    if let Some(second) = current {
                        let second = second.clone();
                        // only the first party ever resets the slot to empty
                        self.slot.set(None, EMPTY);
                        return Ok(second);
                    }
                }

                if Instant::now() >= deadline {
                    // (EXC:3) take the unanswered offer back; if this CAS
                    // fails, a partner has committed concurrently and the
                    // exchange must be completed on the next iteration
                    if self.slot.compare_and_set(Some(own), None, WAITING, EMPTY, guard) {
                        return Err(TimeoutError);
                    }
                }
            }

            backoff.snooze();
        }
    }
}

/********** impl Default **************************************************************************/

impl<T: Clone + PartialEq> Default for Exchanger<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
