//! An atomic compound of a nullable value and an integer version stamp.
//!
//! Both components always change together under a single atomic instruction,
//! which is what allows the [`Exchanger`][crate::Exchanger] to rule out
//! lost-update and ABA hazards on its slot.
//!
//! Internally the pair is stored as one immutable heap record behind an
//! epoch-managed atomic pointer. Every mutation installs a freshly allocated
//! record with a single pointer CAS and retires the displaced record, so no
//! observer can ever see one component updated without the other and no access
//! is serialized through a lock.

use core::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned};

////////////////////////////////////////////////////////////////////////////////////////////////////
// Pair
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The immutable (value, stamp) record; a new one is allocated for every
/// mutation of an [`AtomicStampedRef`].
struct Pair<V> {
    value: Option<V>,
    stamp: usize,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// AtomicStampedRef
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A nullable value coupled with a `usize` stamp, readable and writable only
/// through atomic operations on the compound.
///
/// Values are compared by equality (`PartialEq`), not identity, and are cloned
/// out of the shared record on reads, so `V` is required to be cheap to clone.
pub struct AtomicStampedRef<V> {
    /// Pointer to the current pair, never null.
    inner: Atomic<Pair<V>>,
}

/********** impl inherent *************************************************************************/

impl<V: Clone + PartialEq> AtomicStampedRef<V> {
    /// Creates a new [`AtomicStampedRef`] with the given initial value and
    /// stamp.
    #[inline]
    pub fn new(value: Option<V>, stamp: usize) -> Self {
        Self { inner: Atomic::new(Pair { value, stamp }) }
    }

    /// Returns a clone of the current value.
    #[inline]
    pub fn get(&self) -> Option<V> {
        let guard = &epoch::pin();
        self.load(guard).1.cloned()
    }

    /// Returns the current stamp.
    #[inline]
    pub fn stamp(&self) -> usize {
        let guard = &epoch::pin();
        self.load(guard).0
    }

    /// Returns the current stamp and a reference to the current value, read
    /// together from one atomic load.
    ///
    /// Since both components live in the same immutable record, no torn read
    /// is ever observable.
    #[inline]
    pub fn load<'g>(&self, guard: &'g Guard) -> (usize, Option<&'g V>) {
        // (STA:1) this `Acquire` load synchronizes-with the `Release` CAS in
        // (STA:2) and the `Release` swap in (STA:3)
        let pair = unsafe { self.inner.load(Acquire, guard).deref() };
        (pair.stamp, pair.value.as_ref())
    }

    /// Unconditionally sets both the value and the stamp.
    #[inline]
    pub fn set(&self, value: Option<V>, stamp: usize) {
        let guard = &epoch::pin();
        // (STA:3) this `Release` swap synchronizes-with the `Acquire` load in (STA:1)
        let old = self.inner.swap(Owned::new(Pair { value, stamp }), Release, guard);
        unsafe { guard.defer_destroy(old) };
    }

    /// Atomically replaces the pair with `(new, new_stamp)` iff the current
    /// value equals `expected` and the current stamp equals `expected_stamp`,
    /// returning `true` on success.
    ///
    /// Equality of values is `PartialEq` equality, not identity. Because the
    /// physical CAS is on the internal record pointer, a call may fail even
    /// though the current contents equal the expectation, if another thread
    /// has installed a content-equal record in the meantime; such a failure is
    /// indistinguishable from losing the race against that thread and callers
    /// are expected to retry in a loop.
    pub fn compare_and_set(
        &self,
        expected: Option<&V>,
        new: Option<V>,
        expected_stamp: usize,
        new_stamp: usize,
        guard: &Guard,
    ) -> bool {
        let current = self.inner.load(Acquire, guard);
        let pair = unsafe { current.deref() };
        if pair.stamp != expected_stamp || pair.value.as_ref() != expected {
            return false;
        }

        // (STA:2) this `Release` CAS synchronizes-with the `Acquire` load in (STA:1)
        let new = Owned::new(Pair { value: new, stamp: new_stamp });
        match self.inner.compare_exchange(current, new, Release, Relaxed, guard) {
            Ok(_) => {
                unsafe { guard.defer_destroy(current) };
                true
            }
            Err(_) => false,
        }
    }

    /// Atomically sets only the stamp to `new_stamp` iff the current value
    /// equals `expected`, ignoring the current stamp; returns `true` on
    /// success.
    ///
    /// Any given invocation may fail spuriously even when the value matches,
    /// but repeated invocation will eventually succeed as long as the value
    /// keeps matching and no other thread interferes.
    pub fn attempt_stamp(&self, expected: Option<&V>, new_stamp: usize, guard: &Guard) -> bool {
        let current = self.inner.load(Acquire, guard);
        let pair = unsafe { current.deref() };
        if pair.value.as_ref() != expected {
            return false;
        }

        let new = Owned::new(Pair { value: pair.value.clone(), stamp: new_stamp });
        match self.inner.compare_exchange(current, new, Release, Relaxed, guard) {
            Ok(_) => {
                unsafe { guard.defer_destroy(current) };
                true
            }
            Err(_) => false,
        }
    }
}

/********** impl Drop *****************************************************************************/

impl<V> Drop for AtomicStampedRef<V> {
    #[inline]
    fn drop(&mut self) {
        // no thread can hold a reference to the final pair anymore
        unsafe {
            drop(self.inner.load(Relaxed, epoch::unprotected()).into_owned());
        }
    }
}
