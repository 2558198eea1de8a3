//! A lock-free, linearizable LIFO stack that scales under contention by
//! *eliminating* colliding operations instead of retrying them.
//!
//! A plain CAS-based (Treiber) stack funnels every push and pop through one
//! atomic `top` pointer. Under low contention this is hard to beat: each
//! operation is a single successful compare-and-swap. Under high contention,
//! however, most CAS attempts fail and the structure degenerates into a
//! retry storm on a single hot cache line.
//!
//! The elimination-backoff stack, described by Hendler, Shavit and Shalev
//! [[1]], observes that a push and a pop which both just lost their race are
//! perfect partners: the pop can simply take the push's value directly and
//! both operations complete without the stack ever changing. Operations that
//! lose a fast-path CAS therefore back off into an *elimination array*, a set
//! of independent two-party rendezvous slots, pick one at random and wait a
//! bounded time for a complementary partner. Pairs that meet are linearized
//! at the second party's CAS on the slot; loners time out and retry the fast
//! path. The more threads contend, the more likely elimination succeeds,
//! which is exactly the regime in which the fast path degrades.
//!
//! # Components
//!
//! - [`AtomicStampedRef`]: a nullable value coupled with a version stamp,
//!   both updated together under a single atomic CAS.
//! - [`Exchanger`]: a two-party, timeout-bounded rendezvous slot built on one
//!   stamped reference.
//! - [`EliminationArray`]: a fixed-size set of exchangers visited uniformly
//!   at random.
//! - [`EliminationBackoffStack`]: the public stack combining the Treiber fast
//!   path with elimination backoff.
//!
//! Popped nodes and displaced slot records are reclaimed through epoch-based
//! memory reclamation (`crossbeam-epoch`), which also forecloses the ABA
//! hazard on the `top` pointer: a node's address cannot be reused while any
//! thread that might still compare against it remains pinned.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use elimstack::EliminationBackoffStack;
//!
//! let stack = Arc::new(EliminationBackoffStack::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|id| {
//!         let stack = Arc::clone(&stack);
//!         thread::spawn(move || {
//!             stack.push(id);
//!             stack.pop()
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     assert!(handle.join().unwrap().is_ok());
//! }
//!
//! assert!(stack.is_empty());
//! ```
//!
//! [1]: https://doi.org/10.1016/j.jpdc.2003.11.005

#![warn(missing_docs)]

mod config;
mod elim;
mod errors;
mod exchanger;
mod seq;
mod stack;
mod stamped;

#[cfg(test)]
mod tests;

pub use crate::config::{Config, ConfigBuilder, EmptyPolicy};
pub use crate::elim::EliminationArray;
pub use crate::errors::{EmptyStackError, TimeoutError};
pub use crate::exchanger::{ExchangeOffer, Exchanger};
pub use crate::seq::SeqStack;
pub use crate::stack::EliminationBackoffStack;
pub use crate::stamped::AtomicStampedRef;
