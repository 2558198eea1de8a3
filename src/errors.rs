//! The crate's error types.
//!
//! Failed CAS attempts are *not* errors, they are expected races that are
//! communicated through `bool`/`Result` return values and handled by looping.

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////////////////////////
// EmptyStackError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Error returned by [`pop`][crate::EliminationBackoffStack::pop] when the
/// stack is observed to be empty.
///
/// Under the default [`FailFast`][crate::EmptyPolicy::FailFast] policy this
/// error is surfaced the moment the top of the stack is seen to be null; it is
/// never retried internally, so callers are free to poll.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("stack was observed empty")]
pub struct EmptyStackError;

////////////////////////////////////////////////////////////////////////////////////////////////////
// TimeoutError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Error returned by [`exchange`][crate::Exchanger::exchange] when no
/// exchange partner arrives within the deadline.
///
/// The stack always recovers from this error locally by retrying its fast
/// path, so it never propagates out of [`push`][crate::EliminationBackoffStack::push]
/// or [`pop`][crate::EliminationBackoffStack::pop].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("no exchange partner arrived within the timeout")]
pub struct TimeoutError;
