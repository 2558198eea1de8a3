//! Types for configuring the runtime parameters of an
//! [`EliminationBackoffStack`][crate::EliminationBackoffStack].

use std::time::Duration;

const DEFAULT_CAPACITY: usize = 100;
const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_millis(10);

////////////////////////////////////////////////////////////////////////////////////////////////////
// EmptyPolicy
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The behavior of [`pop`][crate::EliminationBackoffStack::pop] when the fast
/// path observes an empty stack.
///
/// Both choices are defensible: failing fast mirrors the classic formulation
/// and never blocks, retrying lets a pop on an empty stack still pair with a
/// concurrent push through the elimination array.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EmptyPolicy {
    /// Return [`EmptyStackError`][crate::EmptyStackError] the moment the top
    /// of the stack is observed to be null.
    FailFast,
    /// Treat the empty observation like a lost race: attempt elimination and
    /// retry until a value is obtained.
    Retry,
}

/********** impl Default **************************************************************************/

impl Default for EmptyPolicy {
    #[inline]
    fn default() -> Self {
        EmptyPolicy::FailFast
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Config
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Runtime configuration parameters for a stack.
#[derive(Copy, Clone, Debug)]
pub struct Config {
    capacity: usize,
    exchange_timeout: Duration,
    empty_policy: EmptyPolicy,
}

/********** impl Default **************************************************************************/

impl Default for Config {
    #[inline]
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

/********** impl inherent *************************************************************************/

impl Config {
    /// Creates a new [`Config`] with the given parameters.
    ///
    /// A `capacity` of 0 disables elimination, which degrades the stack to a
    /// plain CAS-based linked stack.
    #[inline]
    pub fn with_params(
        capacity: usize,
        exchange_timeout: Duration,
        empty_policy: EmptyPolicy,
    ) -> Self {
        Self { capacity, exchange_timeout, empty_policy }
    }

    /// Returns the number of slots in the elimination array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the timeout applied to each exchange attempt on the
    /// elimination array.
    #[inline]
    pub fn exchange_timeout(&self) -> Duration {
        self.exchange_timeout
    }

    /// Returns the behavior of `pop` on an empty stack.
    #[inline]
    pub fn empty_policy(&self) -> EmptyPolicy {
        self.empty_policy
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ConfigBuilder
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A builder type for gradually initializing a [`Config`].
///
/// This is mainly useful for keeping stability, in case the internal
/// structure of the [`Config`] type changes in the future, e.g. because
/// further parameters are added.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConfigBuilder {
    capacity: Option<usize>,
    exchange_timeout: Option<Duration>,
    empty_policy: Option<EmptyPolicy>,
}

/********** impl inherent *************************************************************************/

impl ConfigBuilder {
    /// Creates a new [`ConfigBuilder`] with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of slots in the elimination array.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the timeout for each exchange attempt on the elimination array.
    #[inline]
    pub fn exchange_timeout(mut self, exchange_timeout: Duration) -> Self {
        self.exchange_timeout = Some(exchange_timeout);
        self
    }

    /// Sets the behavior of `pop` on an empty stack.
    #[inline]
    pub fn empty_policy(mut self, empty_policy: EmptyPolicy) -> Self {
        self.empty_policy = Some(empty_policy);
        self
    }

    /// Consumes the [`ConfigBuilder`] and returns an initialized [`Config`].
    ///
    /// Unspecified parameters are initialized with their default values.
    #[inline]
    pub fn build(self) -> Config {
        Config::with_params(
            self.capacity.unwrap_or(DEFAULT_CAPACITY),
            self.exchange_timeout.unwrap_or(DEFAULT_EXCHANGE_TIMEOUT),
            self.empty_policy.unwrap_or_default(),
        )
    }
}
