//! A trivial non-thread-safe stack.
//!
//! This is the sequential baseline the concurrent stack is measured and
//! cross-checked against; it makes no attempt at synchronization and must
//! only ever be used from one thread at a time.

////////////////////////////////////////////////////////////////////////////////////////////////////
// SeqStack
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A plain `Vec`-backed LIFO stack without any synchronization.
#[derive(Clone, Debug, Default)]
pub struct SeqStack<T> {
    items: Vec<T>,
}

/********** impl inherent *************************************************************************/

impl<T> SeqStack<T> {
    /// Creates a new, empty [`SeqStack`].
    #[inline]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Pushes `value` on top of the stack.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Pops the value on top of the stack, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns a reference to the value on top of the stack, if any.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns the number of values on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
