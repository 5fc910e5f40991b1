//! Shared error payloads.

use std::fmt::Debug;

use thiserror::Error;

/// A generic "expected vs got" error payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("(expected {expected:?}, got {got:?})")]
pub struct Mismatch<T>
where
    T: Debug + Clone,
{
    /// The value that was expected.
    pub expected: T,
    /// The value that was actually encountered.
    pub got: T,
}

impl<T: Debug + Clone> Mismatch<T> {
    pub fn new(expected: T, got: T) -> Self {
        Self { expected, got }
    }
}
