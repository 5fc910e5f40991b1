//! Signatory-set errors.

use thiserror::Error;

/// Errors from signatory-set construction and script emission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigsetError {
    /// The set has no signatories (or zero total voting power), so no
    /// spendable script can be emitted for it.
    #[error("cannot emit a script for an empty signatory set")]
    EmptySignatorySet,
}
