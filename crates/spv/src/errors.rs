//! SPV errors.

use bitcoin::BlockHash;
use thiserror::Error;

/// Errors that can occur while extending the header chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The header does not connect to any block within the reorg window.
    #[error("block continuity error: no known ancestor for previous hash {prev:?}")]
    ContinuityError { prev: BlockHash },

    /// The header's encoded target does not match the expected target.
    #[error("invalid proof-of-work: header target {found:#x} does not match expected {expected:#x}")]
    PowMismatch { expected: u32, found: u32 },

    /// The computed block hash does not meet the encoded target.
    #[error("proof-of-work not met: block hash {block_hash:?} does not meet target")]
    PowNotMet { block_hash: BlockHash },

    /// The header's timestamp is not greater than the median of the previous
    /// eleven timestamps.
    #[error("invalid timestamp: header time {time} is not greater than median {median}")]
    TimestampError { time: u32, median: u32 },

    /// A reorganization attempted to replace headers with an equal-or-shorter
    /// branch.
    #[error("reorg error: replacement of {old_headers} headers with {new_headers} is not longer")]
    ReorgLengthError {
        new_headers: usize,
        old_headers: usize,
    },

    /// A reorganization reached deeper than the configured allowance.
    #[error("reorg error: fork depth {depth} exceeds maximum {max}")]
    ReorgTooDeep { depth: u64, max: u64 },
}

/// Errors that can occur while checking a transaction inclusion proof.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The partial merkle tree is structurally invalid.
    #[error("malformed merkle proof")]
    Malformed,

    /// The proof's computed root does not match the header's merkle root.
    #[error("merkle proof root does not match header")]
    RootMismatch,

    /// The proof does not commit to exactly one transaction.
    #[error("merkle proof matches {0} transactions, expected exactly 1")]
    NotSingleMatch(usize),

    /// The proven txid is not the transaction being verified.
    #[error("merkle proof commits to a different transaction")]
    TxidMismatch,
}
