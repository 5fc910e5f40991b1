//! Peg admission errors.
//!
//! Every error is a local rejection: the offending transaction is dropped,
//! replicated state is unchanged, and the error surfaces to the submitter.

use moorage_primitives::Mismatch;
use moorage_spv::{HeaderError, ProofError};
use thiserror::Error;

/// Errors from signatory-key commitment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyCommitError {
    /// The signatory index does not point into the current ranking.
    #[error("signatory index {0} is out of range")]
    BadIndex(u32),

    /// The committed bytes do not decode as a compressed secp256k1 point.
    #[error("committed key is not a valid compressed secp256k1 public key")]
    BadKeyFormat,

    /// The ed25519 signature does not verify under the consensus key at the
    /// given index.
    #[error("consensus-key signature verification failed")]
    BadSignature,

    /// The previously committed key has signed a live disbursal; rotation
    /// must wait until signing completes.
    #[error("committed key is bound to an in-progress disbursal")]
    KeyInUse,
}

/// Errors from deposit verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DepositError {
    /// The deposit bytes do not decode as a Bitcoin transaction.
    #[error("deposit transaction bytes are malformed")]
    BadFormat,

    /// The claimed height is outside the verified header chain.
    #[error("no verified header at height {0}")]
    UnknownHeight(u64),

    /// The deposit's block does not yet have the required confirmations.
    #[error("deposit has {got} of {required} required confirmations")]
    InsufficientConfirmations { got: u64, required: u64 },

    /// This deposit was already credited.
    #[error("deposit transaction was already processed")]
    AlreadyProcessed,

    /// The merkle proof does not tie the transaction to the block.
    #[error("bad deposit inclusion proof")]
    BadProof(#[from] ProofError),

    /// No output pays a tracked pay-to-signatory-set address.
    #[error("transaction pays no tracked signatory-set address")]
    NotPeggedPayment,

    /// No well-formed recipient commitment output was found.
    #[error("transaction carries no recipient commitment")]
    MissingCommitment,
}

/// Errors from disbursal construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisbursalError {
    /// Inputs cannot cover the user outputs plus a positive change output.
    #[error("insufficient funds: inputs {inputs} do not cover outputs {outputs}")]
    InsufficientFunds { inputs: u64, outputs: u64 },

    /// A user output would go to zero or below after fee deduction.
    #[error("output of {output} sat cannot bear its {fee_share} sat fee share")]
    OutputBelowFee { output: u64, fee_share: u64 },

    /// Amount arithmetic overflowed; the withdrawal set is nonsensical.
    #[error("amount overflow while building disbursal")]
    AmountOverflow,
}

/// Errors from withdrawal intake.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    /// The withdrawal output is structurally invalid.
    #[error("malformed withdrawal output")]
    BadFormat,

    /// Building the disbursal for the pending outputs failed; the
    /// triggering withdrawal is rejected and prior state kept.
    #[error("disbursal build failed")]
    Disbursal(#[from] DisbursalError),
}

/// Errors from disbursal signature submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// No disbursal is currently collecting signatures.
    #[error("no disbursal is collecting signatures")]
    NoSigningInProgress,

    /// The submission does not carry one signature per input.
    #[error("signature count mismatch {0}")]
    BadFormat(Mismatch<usize>),

    /// The signatory index does not point into the bound signatory set.
    #[error("signatory index {0} is out of range")]
    BadIndex(u32),

    /// A signature failed verification against its input's sighash.
    #[error("disbursal signature verification failed for input {input}")]
    BadSignature { input: usize },

    /// This signatory already submitted signatures for the transaction.
    #[error("signatory {0} already signed")]
    AlreadySigned(u32),
}

/// Top-level error for admitted transactions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PegError {
    #[error("failed to extend header chain")]
    Header(#[from] HeaderError),

    #[error("failed to process deposit")]
    Deposit(#[from] DepositError),

    #[error("failed to commit signatory key")]
    KeyCommit(#[from] KeyCommitError),

    #[error("failed to process withdrawal")]
    Withdrawal(#[from] WithdrawalError),

    #[error("failed to process disbursal signature")]
    Signing(#[from] SigningError),
}
