//! The custody and signing core of the two-way Bitcoin peg.
//!
//! Validators collectively custody Bitcoin via a weighted-threshold witness
//! script over the current signatory set. Deposits to the derived
//! pay-to-signatory-set address are SPV-verified and minted on the sidechain
//! ledger; burned pegged coins queue withdrawal outputs that the peg builds
//! into a disbursal, collects signatures for, and publishes fully signed for
//! broadcast.
//!
//! All state transitions run inside the sidechain's consensus runtime:
//! single-threaded, synchronous, and deterministic per replica.

mod builder;
pub mod deposit;
pub mod errors;
pub mod ledger;
pub mod params;
pub mod state;
pub mod tx;

pub use errors::PegError;
pub use ledger::CoinLedger;
pub use params::{FeePolicy, PegParams, MIN_RELAY_FEE};
pub use state::{PegState, SignatorySetEntry, SigningTx, TxOutput, Utxo};
pub use tx::{DerSignature, PegTx};
