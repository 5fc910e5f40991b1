//! SPV maintenance of a Bitcoin header chain and transaction inclusion
//! proofs against it.

pub mod chain;
pub mod errors;
pub mod header;
pub mod proof;

pub use chain::{GenesisView, HeaderChain, SpvParams};
pub use errors::{HeaderError, ProofError};
pub use header::BitcoinHeader;
pub use proof::TxInclusionProof;
