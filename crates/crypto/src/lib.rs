//! Consensus-key (ed25519) operations for the peg.

pub mod keys;

pub use keys::{signing_scalar_from_seed, verify_commitment, ConsensusKeyError};
