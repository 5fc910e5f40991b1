//! Consensus-key operations.
//!
//! Validators are identified by ed25519 public keys. The peg uses them for a
//! single purpose: authenticating the secp256k1 signatory key a validator
//! commits for Bitcoin custody. Verification follows RFC 8032 with the
//! cofactored "strict" checks (no small-order components, canonical `R`/`s`).

use ed25519_dalek::{Signature, VerifyingKey};
use moorage_primitives::{Buf32, Buf64};
use sha2::{Digest, Sha512};
use thiserror::Error;

/// Errors from consensus-key operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusKeyError {
    /// The 32 bytes are not a valid ed25519 public key.
    #[error("invalid consensus public key")]
    InvalidKey,

    /// The signature did not verify under the consensus key.
    #[error("consensus signature verification failed")]
    InvalidSignature,
}

/// Verifies a validator's signature over an arbitrary commitment message.
///
/// Used by the signatory-key registry: `msg` is the raw 33-byte compressed
/// secp256k1 key the validator is committing, and `sig` must verify under
/// the validator's consensus key.
pub fn verify_commitment(
    consensus_key: &Buf32,
    msg: &[u8],
    sig: &Buf64,
) -> Result<(), ConsensusKeyError> {
    let vk = VerifyingKey::from_bytes(consensus_key.as_bytes())
        .map_err(|_| ConsensusKeyError::InvalidKey)?;
    let sig = Signature::from_bytes(sig.as_bytes());
    vk.verify_strict(msg, &sig)
        .map_err(|_| ConsensusKeyError::InvalidSignature)
}

/// Derives the ed25519 signing scalar from a 32-byte seed.
///
/// This is the RFC 8032 §5.1.5 expansion: the scalar is the first half of
/// `SHA-512(seed)`, clamped by clearing the three low bits of the first byte
/// and the high bit of the last byte, and setting the second-highest bit of
/// the last byte.
///
/// Signatory clients derive their consensus signing scalar with exactly this
/// expansion, and keys committed by existing deployments depend on it, so it
/// is exposed as a standalone primitive of the consensus-key API rather than
/// left implicit inside a signer implementation.
pub fn signing_scalar_from_seed(seed: &[u8; 32]) -> [u8; 32] {
    let digest = Sha512::digest(seed);
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&digest[..32]);
    scalar[0] &= 0b1111_1000;
    scalar[31] &= 0b0111_1111;
    scalar[31] |= 0b0100_0000;
    scalar
}
