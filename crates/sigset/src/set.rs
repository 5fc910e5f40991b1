//! The signatory set and its derived script and address.

use arbitrary::Arbitrary;
use bitcoin::{Network, ScriptBuf};
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::{Buf32, Buf33};
use serde::{Deserialize, Serialize};

use crate::{errors::SigsetError, script};

/// A signatory: a validator that has committed a secp256k1 signatory key.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct Signatory {
    /// The validator's ed25519 consensus public key.
    pub consensus_key: Buf32,

    /// Voting power at the time the set was frozen.
    pub voting_power: u32,

    /// The committed compressed secp256k1 public key used to sign disbursals.
    pub signatory_key: Buf33,
}

/// An ordered signatory set frozen at selection time.
///
/// The order is the selection order (voting power descending, ties by
/// consensus key descending) and is a protocol invariant: script slot `k`
/// belongs to signatory `k`, and witness assembly depends on it. A P2SS
/// address derived from a set is unique to that exact ordered content.
#[derive(
    Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct SignatorySet {
    signatories: Vec<Signatory>,
}

impl SignatorySet {
    pub fn new(signatories: Vec<Signatory>) -> Self {
        Self { signatories }
    }

    /// The signatories in set (and script) order.
    pub fn signatories(&self) -> &[Signatory] {
        &self.signatories
    }

    /// The number of signatories in the set.
    pub fn len(&self) -> usize {
        self.signatories.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.signatories.is_empty()
    }

    /// Total voting power present in the set.
    pub fn present_vp(&self) -> u64 {
        self.signatories
            .iter()
            .map(|s| s.voting_power as u64)
            .sum()
    }

    /// The voting power threshold required to spend outputs secured by this
    /// set: `ceil(2/3)` of the present voting power.
    pub fn threshold(&self) -> u64 {
        (2 * self.present_vp()).div_ceil(3)
    }

    /// Position of the signatory with the given consensus key, if present.
    pub fn position_of(&self, consensus_key: &Buf32) -> Option<usize> {
        self.signatories
            .iter()
            .position(|s| s.consensus_key == *consensus_key)
    }

    /// Builds the witness script enforcing the weighted threshold over this
    /// set.
    ///
    /// Fails with [`SigsetError::EmptySignatorySet`] if the set is empty or
    /// carries no voting power; such a set can never satisfy its own
    /// threshold and must not custody funds.
    pub fn witness_script(&self) -> Result<ScriptBuf, SigsetError> {
        if self.is_empty() || self.present_vp() == 0 {
            return Err(SigsetError::EmptySignatorySet);
        }
        Ok(script::witness_script(&self.signatories, self.threshold()))
    }

    /// The P2WSH scriptPubKey paying this set.
    pub fn script_pubkey(&self) -> Result<ScriptBuf, SigsetError> {
        Ok(self.witness_script()?.to_p2wsh())
    }

    /// The bech32 P2SS address for the given network.
    pub fn address(&self, network: Network) -> Result<String, SigsetError> {
        let script = self.witness_script()?;
        Ok(bitcoin::Address::p2wsh(&script, network).to_string())
    }
}
