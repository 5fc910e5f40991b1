//! Peg configuration.

use std::io;

use bitcoin::Network;
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::{
    btc::{network_from_tag, network_to_tag},
    BitcoinAmount,
};
use moorage_spv::SpvParams;
use serde::{Deserialize, Serialize};

/// Floor on the fee paid by any disbursal, in satoshis.
pub const MIN_RELAY_FEE: u64 = 1_000;

/// Default fee rate applied to disbursals, in satoshis per byte.
pub const DEFAULT_FEE_RATE: u64 = 1;

/// Fee policy for disbursal transactions.
///
/// The policy is deliberately static: a flat per-byte rate with a relay
/// floor, no bumping, no output dropping. All fee knobs live here so a
/// future revision can change policy without touching the signing state
/// machine.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct FeePolicy {
    /// Satoshis charged per byte of the unsigned transaction.
    pub sat_per_byte: u64,

    /// Minimum fee for any disbursal, regardless of size.
    pub min_relay_fee: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            sat_per_byte: DEFAULT_FEE_RATE,
            min_relay_fee: MIN_RELAY_FEE,
        }
    }
}

impl FeePolicy {
    /// The fee owed by a disbursal of the given serialized length.
    pub fn fee_for(&self, tx_len: usize) -> u64 {
        (tx_len as u64 * self.sat_per_byte).max(self.min_relay_fee)
    }
}

/// Network-wide peg parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PegParams {
    /// The Bitcoin network the peg custodies funds on.
    pub network: Network,

    /// Maximum header-chain reorg depth accepted from relayers.
    pub max_reorg_depth: u64,

    /// Fee policy for disbursals.
    pub fee: FeePolicy,

    /// Flat fee deducted from each deposit before minting.
    pub deposit_fee: BitcoinAmount,

    /// Confirmations a deposit's block needs before the deposit is accepted;
    /// the deposit's own block counts as one.
    pub min_deposit_confirmations: u64,
}

impl PegParams {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            max_reorg_depth: 100,
            fee: FeePolicy::default(),
            deposit_fee: BitcoinAmount::ZERO,
            min_deposit_confirmations: 1,
        }
    }

    /// The SPV parameters implied by this configuration.
    pub fn spv(&self) -> SpvParams {
        SpvParams {
            network: self.network,
            max_reorg_depth: self.max_reorg_depth,
        }
    }
}

impl BorshSerialize for PegParams {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&network_to_tag(self.network), writer)?;
        BorshSerialize::serialize(&self.max_reorg_depth, writer)?;
        BorshSerialize::serialize(&self.fee, writer)?;
        BorshSerialize::serialize(&self.deposit_fee, writer)?;
        BorshSerialize::serialize(&self.min_deposit_confirmations, writer)
    }
}

impl BorshDeserialize for PegParams {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let tag = u8::deserialize_reader(reader)?;
        Ok(Self {
            network: network_from_tag(tag)?,
            max_reorg_depth: u64::deserialize_reader(reader)?,
            fee: FeePolicy::deserialize_reader(reader)?,
            deposit_fee: BitcoinAmount::deserialize_reader(reader)?,
            min_deposit_confirmations: u64::deserialize_reader(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_floor_applies() {
        let fee = FeePolicy::default();
        assert_eq!(fee.fee_for(120), 1_000);
        assert_eq!(fee.fee_for(1_000), 1_000);
        assert_eq!(fee.fee_for(1_001), 1_001);
    }

    #[test]
    fn test_params_borsh_roundtrip() {
        let params = PegParams::new(Network::Regtest);
        let bytes = borsh::to_vec(&params).expect("serialize");
        let back: PegParams = borsh::from_slice(&bytes).expect("deserialize");
        assert_eq!(back, params);
    }
}
