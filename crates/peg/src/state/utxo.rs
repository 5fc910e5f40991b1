//! Reserve UTXO tracking.
//!
//! Every verified deposit appends a UTXO credited to the signatory-set
//! address it paid; disbursals consume them when finalized. UTXOs stay
//! associated with the address that received them, across rotations.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::{BitcoinAmount, BitcoinOutPoint};
use serde::{Deserialize, Serialize};

/// A Bitcoin UTXO held by a signatory set.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct Utxo {
    outpoint: BitcoinOutPoint,
    value: BitcoinAmount,
    /// Bech32 P2SS address whose set custodies this output.
    address: String,
}

impl Utxo {
    pub fn new(outpoint: BitcoinOutPoint, value: BitcoinAmount, address: String) -> Self {
        Self {
            outpoint,
            value,
            address,
        }
    }

    pub fn outpoint(&self) -> BitcoinOutPoint {
        self.outpoint
    }

    pub fn value(&self) -> BitcoinAmount {
        self.value
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Table of reserve UTXOs in creation order.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct UtxoTable {
    utxos: Vec<Utxo>,
}

impl UtxoTable {
    pub fn new_empty() -> Self {
        Self { utxos: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn as_slice(&self) -> &[Utxo] {
        &self.utxos
    }

    /// Appends a freshly verified deposit output.
    pub fn push(&mut self, utxo: Utxo) {
        self.utxos.push(utxo);
    }

    /// The UTXOs custodied by the given address, in creation order.
    pub fn for_address(&self, address: &str) -> Vec<Utxo> {
        self.utxos
            .iter()
            .filter(|u| u.address == address)
            .cloned()
            .collect()
    }

    /// Removes the UTXOs consumed by a finalized disbursal.
    pub fn remove_spent(&mut self, spent: &[BitcoinOutPoint]) {
        self.utxos.retain(|u| !spent.contains(&u.outpoint));
    }
}
