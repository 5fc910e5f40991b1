//! Signatory-set tracking: the current set plus the archive of past sets.
//!
//! Each set is keyed by its P2SS address. Archived sets stay resident so
//! that inflight UTXOs at old addresses remain spendable through the set
//! that received them.

use std::collections::BTreeMap;

use bitcoin::Network;
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::BitcoinScript;
use moorage_sigset::{SignatorySet, SigsetError};
use serde::{Deserialize, Serialize};

use crate::state::signing::SigningTx;

/// One signatory set and its signing state.
#[derive(
    Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct SignatorySetEntry {
    sigset: SignatorySet,
    address: String,
    witness_script: BitcoinScript,
    script_pubkey: BitcoinScript,

    /// The disbursal currently collecting signatures from this set, if any.
    signing_tx: Option<SigningTx>,

    /// The most recent fully-signed disbursal, consensus-serialized and
    /// ready for broadcast by the relayer.
    signed_tx: Option<Vec<u8>>,
}

impl SignatorySetEntry {
    /// Freezes a set: derives its script and address for the network.
    pub fn from_set(sigset: SignatorySet, network: Network) -> Result<Self, SigsetError> {
        let witness_script = sigset.witness_script()?;
        let script_pubkey = witness_script.to_p2wsh();
        let address = bitcoin::Address::p2wsh(&witness_script, network).to_string();
        Ok(Self {
            sigset,
            address,
            witness_script: witness_script.into(),
            script_pubkey: script_pubkey.into(),
            signing_tx: None,
            signed_tx: None,
        })
    }

    pub fn sigset(&self) -> &SignatorySet {
        &self.sigset
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn witness_script(&self) -> &BitcoinScript {
        &self.witness_script
    }

    pub fn script_pubkey(&self) -> &BitcoinScript {
        &self.script_pubkey
    }

    pub fn signing_tx(&self) -> Option<&SigningTx> {
        self.signing_tx.as_ref()
    }

    pub fn signed_tx(&self) -> Option<&[u8]> {
        self.signed_tx.as_deref()
    }

    pub(crate) fn signing_tx_mut(&mut self) -> Option<&mut SigningTx> {
        self.signing_tx.as_mut()
    }

    pub(crate) fn set_signing_tx(&mut self, signing: SigningTx) {
        debug_assert!(self.signing_tx.is_none());
        self.signing_tx = Some(signing);
    }

    pub(crate) fn complete_signing(&mut self, signed: Vec<u8>) {
        self.signing_tx = None;
        self.signed_tx = Some(signed);
    }
}

/// The current signatory set plus all archived predecessors, by address.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct SignatorySetsTable {
    current: Option<String>,
    entries: BTreeMap<String, SignatorySetEntry>,
}

impl SignatorySetsTable {
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// The published P2SS address, if a usable set exists.
    pub fn current_address(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_entry(&self) -> Option<&SignatorySetEntry> {
        self.entry(self.current.as_deref()?)
    }

    pub fn entry(&self, address: &str) -> Option<&SignatorySetEntry> {
        self.entries.get(address)
    }

    pub(crate) fn current_entry_mut(&mut self) -> Option<&mut SignatorySetEntry> {
        let addr = self.current.clone()?;
        self.entries.get_mut(&addr)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SignatorySetEntry> {
        self.entries.values()
    }

    /// Publishes a new current set. The previous current entry stays
    /// archived under its address. Re-publishing a known address reuses its
    /// entry, preserving any signing state.
    pub(crate) fn publish(&mut self, entry: SignatorySetEntry) {
        let address = entry.address().to_owned();
        self.entries.entry(address.clone()).or_insert(entry);
        self.current = Some(address);
    }

    /// Withdraws the current address without archiving anything new; used
    /// when the validator set degrades to one that cannot custody funds.
    pub(crate) fn clear_current(&mut self) {
        self.current = None;
    }

    /// The entry whose disbursal is collecting signatures, if any. At most
    /// one disbursal collects signatures at a time.
    pub(crate) fn live_signing_entry_mut(&mut self) -> Option<&mut SignatorySetEntry> {
        self.entries.values_mut().find(|e| e.signing_tx.is_some())
    }

    pub(crate) fn has_live_signing(&self) -> bool {
        self.entries.values().any(|e| e.signing_tx.is_some())
    }
}
