//! The in-progress disbursal and its signature table.

use bitcoin::{
    absolute::LockTime, hashes::Hash, sighash::SighashCache, transaction::Version,
    EcdsaSighashType, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness,
};
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::{BitcoinAmount, BitcoinScript};
use moorage_sigset::script::assemble_witness;
use serde::{Deserialize, Serialize};

use crate::{state::utxo::Utxo, tx::DerSignature};

/// A transaction output queued for, or included in, a disbursal.
#[derive(
    Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct TxOutput {
    script: BitcoinScript,
    value: BitcoinAmount,
}

impl TxOutput {
    pub fn new(script: BitcoinScript, value: BitcoinAmount) -> Self {
        Self { script, value }
    }

    pub fn script(&self) -> &BitcoinScript {
        &self.script
    }

    pub fn value(&self) -> BitcoinAmount {
        self.value
    }

    fn to_txout(&self) -> TxOut {
        TxOut {
            value: self.value.into(),
            script_pubkey: self.script.inner().clone(),
        }
    }
}

/// Builds the canonical unsigned disbursal transaction: every input in
/// order with empty scriptSig and witness, user outputs in order, change
/// output last.
pub(crate) fn unsigned_disbursal_tx(
    inputs: &[Utxo],
    outputs: &[TxOutput],
    change: &TxOutput,
) -> Transaction {
    let input = inputs
        .iter()
        .map(|u| TxIn {
            previous_output: u.outpoint().into(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        })
        .collect();

    let mut output: Vec<TxOut> = outputs.iter().map(TxOutput::to_txout).collect();
    output.push(change.to_txout());

    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input,
        output,
    }
}

/// A disbursal collecting signatures.
///
/// Holds everything needed to recompute each input's BIP-143 sighash
/// deterministically, plus one signature slot per signatory of the owning
/// set. The transaction shape is frozen at build time; only the signature
/// table changes until finalization.
#[derive(
    Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct SigningTx {
    inputs: Vec<Utxo>,
    outputs: Vec<TxOutput>,
    change: TxOutput,
    fee_paid: BitcoinAmount,

    /// The P2SS address whose set must sign.
    address: String,

    /// The owning set's witness script, the BIP-143 script code.
    witness_script: BitcoinScript,

    /// Per-signatory slots, in script order; each holds one DER signature
    /// per input once the signatory submits.
    signatures: Vec<Option<Vec<DerSignature>>>,

    /// Cumulative voting power of the signatories that have submitted.
    signed_vp: u64,
}

impl SigningTx {
    pub(crate) fn new(
        inputs: Vec<Utxo>,
        outputs: Vec<TxOutput>,
        change: TxOutput,
        fee_paid: BitcoinAmount,
        address: String,
        witness_script: BitcoinScript,
        n_signatories: usize,
    ) -> Self {
        Self {
            inputs,
            outputs,
            change,
            fee_paid,
            address,
            witness_script,
            signatures: vec![None; n_signatories],
            signed_vp: 0,
        }
    }

    pub fn inputs(&self) -> &[Utxo] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn change(&self) -> &TxOutput {
        &self.change
    }

    pub fn fee_paid(&self) -> BitcoinAmount {
        self.fee_paid
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn witness_script(&self) -> &BitcoinScript {
        &self.witness_script
    }

    pub fn signed_vp(&self) -> u64 {
        self.signed_vp
    }

    /// Whether the signatory at `pos` has already submitted.
    pub fn has_submitted(&self, pos: usize) -> bool {
        self.signatures.get(pos).is_some_and(Option::is_some)
    }

    /// The unsigned transaction the signatures commit to.
    pub fn unsigned_tx(&self) -> Transaction {
        unsigned_disbursal_tx(&self.inputs, &self.outputs, &self.change)
    }

    /// The BIP-143 `SIGHASH_ALL` digest for one input, computed against the
    /// witness script and the input UTXO's value.
    pub fn sighash(&self, input: usize) -> [u8; 32] {
        let tx = self.unsigned_tx();
        let mut cache = SighashCache::new(&tx);
        let digest = cache
            .p2wsh_signature_hash(
                input,
                self.witness_script.inner(),
                self.inputs[input].value().into(),
                EcdsaSighashType::All,
            )
            .expect("input index in range");
        digest.to_byte_array()
    }

    /// Records a verified submission for the signatory at `pos`.
    pub(crate) fn record_submission(
        &mut self,
        pos: usize,
        voting_power: u64,
        sigs: Vec<DerSignature>,
    ) {
        debug_assert!(self.signatures[pos].is_none());
        debug_assert_eq!(sigs.len(), self.inputs.len());
        self.signatures[pos] = Some(sigs);
        self.signed_vp += voting_power;
    }

    /// Assembles the fully-signed transaction from the collected slots.
    ///
    /// Missing slots serialize as empty pushes; their `CHECKSIG` arms
    /// contribute zero weight at spend time.
    pub(crate) fn finalize(&self) -> Transaction {
        let mut tx = self.unsigned_tx();
        for (i, txin) in tx.input.iter_mut().enumerate() {
            let slots: Vec<Option<Vec<u8>>> = self
                .signatures
                .iter()
                .map(|slot| slot.as_ref().map(|sigs| sigs[i].to_witness_bytes()))
                .collect();
            txin.witness = assemble_witness(&slots, self.witness_script.inner());
        }
        tx
    }
}
