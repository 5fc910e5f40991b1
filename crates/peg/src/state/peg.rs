//! The replicated peg state and its transaction handlers.
//!
//! Every handler is a deterministic, synchronous function of the state, the
//! admitted transaction, and the validator map threaded in from block
//! context. A handler either applies atomically or rejects with no state
//! change.

use std::collections::{BTreeMap, BTreeSet};

use bitcoin::{
    consensus,
    hashes::Hash,
    secp256k1::{ecdsa, Message, PublicKey, Secp256k1},
    Transaction,
};
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_crypto::verify_commitment;
use moorage_primitives::{
    BitcoinAmount, BitcoinOutPoint, BitcoinScript, BitcoinTxid, Buf32, Buf33, Buf64, Mismatch,
};
use moorage_sigset::{rank_validators, select_signatories, Validator};
use moorage_spv::{GenesisView, HeaderChain, TxInclusionProof};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    builder::build_disbursal,
    deposit,
    errors::{DepositError, DisbursalError, KeyCommitError, PegError, SigningError, WithdrawalError},
    ledger::CoinLedger,
    params::PegParams,
    state::{
        sets::{SignatorySetEntry, SignatorySetsTable},
        signing::{SigningTx, TxOutput},
        utxo::{Utxo, UtxoTable},
    },
    tx::{DerSignature, PegTx},
};

/// The peg's replicated state.
#[derive(Clone, Debug, BorshDeserialize, BorshSerialize, Deserialize, Serialize)]
pub struct PegState {
    params: PegParams,

    /// SPV view of the Bitcoin chain.
    chain: HeaderChain,

    /// Txids of deposits already credited, for at-most-once minting.
    processed_txs: BTreeSet<Buf32>,

    /// Reserve UTXOs across all tracked addresses.
    utxos: UtxoTable,

    /// Committed signatory keys, by consensus key. Latest commitment wins.
    committed_keys: BTreeMap<Buf32, Buf33>,

    /// Withdrawal outputs awaiting inclusion in a disbursal.
    pending_outputs: Vec<TxOutput>,

    /// Current signatory set plus archived predecessors.
    sets: SignatorySetsTable,
}

impl PegState {
    pub fn new(params: PegParams, genesis: GenesisView) -> Self {
        Self {
            chain: HeaderChain::new(params.spv(), genesis),
            params,
            processed_txs: BTreeSet::new(),
            utxos: UtxoTable::new_empty(),
            committed_keys: BTreeMap::new(),
            pending_outputs: Vec::new(),
            sets: SignatorySetsTable::new_empty(),
        }
    }

    /// Applies one admitted transaction.
    pub fn apply(
        &mut self,
        tx: PegTx,
        validators: &[Validator],
        ledger: &mut dyn CoinLedger,
    ) -> Result<(), PegError> {
        match tx {
            PegTx::Headers { headers } => Ok(self.chain.extend(&headers)?),
            PegTx::Deposit { tx, proof } => Ok(self.process_deposit(&tx, &proof, ledger)?),
            PegTx::SignatoryKey {
                signatory_index,
                signatory_key,
                signature,
            } => {
                self.commit_signatory_key(validators, signatory_index, signatory_key, signature)?;
                // The registry changed; re-derive the current set.
                self.update_signatory_set(validators);
                Ok(())
            }
            PegTx::Signature {
                signatory_index,
                signatures,
            } => Ok(self.process_signature(signatory_index, signatures)?),
            PegTx::Withdrawal { script, amount } => {
                Ok(self.process_withdrawal(script, amount)?)
            }
        }
    }

    /// Recomputes the current signatory set and rotates the published
    /// address if it changed.
    ///
    /// Must be invoked after every block that mutated the validator map;
    /// [`Self::apply`] invokes it itself after registry mutations. Rotation
    /// archives the previous set under its address. UTXOs are not migrated
    /// and are disbursed through the set that received them.
    pub fn update_signatory_set(&mut self, validators: &[Validator]) {
        let ranked = rank_validators(validators);
        let set = select_signatories(&ranked, &self.committed_keys);

        if set.is_empty() || set.present_vp() == 0 {
            if self.sets.current_address().is_some() {
                warn!("validator set can no longer custody funds; withdrawing current address");
                self.sets.clear_current();
            }
            return;
        }

        let entry = match SignatorySetEntry::from_set(set, self.params.network) {
            Ok(entry) => entry,
            // Not reachable for a non-empty weighted set; treated as "keep
            // the previous address".
            Err(err) => {
                warn!(%err, "failed to derive signatory-set address");
                return;
            }
        };

        if self.sets.current_address() == Some(entry.address()) {
            return;
        }

        info!(
            address = %entry.address(),
            signatories = entry.sigset().len(),
            "publishing new signatory-set address"
        );
        self.sets.publish(entry);
    }

    fn commit_signatory_key(
        &mut self,
        validators: &[Validator],
        signatory_index: u32,
        signatory_key: Buf33,
        signature: Buf64,
    ) -> Result<(), KeyCommitError> {
        let ranked = rank_validators(validators);
        let validator = ranked
            .get(signatory_index as usize)
            .ok_or(KeyCommitError::BadIndex(signatory_index))?;

        PublicKey::from_slice(signatory_key.as_bytes())
            .map_err(|_| KeyCommitError::BadKeyFormat)?;

        verify_commitment(
            &validator.consensus_key,
            signatory_key.as_bytes(),
            &signature,
        )
        .map_err(|_| KeyCommitError::BadSignature)?;

        // A key that has signed a live disbursal cannot rotate mid-flight.
        if let Some(existing) = self.committed_keys.get(&validator.consensus_key) {
            if *existing != signatory_key
                && self.signatory_in_live_signing(&validator.consensus_key)
            {
                return Err(KeyCommitError::KeyInUse);
            }
        }

        self.committed_keys
            .insert(validator.consensus_key, signatory_key);
        debug!(
            signatory = %validator.consensus_key,
            "signatory key committed"
        );
        Ok(())
    }

    fn signatory_in_live_signing(&self, consensus_key: &Buf32) -> bool {
        self.sets.entries().any(|entry| {
            entry.signing_tx().is_some_and(|signing| {
                entry
                    .sigset()
                    .position_of(consensus_key)
                    .is_some_and(|pos| signing.has_submitted(pos))
            })
        })
    }

    fn process_deposit(
        &mut self,
        tx_bytes: &[u8],
        proof: &TxInclusionProof,
        ledger: &mut dyn CoinLedger,
    ) -> Result<(), DepositError> {
        let height = proof.height();
        let header = *self
            .chain
            .get_by_height(height)
            .ok_or(DepositError::UnknownHeight(height))?;

        let confirmations = self.chain.height() - height + 1;
        if confirmations < self.params.min_deposit_confirmations {
            return Err(DepositError::InsufficientConfirmations {
                got: confirmations,
                required: self.params.min_deposit_confirmations,
            });
        }

        let tx: Transaction =
            consensus::deserialize(tx_bytes).map_err(|_| DepositError::BadFormat)?;
        let txid = tx.compute_txid();
        let txid_buf = Buf32::from(txid.to_byte_array());

        if self.processed_txs.contains(&txid_buf) {
            return Err(DepositError::AlreadyProcessed);
        }

        proof.verify(header.inner(), txid)?;

        let (vout, value, address) = self
            .find_pegged_output(&tx)
            .ok_or(DepositError::NotPeggedPayment)?;

        let recipient =
            deposit::extract_commitment(&tx).ok_or(DepositError::MissingCommitment)?;

        self.processed_txs.insert(txid_buf);
        self.utxos.push(Utxo::new(
            BitcoinOutPoint::new(BitcoinTxid::new(txid), vout),
            value,
            address.clone(),
        ));

        let minted = value.saturating_sub(self.params.deposit_fee);
        ledger.mint(&recipient, minted);

        debug!(
            %txid,
            address = %address,
            sats = value.to_sat(),
            "deposit verified and credited"
        );
        Ok(())
    }

    /// The first output paying any tracked P2SS address.
    fn find_pegged_output(&self, tx: &Transaction) -> Option<(u32, BitcoinAmount, String)> {
        for (vout, output) in tx.output.iter().enumerate() {
            for entry in self.sets.entries() {
                if entry.script_pubkey().inner() == &output.script_pubkey {
                    return Some((
                        vout as u32,
                        output.value.into(),
                        entry.address().to_owned(),
                    ));
                }
            }
        }
        None
    }

    fn process_withdrawal(
        &mut self,
        script: BitcoinScript,
        amount: BitcoinAmount,
    ) -> Result<(), WithdrawalError> {
        if script.is_empty() || amount == BitcoinAmount::ZERO {
            return Err(WithdrawalError::BadFormat);
        }

        self.pending_outputs.push(TxOutput::new(script, amount));
        match self.try_build_signing_tx() {
            Ok(_) => Ok(()),
            Err(err) => {
                // Reject only the withdrawal that triggered the rebuild;
                // previously queued outputs stay.
                self.pending_outputs.pop();
                Err(WithdrawalError::Disbursal(err))
            }
        }
    }

    /// Builds a disbursal for the pending outputs from the current set's
    /// UTXOs, unless one is already collecting signatures.
    ///
    /// Returns whether a disbursal was built.
    fn try_build_signing_tx(&mut self) -> Result<bool, DisbursalError> {
        if self.pending_outputs.is_empty() || self.sets.has_live_signing() {
            return Ok(false);
        }
        let Some(address) = self.sets.current_address().map(str::to_owned) else {
            // No custody address yet; outputs wait for one.
            return Ok(false);
        };

        let inputs = self.utxos.for_address(&address);
        let entry = self
            .sets
            .current_entry_mut()
            .expect("current address has an entry");

        let built = build_disbursal(
            &inputs,
            &self.pending_outputs,
            entry.script_pubkey(),
            &self.params.fee,
        )?;

        let signing = SigningTx::new(
            inputs,
            built.outputs,
            built.change,
            built.fee_paid,
            address.clone(),
            entry.witness_script().clone(),
            entry.sigset().len(),
        );
        entry.set_signing_tx(signing);
        self.pending_outputs.clear();

        debug!(address = %address, "disbursal awaiting signatures");
        Ok(true)
    }

    fn process_signature(
        &mut self,
        signatory_index: u32,
        signatures: Vec<DerSignature>,
    ) -> Result<(), SigningError> {
        let finalized = {
            let entry = self
                .sets
                .live_signing_entry_mut()
                .ok_or(SigningError::NoSigningInProgress)?;
            let signing = entry
                .signing_tx()
                .ok_or(SigningError::NoSigningInProgress)?;

            let n_inputs = signing.inputs().len();
            if signatures.len() != n_inputs {
                return Err(SigningError::BadFormat(Mismatch::new(
                    n_inputs,
                    signatures.len(),
                )));
            }

            let pos = signatory_index as usize;
            let signatory = *entry
                .sigset()
                .signatories()
                .get(pos)
                .ok_or(SigningError::BadIndex(signatory_index))?;

            if signing.has_submitted(pos) {
                return Err(SigningError::AlreadySigned(signatory_index));
            }

            let secp = Secp256k1::verification_only();
            let pubkey = PublicKey::from_slice(signatory.signatory_key.as_bytes())
                .map_err(|_| SigningError::BadSignature { input: 0 })?;
            for (input, sig) in signatures.iter().enumerate() {
                let msg = Message::from_digest(signing.sighash(input));
                let sig = ecdsa::Signature::from_der(sig.as_bytes())
                    .map_err(|_| SigningError::BadSignature { input })?;
                secp.verify_ecdsa(&msg, &sig, &pubkey)
                    .map_err(|_| SigningError::BadSignature { input })?;
            }

            let threshold = entry.sigset().threshold();
            let signing = entry
                .signing_tx_mut()
                .ok_or(SigningError::NoSigningInProgress)?;
            signing.record_submission(pos, signatory.voting_power as u64, signatures);

            if signing.signed_vp() >= threshold {
                let tx = signing.finalize();
                let spent: Vec<_> = signing.inputs().iter().map(Utxo::outpoint).collect();
                let txid = tx.compute_txid();
                let address = entry.address().to_owned();
                entry.complete_signing(consensus::serialize(&tx));
                Some((spent, txid, address))
            } else {
                None
            }
        };

        if let Some((spent, txid, address)) = finalized {
            self.utxos.remove_spent(&spent);
            info!(%txid, address = %address, "disbursal fully signed");
            // Start on any withdrawals that queued up while signing; a
            // build failure here just leaves them queued.
            let _ = self.try_build_signing_tx();
        }
        Ok(())
    }

    // Queryable state.

    pub fn params(&self) -> &PegParams {
        &self.params
    }

    /// The current P2SS deposit address, if a usable signatory set exists.
    pub fn current_address(&self) -> Option<&str> {
        self.sets.current_address()
    }

    /// The signatory set (current or archived) published at `address`.
    pub fn signatory_set(&self, address: &str) -> Option<&SignatorySetEntry> {
        self.sets.entry(address)
    }

    /// All tracked signatory sets, by address.
    pub fn signatory_sets(&self) -> impl Iterator<Item = &SignatorySetEntry> {
        self.sets.entries()
    }

    /// The verified header chain.
    pub fn chain(&self) -> &HeaderChain {
        &self.chain
    }

    /// All reserve UTXOs.
    pub fn utxos(&self) -> &[Utxo] {
        self.utxos.as_slice()
    }

    /// Deposit txids already credited.
    pub fn processed_txs(&self) -> &BTreeSet<Buf32> {
        &self.processed_txs
    }

    /// Withdrawal outputs not yet bound into a disbursal.
    pub fn pending_outputs(&self) -> &[TxOutput] {
        &self.pending_outputs
    }

    /// Committed signatory keys by consensus key.
    pub fn committed_keys(&self) -> &BTreeMap<Buf32, Buf33> {
        &self.committed_keys
    }
}
