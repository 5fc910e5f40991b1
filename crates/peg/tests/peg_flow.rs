//! End-to-end peg flows against regtest parameters: deposit and mint,
//! withdrawal round-trip with signature collection, signatory rotation, and
//! the rejection paths.

use bitcoin::{
    absolute::LockTime,
    blockdata::constants::genesis_block,
    consensus,
    hashes::Hash,
    merkle_tree::{self, PartialMerkleTree},
    secp256k1::{Message, PublicKey, Secp256k1, SecretKey},
    transaction::Version,
    Amount, Network, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxMerkleNode, TxOut,
    Txid, Witness,
};
use ed25519_dalek::{Signer, SigningKey};
use moorage_peg::{
    deposit::commitment_script,
    errors::{DepositError, KeyCommitError, SigningError, WithdrawalError},
    CoinLedger, DerSignature, PegError, PegParams, PegState, PegTx,
};
use moorage_primitives::{BitcoinAmount, BitcoinScript, Buf32, Buf33, Buf64};
use moorage_sigset::{rank_validators, Validator};
use moorage_spv::{BitcoinHeader, GenesisView, TxInclusionProof};

/// A coin ledger that records every mint.
#[derive(Debug, Default)]
struct TestLedger {
    mints: Vec<(Vec<u8>, u64)>,
}

impl CoinLedger for TestLedger {
    fn mint(&mut self, recipient: &[u8], amount: BitcoinAmount) {
        self.mints.push((recipient.to_vec(), amount.to_sat()));
    }
}

/// One validator with its consensus and signatory key material.
struct TestValidator {
    consensus: SigningKey,
    signatory: SecretKey,
    voting_power: u32,
}

impl TestValidator {
    fn new(seed: u8, voting_power: u32) -> Self {
        Self {
            consensus: SigningKey::from_bytes(&[seed; 32]),
            signatory: SecretKey::from_slice(&[seed.max(1); 32]).expect("valid secret"),
            voting_power,
        }
    }

    fn consensus_key(&self) -> Buf32 {
        Buf32::from(self.consensus.verifying_key().to_bytes())
    }

    fn validator(&self) -> Validator {
        Validator::new(self.consensus_key(), self.voting_power)
    }

    fn signatory_pubkey(&self) -> Buf33 {
        let secp = Secp256k1::new();
        Buf33::from(PublicKey::from_secret_key(&secp, &self.signatory).serialize())
    }

    /// The key-commitment transaction for this validator, indexed against
    /// the given validator map.
    fn commit_tx(&self, validators: &[Validator]) -> PegTx {
        let ranked = rank_validators(validators);
        let signatory_index = ranked
            .iter()
            .position(|v| v.consensus_key == self.consensus_key())
            .expect("validator in ranking") as u32;
        let key = self.signatory_pubkey();
        let signature = Buf64::from(self.consensus.sign(key.as_bytes()).to_bytes());
        PegTx::SignatoryKey {
            signatory_index,
            signatory_key: key,
            signature,
        }
    }

    /// Signs every input of the live disbursal at `address`.
    fn sign_disbursal(&self, state: &PegState, address: &str) -> PegTx {
        let entry = state.signatory_set(address).expect("set exists");
        let signing = entry.signing_tx().expect("disbursal in progress");
        let pos = entry
            .sigset()
            .position_of(&self.consensus_key())
            .expect("in set") as u32;

        let secp = Secp256k1::new();
        let signatures = (0..signing.inputs().len())
            .map(|i| {
                let msg = Message::from_digest(signing.sighash(i));
                let sig = secp.sign_ecdsa(&msg, &self.signatory);
                DerSignature::new(sig.serialize_der().to_vec())
            })
            .collect();

        PegTx::Signature {
            signatory_index: pos,
            signatures,
        }
    }
}

/// Mines a regtest block committing to `txids`; returns its header.
fn mine_block(prev: &BitcoinHeader, time: u32, txids: &[Txid]) -> BitcoinHeader {
    let merkle_root = merkle_tree::calculate_root(txids.iter().copied())
        .map(|root: Txid| TxMerkleNode::from_byte_array(root.to_byte_array()))
        .unwrap_or_else(TxMerkleNode::all_zeros);

    let mut header = bitcoin::block::Header {
        version: prev.inner().version,
        prev_blockhash: prev.block_hash(),
        merkle_root,
        time,
        bits: prev.inner().bits,
        nonce: 0,
    };
    while !header.target().is_met_by(header.block_hash()) {
        header.nonce += 1;
    }
    BitcoinHeader::new(header)
}

/// A deposit paying `sats` to the tracked address, committing to
/// `recipient`.
fn deposit_tx(state: &PegState, address: &str, sats: u64, recipient: &[u8]) -> Transaction {
    let entry = state.signatory_set(address).expect("address tracked");
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array([0xee; 32]),
                vout: 0,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![
            TxOut {
                value: Amount::from_sat(sats),
                script_pubkey: entry.script_pubkey().inner().clone(),
            },
            TxOut {
                value: Amount::ZERO,
                script_pubkey: commitment_script(recipient).expect("recipient fits"),
            },
        ],
    }
}

fn inclusion_proof(height: u64, block_txids: &[Txid], matched: Txid) -> TxInclusionProof {
    let matches: Vec<bool> = block_txids.iter().map(|t| *t == matched).collect();
    TxInclusionProof::new(height, PartialMerkleTree::from_txids(block_txids, &matches))
}

fn fresh_state() -> PegState {
    let genesis = BitcoinHeader::new(genesis_block(Network::Regtest).header);
    PegState::new(PegParams::new(Network::Regtest), GenesisView::new(0, genesis))
}

/// Relays a mined deposit: extends the chain with the header and submits the
/// deposit with its proof.
fn relay_deposit(
    state: &mut PegState,
    validators: &[Validator],
    ledger: &mut TestLedger,
    tx: &Transaction,
) -> Result<(), PegError> {
    let tip = *state.chain().headers().last().expect("chain nonempty");
    let height = state.chain().height() + 1;
    let txid = tx.compute_txid();
    let header = mine_block(&tip, tip.inner().time + 600, &[txid]);

    state.apply(
        PegTx::Headers {
            headers: vec![header],
        },
        validators,
        ledger,
    )?;
    state.apply(
        PegTx::Deposit {
            tx: consensus::serialize(tx),
            proof: inclusion_proof(height, &[txid], txid),
        },
        validators,
        ledger,
    )
}

#[test]
fn single_validator_peg() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");

    let address = state.current_address().expect("address published").to_owned();

    // The derived address is stable across runs.
    let mut other = fresh_state();
    other
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    assert_eq!(other.current_address(), Some(address.as_str()));

    // Deposit half a bitcoin to alice.
    let tx = deposit_tx(&state, &address, 500_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");

    assert_eq!(ledger.mints, vec![(b"alice".to_vec(), 500_000_000)]);
    assert_eq!(state.utxos().len(), 1);
    assert_eq!(state.utxos()[0].value().to_sat(), 500_000_000);

    // Replaying the exact deposit is rejected and mints nothing more.
    let height = state.chain().height();
    let txid = tx.compute_txid();
    let err = state
        .apply(
            PegTx::Deposit {
                tx: consensus::serialize(&tx),
                proof: inclusion_proof(height, &[txid], txid),
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert_eq!(
        err,
        PegError::Deposit(DepositError::AlreadyProcessed),
        "replay must be rejected"
    );
    assert_eq!(state.utxos().len(), 1);
    assert_eq!(ledger.mints.len(), 1);
}

#[test]
fn withdrawal_round_trip() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let address = state.current_address().unwrap().to_owned();

    let tx = deposit_tx(&state, &address, 1_000_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");

    // Bob burns half a bitcoin to his script.
    let bob_script = {
        let mut s = vec![0x00, 0x14];
        s.extend_from_slice(&[0xbb; 20]);
        BitcoinScript::new(ScriptBuf::from_bytes(s))
    };
    state
        .apply(
            PegTx::Withdrawal {
                script: bob_script.clone(),
                amount: BitcoinAmount::from_sat(500_000_000),
            },
            &validators,
            &mut ledger,
        )
        .expect("withdrawal queued");

    // A disbursal is immediately under signing.
    let entry = state.signatory_set(&address).unwrap();
    let signing = entry.signing_tx().expect("disbursal in progress");
    let fee = signing.fee_paid().to_sat();
    assert_eq!(fee, 1_000, "small disbursal pays the relay floor");
    assert_eq!(signing.outputs().len(), 1);
    assert_eq!(signing.outputs()[0].script(), &bob_script);
    assert_eq!(signing.outputs()[0].value().to_sat(), 500_000_000 - fee);

    // B signs; the single signatory crosses the threshold.
    let sign = b.sign_disbursal(&state, &address);
    state
        .apply(sign, &validators, &mut ledger)
        .expect("signature accepted");

    let entry = state.signatory_set(&address).unwrap();
    assert!(entry.signing_tx().is_none());
    let signed: Transaction =
        consensus::deserialize(entry.signed_tx().expect("fully signed")).expect("decodes");

    // Fee conservation over the final transaction.
    let total_out: u64 = signed.output.iter().map(|o| o.value.to_sat()).sum();
    assert_eq!(total_out + fee, 1_000_000_000);
    assert_eq!(signed.output[0].value.to_sat(), 500_000_000 - fee);

    // Witness carries the signature slot plus the witness script.
    let witness: Vec<_> = signed.input[0].witness.iter().collect();
    assert_eq!(witness.len(), 2);
    assert_eq!(
        *witness.last().unwrap(),
        entry.witness_script().as_bytes()
    );

    // The spent reserve UTXO is gone.
    assert!(state.utxos().is_empty());
}

#[test]
fn signatory_rotation_keeps_old_set_queryable() {
    let b = TestValidator::new(7, 10);
    let mut validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let first_address = state.current_address().unwrap().to_owned();

    // A new validator joins and commits.
    let a = TestValidator::new(9, 10);
    validators.push(a.validator());
    state.update_signatory_set(&validators);
    state
        .apply(a.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");

    let second_address = state.current_address().unwrap().to_owned();
    assert_ne!(first_address, second_address);

    // The old set stays tracked for inflight UTXOs.
    assert!(state.signatory_set(&first_address).is_some());
    assert!(state.signatory_set(&second_address).is_some());
    assert_eq!(
        state.signatory_set(&second_address).unwrap().sigset().len(),
        2
    );
}

#[test]
fn withdrawal_without_room_for_change_rejected() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let address = state.current_address().unwrap().to_owned();

    let tx = deposit_tx(&state, &address, 10_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");

    // The output swallows the whole reserve: no change, no fee.
    let err = state
        .apply(
            PegTx::Withdrawal {
                script: BitcoinScript::new(ScriptBuf::from_bytes(vec![0x51])),
                amount: BitcoinAmount::from_sat(10_000),
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PegError::Withdrawal(WithdrawalError::Disbursal(
            moorage_peg::errors::DisbursalError::InsufficientFunds { .. }
        ))
    ));

    // Prior state intact: nothing queued, nothing signing.
    assert!(state.pending_outputs().is_empty());
    assert!(state.signatory_set(&address).unwrap().signing_tx().is_none());
}

#[test]
fn bad_merkle_proof_rejected() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let address = state.current_address().unwrap().to_owned();

    // Mine a block for some unrelated transaction.
    let unrelated = Txid::from_byte_array([0x11; 32]);
    let tip = *state.chain().headers().last().unwrap();
    let header = mine_block(&tip, tip.inner().time + 600, &[unrelated]);
    state
        .apply(
            PegTx::Headers {
                headers: vec![header],
            },
            &validators,
            &mut ledger,
        )
        .expect("headers accepted");

    // Proof over the deposit txid does not match that block's root.
    let tx = deposit_tx(&state, &address, 500_000_000, b"alice");
    let txid = tx.compute_txid();
    let err = state
        .apply(
            PegTx::Deposit {
                tx: consensus::serialize(&tx),
                proof: inclusion_proof(1, &[txid], txid),
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert!(matches!(err, PegError::Deposit(DepositError::BadProof(_))));

    // No state change.
    assert!(state.utxos().is_empty());
    assert!(state.processed_txs().is_empty());
    assert!(ledger.mints.is_empty());

    // A proof against a height we never verified is also rejected.
    let err = state
        .apply(
            PegTx::Deposit {
                tx: consensus::serialize(&tx),
                proof: inclusion_proof(50, &[txid], txid),
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert_eq!(err, PegError::Deposit(DepositError::UnknownHeight(50)));
}

#[test]
fn deposit_to_untracked_script_rejected() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");

    // Pays a random P2WPKH, not the signatory set.
    let mut tx = deposit_tx(&state, state.current_address().unwrap(), 500_000_000, b"alice");
    let mut stranger = vec![0x00, 0x14];
    stranger.extend_from_slice(&[0x77; 20]);
    tx.output[0].script_pubkey = ScriptBuf::from_bytes(stranger);

    let err = relay_deposit(&mut state, &validators, &mut ledger, &tx).unwrap_err();
    assert_eq!(err, PegError::Deposit(DepositError::NotPeggedPayment));
}

#[test]
fn deposit_without_commitment_rejected() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");

    let mut tx = deposit_tx(&state, state.current_address().unwrap(), 500_000_000, b"alice");
    tx.output.truncate(1);

    let err = relay_deposit(&mut state, &validators, &mut ledger, &tx).unwrap_err();
    assert_eq!(err, PegError::Deposit(DepositError::MissingCommitment));
    assert!(ledger.mints.is_empty());
}

#[test]
fn commitment_under_foreign_key_rejected() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();
    let mut state = fresh_state();

    // Signed by an unrelated consensus key.
    let mallory = SigningKey::from_bytes(&[0x42; 32]);
    let key = b.signatory_pubkey();
    let signature = Buf64::from(mallory.sign(key.as_bytes()).to_bytes());

    let err = state
        .apply(
            PegTx::SignatoryKey {
                signatory_index: 0,
                signatory_key: key,
                signature,
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert_eq!(err, PegError::KeyCommit(KeyCommitError::BadSignature));
    assert!(state.committed_keys().is_empty());
    assert_eq!(state.current_address(), None);

    // An index past the ranking is rejected outright.
    let key = b.signatory_pubkey();
    let signature = Buf64::from(b.consensus.sign(key.as_bytes()).to_bytes());
    let err = state
        .apply(
            PegTx::SignatoryKey {
                signatory_index: 5,
                signatory_key: key,
                signature,
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert_eq!(err, PegError::KeyCommit(KeyCommitError::BadIndex(5)));
}

#[test]
fn finalization_at_threshold_not_earlier() {
    // Three equal signatories: threshold is ceil(2*9/3) = 6, reached by the
    // second submission.
    let v1 = TestValidator::new(3, 3);
    let v2 = TestValidator::new(5, 3);
    let v3 = TestValidator::new(8, 3);
    let validators = vec![v1.validator(), v2.validator(), v3.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    for v in [&v1, &v2, &v3] {
        state
            .apply(v.commit_tx(&validators), &validators, &mut ledger)
            .expect("commitment accepted");
    }
    let address = state.current_address().unwrap().to_owned();

    let tx = deposit_tx(&state, &address, 1_000_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");

    state
        .apply(
            PegTx::Withdrawal {
                script: BitcoinScript::new(ScriptBuf::from_bytes(vec![0x51])),
                amount: BitcoinAmount::from_sat(100_000_000),
            },
            &validators,
            &mut ledger,
        )
        .expect("withdrawal queued");

    let first = v1.sign_disbursal(&state, &address);
    state.apply(first, &validators, &mut ledger).expect("accepted");
    let entry = state.signatory_set(&address).unwrap();
    assert!(
        entry.signing_tx().is_some(),
        "3 of 9 voting power must not finalize"
    );
    assert_eq!(entry.signing_tx().unwrap().signed_vp(), 3);

    // Same signatory again: rejected.
    let again = v1.sign_disbursal(&state, &address);
    let err = state.apply(again, &validators, &mut ledger).unwrap_err();
    assert!(matches!(
        err,
        PegError::Signing(SigningError::AlreadySigned(_))
    ));

    let second = v2.sign_disbursal(&state, &address);
    state.apply(second, &validators, &mut ledger).expect("accepted");
    let entry = state.signatory_set(&address).unwrap();
    assert!(
        entry.signing_tx().is_none(),
        "6 of 9 voting power finalizes"
    );
    assert!(entry.signed_tx().is_some());

    // Finalized: stragglers are turned away.
    let late = PegTx::Signature {
        signatory_index: 2,
        signatures: vec![DerSignature::new(vec![0x30])],
    };
    let err = state.apply(late, &validators, &mut ledger).unwrap_err();
    assert_eq!(
        err,
        PegError::Signing(SigningError::NoSigningInProgress)
    );
}

#[test]
fn recommitment_while_signing_rejected() {
    let v1 = TestValidator::new(3, 3);
    let v2 = TestValidator::new(5, 3);
    let v3 = TestValidator::new(8, 3);
    let validators = vec![v1.validator(), v2.validator(), v3.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    for v in [&v1, &v2, &v3] {
        state
            .apply(v.commit_tx(&validators), &validators, &mut ledger)
            .expect("commitment accepted");
    }
    let address = state.current_address().unwrap().to_owned();

    let tx = deposit_tx(&state, &address, 1_000_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");
    state
        .apply(
            PegTx::Withdrawal {
                script: BitcoinScript::new(ScriptBuf::from_bytes(vec![0x51])),
                amount: BitcoinAmount::from_sat(100_000_000),
            },
            &validators,
            &mut ledger,
        )
        .expect("withdrawal queued");

    // v1 contributes to the live disbursal.
    let sign = v1.sign_disbursal(&state, &address);
    state.apply(sign, &validators, &mut ledger).expect("accepted");

    // Rotating v1's key mid-flight is rejected.
    let secp = Secp256k1::new();
    let fresh_secret = SecretKey::from_slice(&[0x33; 32]).unwrap();
    let fresh_key = Buf33::from(PublicKey::from_secret_key(&secp, &fresh_secret).serialize());
    let ranked = rank_validators(&validators);
    let signatory_index = ranked
        .iter()
        .position(|v| v.consensus_key == v1.consensus_key())
        .unwrap() as u32;
    let signature = Buf64::from(v1.consensus.sign(fresh_key.as_bytes()).to_bytes());

    let err = state
        .apply(
            PegTx::SignatoryKey {
                signatory_index,
                signatory_key: fresh_key,
                signature,
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert_eq!(err, PegError::KeyCommit(KeyCommitError::KeyInUse));

    // Re-committing the unchanged key stays idempotent.
    state
        .apply(v1.commit_tx(&validators), &validators, &mut ledger)
        .expect("idempotent re-commitment accepted");
    assert_eq!(state.current_address(), Some(address.as_str()));
}

#[test]
fn queryable_state_serializes_to_json() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let address = state.current_address().unwrap().to_owned();
    let tx = deposit_tx(&state, &address, 500_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");

    let json = serde_json::to_string(&state).expect("serializes");
    assert!(json.contains(&address));

    let restored: PegState = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(restored.current_address(), Some(address.as_str()));
    assert_eq!(restored.utxos(), state.utxos());
}

#[test]
fn bad_disbursal_signature_rejected() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let address = state.current_address().unwrap().to_owned();

    let tx = deposit_tx(&state, &address, 1_000_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");
    state
        .apply(
            PegTx::Withdrawal {
                script: BitcoinScript::new(ScriptBuf::from_bytes(vec![0x51])),
                amount: BitcoinAmount::from_sat(100_000_000),
            },
            &validators,
            &mut ledger,
        )
        .expect("withdrawal queued");

    // A signature over the wrong digest.
    let secp = Secp256k1::new();
    let wrong_msg = Message::from_digest([0xab; 32]);
    let stranger = SecretKey::from_slice(&[0x21; 32]).unwrap();
    let sig = secp.sign_ecdsa(&wrong_msg, &stranger);
    let err = state
        .apply(
            PegTx::Signature {
                signatory_index: 0,
                signatures: vec![DerSignature::new(sig.serialize_der().to_vec())],
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PegError::Signing(SigningError::BadSignature { input: 0 })
    ));

    // A submission without one signature per input is malformed.
    let err = state
        .apply(
            PegTx::Signature {
                signatory_index: 0,
                signatures: vec![],
            },
            &validators,
            &mut ledger,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PegError::Signing(SigningError::BadFormat(_))
    ));

    // Still collecting.
    assert!(state
        .signatory_set(&address)
        .unwrap()
        .signing_tx()
        .is_some());
}

#[test]
fn state_survives_borsh_roundtrip() {
    let b = TestValidator::new(7, 10);
    let validators = vec![b.validator()];
    let mut ledger = TestLedger::default();

    let mut state = fresh_state();
    state
        .apply(b.commit_tx(&validators), &validators, &mut ledger)
        .expect("commitment accepted");
    let address = state.current_address().unwrap().to_owned();
    let tx = deposit_tx(&state, &address, 1_000_000_000, b"alice");
    relay_deposit(&mut state, &validators, &mut ledger, &tx).expect("deposit accepted");

    let bytes = borsh::to_vec(&state).expect("serialize");
    let restored: PegState = borsh::from_slice(&bytes).expect("deserialize");

    assert_eq!(restored.current_address(), state.current_address());
    assert_eq!(restored.utxos(), state.utxos());
    assert_eq!(restored.processed_txs(), state.processed_txs());
    assert_eq!(
        borsh::to_vec(&restored).expect("serialize"),
        bytes,
        "round-trip is byte-stable"
    );
}
