//! Admitted transaction kinds.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::{BitcoinAmount, BitcoinScript, Buf33, Buf64};
use moorage_spv::{BitcoinHeader, TxInclusionProof};
use serde::{Deserialize, Serialize};

/// A DER-encoded secp256k1 ECDSA signature, without the sighash flag.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct DerSignature(Vec<u8>);

impl DerSignature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The signature as it appears in a witness slot: DER bytes with the
    /// `SIGHASH_ALL` flag appended.
    pub fn to_witness_bytes(&self) -> Vec<u8> {
        let mut bytes = self.0.clone();
        bytes.push(bitcoin::EcdsaSighashType::All as u8);
        bytes
    }
}

/// One admitted transaction, as ordered by the consensus layer.
///
/// Every variant applies atomically against the replicated peg state or is
/// rejected without effect.
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize)]
pub enum PegTx {
    /// Extends the SPV header chain.
    Headers { headers: Vec<BitcoinHeader> },

    /// Relays a Bitcoin deposit with its inclusion proof.
    Deposit {
        /// Consensus-serialized Bitcoin transaction.
        tx: Vec<u8>,
        /// Inclusion proof carrying the claimed height.
        proof: TxInclusionProof,
    },

    /// Commits a validator's secp256k1 signatory key, authenticated by its
    /// ed25519 consensus key.
    SignatoryKey {
        /// Position of the validator in the current ranking.
        signatory_index: u32,
        /// Compressed secp256k1 public key being committed.
        signatory_key: Buf33,
        /// ed25519 signature over the raw key bytes.
        signature: Buf64,
    },

    /// Submits one disbursal signature per input of the live signing
    /// transaction.
    Signature {
        /// Position of the signatory in the set bound to the disbursal.
        signatory_index: u32,
        /// One DER signature per input, in input order.
        signatures: Vec<DerSignature>,
    },

    /// Queues a withdrawal output, routed from the coin ledger when pegged
    /// coins are burned.
    Withdrawal {
        /// The scriptPubKey the user withdraws to.
        script: BitcoinScript,
        /// Amount in satoshis, before fee apportionment.
        amount: BitcoinAmount,
    },
}
