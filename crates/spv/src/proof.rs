//! Transaction inclusion proofs.

use std::io;

use bitcoin::{block::Header, consensus, merkle_tree::PartialMerkleTree, Txid};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ProofError;

/// A merkle inclusion proof tying one transaction to a block at a claimed
/// height.
///
/// The partial tree carries the sibling hashes and the match bitmap; the
/// height points at the header whose merkle root the proof must reproduce.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxInclusionProof {
    height: u64,
    tree: PartialMerkleTree,
}

impl TxInclusionProof {
    pub fn new(height: u64, tree: PartialMerkleTree) -> Self {
        Self { height, tree }
    }

    /// The block height the proof claims inclusion at.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Checks that the proof commits to exactly `txid` under `header`'s
    /// merkle root.
    pub fn verify(&self, header: &Header, txid: Txid) -> Result<(), ProofError> {
        let mut txids = Vec::new();
        let mut indexes = Vec::new();
        let root = self
            .tree
            .extract_matches(&mut txids, &mut indexes)
            .map_err(|_| ProofError::Malformed)?;

        if root != header.merkle_root {
            return Err(ProofError::RootMismatch);
        }
        if txids.len() != 1 {
            return Err(ProofError::NotSingleMatch(txids.len()));
        }
        if txids[0] != txid {
            return Err(ProofError::TxidMismatch);
        }
        Ok(())
    }
}

// The partial tree doesn't implement serde upstream; carry it as the hex of
// its consensus encoding.
#[derive(Deserialize, Serialize)]
struct TxInclusionProofRepr {
    height: u64,
    tree: String,
}

impl Serialize for TxInclusionProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TxInclusionProofRepr {
            height: self.height,
            tree: hex::encode(consensus::serialize(&self.tree)),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TxInclusionProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TxInclusionProofRepr::deserialize(deserializer)?;
        let bytes = hex::decode(&repr.tree).map_err(de::Error::custom)?;
        let tree = consensus::deserialize(&bytes).map_err(de::Error::custom)?;
        Ok(Self {
            height: repr.height,
            tree,
        })
    }
}

impl BorshSerialize for TxInclusionProof {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.height, writer)?;
        BorshSerialize::serialize(&consensus::serialize(&self.tree), writer)
    }
}

impl BorshDeserialize for TxInclusionProof {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let height = u64::deserialize_reader(reader)?;
        let bytes = Vec::<u8>::deserialize_reader(reader)?;
        let tree: PartialMerkleTree = consensus::deserialize(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { height, tree })
    }
}
