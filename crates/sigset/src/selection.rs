//! Deterministic validator ranking and signatory selection.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use moorage_primitives::{Buf32, Buf33};
use serde::{Deserialize, Serialize};

use crate::{
    set::{Signatory, SignatorySet},
    MAX_SIGNATORIES,
};

/// A validator as reported by the consensus layer for the current block.
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
pub struct Validator {
    /// The validator's ed25519 consensus public key.
    pub consensus_key: Buf32,

    /// Voting power assigned by the consensus layer.
    pub voting_power: u32,
}

impl Validator {
    pub fn new(consensus_key: Buf32, voting_power: u32) -> Self {
        Self {
            consensus_key,
            voting_power,
        }
    }
}

/// Ranks validators for signatory selection.
///
/// Sorts by voting power descending, ties broken by consensus key descending
/// byte-lexicographic, and truncates to [`MAX_SIGNATORIES`]. The output is
/// byte-identical for any permutation of the input: the sort key is total
/// over distinct validators, and duplicate consensus keys cannot occur in a
/// validator set.
///
/// Signatory-key commitments are indexed by position in this ranking.
pub fn rank_validators(validators: &[Validator]) -> Vec<Validator> {
    let mut ranked = validators.to_vec();
    ranked.sort_by(|a, b| {
        (b.voting_power, b.consensus_key).cmp(&(a.voting_power, a.consensus_key))
    });
    ranked.truncate(MAX_SIGNATORIES);
    ranked
}

/// Builds the signatory set for the current block.
///
/// Takes the ranked validators (from [`rank_validators`]) and the
/// committed-key registry, and keeps, in ranking order, every validator that
/// has committed a signatory key. Validators without a commitment cannot
/// sign and so cannot occupy a script slot.
pub fn select_signatories(
    ranked: &[Validator],
    committed_keys: &BTreeMap<Buf32, Buf33>,
) -> SignatorySet {
    let signatories = ranked
        .iter()
        .filter_map(|v| {
            committed_keys.get(&v.consensus_key).map(|key| Signatory {
                consensus_key: v.consensus_key,
                voting_power: v.voting_power,
                signatory_key: *key,
            })
        })
        .collect();

    SignatorySet::new(signatories)
}
