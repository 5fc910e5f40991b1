//! The SPV header chain.
//!
//! Maintains a contiguous run of verified headers from a trusted initial
//! header. Extension enforces continuity, the encoded target, proof-of-work,
//! and the median-time-past rule; difficulty retargets follow the network
//! parameters (regtest carries its fixed target through). A reorganization
//! replaces a suffix of the chain only when the replacement is strictly
//! longer and forks within the configured depth allowance.

use std::io;

use bitcoin::{block::Header, params::Params, BlockHash, CompactTarget, Network};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use moorage_primitives::btc::{network_from_tag, network_to_tag};

use crate::{errors::HeaderError, header::BitcoinHeader};

/// Network and policy parameters for header verification.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct SpvParams {
    /// The Bitcoin network whose consensus rules apply.
    pub network: Network,

    /// Maximum depth below the tip at which a reorg fork point is accepted.
    pub max_reorg_depth: u64,
}

impl SpvParams {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            max_reorg_depth: 100,
        }
    }
}

impl BorshSerialize for SpvParams {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&network_to_tag(self.network), writer)?;
        BorshSerialize::serialize(&self.max_reorg_depth, writer)
    }
}

impl BorshDeserialize for SpvParams {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let tag = u8::deserialize_reader(reader)?;
        let max_reorg_depth = u64::deserialize_reader(reader)?;
        Ok(Self {
            network: network_from_tag(tag)?,
            max_reorg_depth,
        })
    }
}

/// The trusted starting point of the header chain.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize,
)]
pub struct GenesisView {
    /// Height of the trusted header.
    pub height: u64,

    /// The trusted header itself.
    pub header: BitcoinHeader,

    /// Target expected in the next header.
    pub next_target: u32,

    /// Timestamp of the block opening the current difficulty epoch. Needed
    /// when the trusted header sits mid-epoch.
    pub epoch_start_timestamp: u32,
}

impl GenesisView {
    /// A view anchored at an epoch-opening header (target and epoch start
    /// taken from the header itself).
    pub fn new(height: u64, header: BitcoinHeader) -> Self {
        let bits = header.inner().bits.to_consensus();
        let time = header.inner().time;
        Self {
            height,
            header,
            next_target: bits,
            epoch_start_timestamp: time,
        }
    }
}

/// A verified, contiguous Bitcoin header chain.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Deserialize, Serialize)]
pub struct HeaderChain {
    params: SpvParams,
    genesis: GenesisView,

    /// Verified headers; index 0 is the trusted genesis header.
    headers: Vec<BitcoinHeader>,

    /// Target expected in the next header, in compact consensus form.
    next_target: u32,

    /// Timestamp of the block that opened the current difficulty epoch.
    epoch_start_timestamp: u32,
}

impl HeaderChain {
    pub fn new(params: SpvParams, genesis: GenesisView) -> Self {
        Self {
            params,
            headers: vec![genesis.header],
            next_target: genesis.next_target,
            epoch_start_timestamp: genesis.epoch_start_timestamp,
            genesis,
        }
    }

    /// Height of the trusted initial header.
    pub fn start_height(&self) -> u64 {
        self.genesis.height
    }

    /// Height of the chain tip.
    pub fn height(&self) -> u64 {
        self.genesis.height + (self.headers.len() as u64 - 1)
    }

    /// All verified headers, genesis first.
    pub fn headers(&self) -> &[BitcoinHeader] {
        &self.headers
    }

    /// The header at an absolute height, if within the verified range.
    pub fn get_by_height(&self, height: u64) -> Option<&BitcoinHeader> {
        let idx = height.checked_sub(self.genesis.height)?;
        self.headers.get(idx as usize)
    }

    fn tip_hash(&self) -> BlockHash {
        self.headers
            .last()
            .expect("headers never empty")
            .block_hash()
    }

    /// Extends the chain with a run of contiguous headers.
    ///
    /// The run must attach either to the tip (plain extension) or to an
    /// ancestor within `max_reorg_depth` (reorg, accepted only if strictly
    /// longer than the branch it replaces). Either the whole run is accepted
    /// or the chain is left untouched.
    pub fn extend(&mut self, new_headers: &[BitcoinHeader]) -> Result<(), HeaderError> {
        let Some(first) = new_headers.first() else {
            return Ok(());
        };

        let attach = first.inner().prev_blockhash;
        let mut work = if attach == self.tip_hash() {
            self.clone()
        } else {
            self.fork_base(attach, new_headers.len())?
        };

        for header in new_headers {
            work.check_and_append(header.inner())?;
        }

        debug!(tip = work.height(), "extended header chain");
        *self = work;
        Ok(())
    }

    /// Rebuilds the chain up to the fork point for a reorg attaching at
    /// `attach`.
    fn fork_base(&self, attach: BlockHash, new_len: usize) -> Result<Self, HeaderError> {
        let max = self.params.max_reorg_depth;
        let fork_idx = self
            .headers
            .iter()
            .enumerate()
            .rev()
            .find(|(_, h)| h.block_hash() == attach)
            .map(|(i, _)| i)
            .ok_or(HeaderError::ContinuityError { prev: attach })?;

        let removed = self.headers.len() - 1 - fork_idx;
        if removed as u64 > max {
            return Err(HeaderError::ReorgTooDeep {
                depth: removed as u64,
                max,
            });
        }
        if new_len <= removed {
            return Err(HeaderError::ReorgLengthError {
                new_headers: new_len,
                old_headers: removed,
            });
        }

        warn!(
            fork_height = self.genesis.height + fork_idx as u64,
            removed, "reorganizing header chain"
        );

        // Replay the retained prefix from the trusted view; every retained
        // header was verified before, so this cannot fail.
        let mut base = Self::new(self.params, self.genesis);
        for header in &self.headers[1..=fork_idx] {
            base.check_and_append(header.inner())?;
        }
        Ok(base)
    }

    /// Checks all verification criteria for one header and appends it.
    ///
    /// The checks, in order: continuity against the tip, the encoded target
    /// against the expected target, proof-of-work against the encoded
    /// target, and the timestamp against the median of the last eleven.
    fn check_and_append(&mut self, header: &Header) -> Result<(), HeaderError> {
        if header.prev_blockhash != self.tip_hash() {
            return Err(HeaderError::ContinuityError {
                prev: header.prev_blockhash,
            });
        }

        if header.bits.to_consensus() != self.next_target {
            return Err(HeaderError::PowMismatch {
                expected: self.next_target,
                found: header.bits.to_consensus(),
            });
        }

        let block_hash = header.block_hash();
        if !header.target().is_met_by(block_hash) {
            return Err(HeaderError::PowNotMet { block_hash });
        }

        let median = self.median_time_past();
        if header.time <= median {
            return Err(HeaderError::TimestampError {
                time: header.time,
                median,
            });
        }

        self.headers.push(BitcoinHeader::new(*header));

        // Track the epoch-opening timestamp for retarget computation.
        let params = Params::new(self.params.network);
        let new_height = self.height();
        if new_height.is_multiple_of(params.difficulty_adjustment_interval()) {
            self.epoch_start_timestamp = header.time;
        }

        self.next_target = self.next_target_after(header, &params);
        Ok(())
    }

    /// The target for the block after `header` (the current tip).
    ///
    /// Unchanged except at a difficulty-adjustment boundary, where it derives
    /// from the timespan between the epoch start and the tip. Networks with
    /// retargeting disabled (regtest) keep their target through the boundary.
    fn next_target_after(&self, header: &Header, params: &Params) -> u32 {
        let next_height = self.height() + 1;
        if !next_height.is_multiple_of(params.difficulty_adjustment_interval()) {
            return self.next_target;
        }

        let timespan = header.time.saturating_sub(self.epoch_start_timestamp);
        CompactTarget::from_next_work_required(header.bits, timespan as u64, params).to_consensus()
    }

    /// Median of the last (up to) eleven block timestamps.
    fn median_time_past(&self) -> u32 {
        let count = self.headers.len().min(11);
        let mut times: Vec<u32> = self.headers[self.headers.len() - count..]
            .iter()
            .map(|h| h.inner().time)
            .collect();
        times.sort_unstable();
        times[times.len() / 2]
    }
}
