//! Borsh-capable wrapper for Bitcoin block headers.

use std::io;

use bitcoin::{block::Header, consensus, BlockHash};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// The consensus-serialized length of a block header.
const HEADER_LEN: usize = 80;

/// A Bitcoin block header carried in replicated state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BitcoinHeader(Header);

impl BitcoinHeader {
    pub fn new(header: Header) -> Self {
        Self(header)
    }

    pub fn inner(&self) -> &Header {
        &self.0
    }

    pub fn block_hash(&self) -> BlockHash {
        self.0.block_hash()
    }
}

impl From<Header> for BitcoinHeader {
    fn from(value: Header) -> Self {
        Self(value)
    }
}

impl From<BitcoinHeader> for Header {
    fn from(value: BitcoinHeader) -> Self {
        value.0
    }
}

impl BorshSerialize for BitcoinHeader {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let bytes = consensus::serialize(&self.0);
        debug_assert_eq!(bytes.len(), HEADER_LEN);
        writer.write_all(&bytes)
    }
}

impl BorshDeserialize for BitcoinHeader {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf)?;
        let header: Header = consensus::deserialize(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self(header))
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{blockdata::constants::genesis_block, Network};

    use super::*;

    #[test]
    fn test_header_borsh_roundtrip() {
        let header = BitcoinHeader::new(genesis_block(Network::Regtest).header);
        let bytes = borsh::to_vec(&header).expect("serialize");
        assert_eq!(bytes.len(), HEADER_LEN);
        let back: BitcoinHeader = borsh::from_slice(&bytes).expect("deserialize");
        assert_eq!(back, header);
        assert_eq!(back.block_hash(), header.block_hash());
    }
}
