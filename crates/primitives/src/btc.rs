//! Thin wrappers around `bitcoin` values used inside replicated state.
//!
//! The upstream types don't implement borsh, so each wrapper carries a manual
//! impl over the type's canonical byte form. Display follows the Bitcoin
//! convention (txids reversed).

use std::io;

use arbitrary::Arbitrary;
use bitcoin::{hashes::Hash, Network, OutPoint, ScriptBuf, Txid};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::buf::Buf32;

/// Borsh tag for a [`Network`], which doesn't implement borsh itself.
pub fn network_to_tag(network: Network) -> u8 {
    match network {
        Network::Bitcoin => 0,
        Network::Testnet => 1,
        Network::Signet => 2,
        Network::Regtest => 3,
        // `Network` is non-exhaustive; unknown variants are not expected in
        // replicated state.
        _ => u8::MAX,
    }
}

/// Inverse of [`network_to_tag`].
pub fn network_from_tag(tag: u8) -> io::Result<Network> {
    match tag {
        0 => Ok(Network::Bitcoin),
        1 => Ok(Network::Testnet),
        2 => Ok(Network::Signet),
        3 => Ok(Network::Regtest),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unknown network tag {tag}"),
        )),
    }
}

/// A Bitcoin transaction id.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct BitcoinTxid(Txid);

impl BitcoinTxid {
    pub fn new(txid: Txid) -> Self {
        Self(txid)
    }

    pub fn inner(&self) -> Txid {
        self.0
    }

    /// The txid's raw bytes in internal (little-endian) order.
    pub fn as_buf32(&self) -> Buf32 {
        Buf32::from(self.0.to_byte_array())
    }
}

impl From<Txid> for BitcoinTxid {
    fn from(value: Txid) -> Self {
        Self(value)
    }
}

impl From<BitcoinTxid> for Txid {
    fn from(value: BitcoinTxid) -> Self {
        value.0
    }
}

impl From<Buf32> for BitcoinTxid {
    fn from(value: Buf32) -> Self {
        Self(Txid::from_byte_array(value.into_bytes()))
    }
}

impl BorshSerialize for BitcoinTxid {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.0.to_byte_array())
    }
}

impl BorshDeserialize for BitcoinTxid {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(Self(Txid::from_byte_array(buf)))
    }
}

impl<'a> Arbitrary<'a> for BitcoinTxid {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self(Txid::from_byte_array(<[u8; 32]>::arbitrary(u)?)))
    }
}

/// A reference to a Bitcoin transaction output.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct BitcoinOutPoint {
    /// Id of the transaction holding the output.
    pub txid: BitcoinTxid,
    /// Index of the output within that transaction.
    pub vout: u32,
}

impl BitcoinOutPoint {
    pub fn new(txid: BitcoinTxid, vout: u32) -> Self {
        Self { txid, vout }
    }
}

impl From<OutPoint> for BitcoinOutPoint {
    fn from(value: OutPoint) -> Self {
        Self {
            txid: value.txid.into(),
            vout: value.vout,
        }
    }
}

impl From<BitcoinOutPoint> for OutPoint {
    fn from(value: BitcoinOutPoint) -> Self {
        OutPoint {
            txid: value.txid.into(),
            vout: value.vout,
        }
    }
}

/// A Bitcoin script, either a scriptPubKey or a witness script.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BitcoinScript(ScriptBuf);

impl BitcoinScript {
    pub fn new(script: ScriptBuf) -> Self {
        Self(script)
    }

    pub fn inner(&self) -> &ScriptBuf {
        &self.0
    }

    pub fn into_inner(self) -> ScriptBuf {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ScriptBuf> for BitcoinScript {
    fn from(value: ScriptBuf) -> Self {
        Self(value)
    }
}

impl From<BitcoinScript> for ScriptBuf {
    fn from(value: BitcoinScript) -> Self {
        value.0
    }
}

impl BorshSerialize for BitcoinScript {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.0.as_bytes().to_vec(), writer)
    }
}

impl BorshDeserialize for BitcoinScript {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let bytes = Vec::<u8>::deserialize_reader(reader)?;
        Ok(Self(ScriptBuf::from_bytes(bytes)))
    }
}

impl<'a> Arbitrary<'a> for BitcoinScript {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let bytes = Vec::<u8>::arbitrary(u)?;
        Ok(Self(ScriptBuf::from_bytes(bytes)))
    }
}
