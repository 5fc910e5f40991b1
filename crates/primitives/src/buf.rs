//! Fixed-size byte buffers.

use crate::macros::{
    impl_buf_arbitrary, impl_buf_borsh, impl_buf_core, impl_buf_fmt, impl_buf_serde,
};

/// A 32-byte buffer.
///
/// Used for consensus public keys, transaction ids, block hashes and merkle
/// roots. Comparison is plain byte-lexicographic over the stored order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Buf32(pub [u8; 32]);
impl_buf_core!(Buf32, 32);
impl_buf_fmt!(Buf32, 32);
impl_buf_borsh!(Buf32, 32);
impl_buf_serde!(Buf32, 32);
impl_buf_arbitrary!(Buf32, 32);

/// A 33-byte buffer holding a compressed secp256k1 public key.
///
/// Validity as a curve point is *not* implied by this type; it is checked at
/// the registry boundary when a signatory commits a key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Buf33(pub [u8; 33]);
impl_buf_core!(Buf33, 33);
impl_buf_fmt!(Buf33, 33);
impl_buf_borsh!(Buf33, 33);
impl_buf_serde!(Buf33, 33);
impl_buf_arbitrary!(Buf33, 33);

/// A 64-byte buffer holding an ed25519 signature.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Buf64(pub [u8; 64]);

impl Buf64 {
    pub const LEN: usize = 64;

    pub const fn new(data: [u8; 64]) -> Self {
        Self(data)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub const fn into_bytes(self) -> [u8; 64] {
        self.0
    }
}

impl From<[u8; 64]> for Buf64 {
    fn from(value: [u8; 64]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for Buf64 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<'a> TryFrom<&'a [u8]> for Buf64 {
    type Error = usize;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 64]>::try_from(value).map(Self).map_err(|_| value.len())
    }
}

impl_buf_fmt!(Buf64, 64);
impl_buf_borsh!(Buf64, 64);
impl_buf_serde!(Buf64, 64);
impl_buf_arbitrary!(Buf64, 64);
