//! Crate-internal impl macros for fixed-size buffer types.

/// Generates the foundational API for a fixed-size byte buffer newtype.
macro_rules! impl_buf_core {
    ($name:ident, $len:expr) => {
        impl $name {
            /// The buffer length in bytes.
            pub const LEN: usize = $len;

            pub const fn new(data: [u8; $len]) -> Self {
                Self(data)
            }

            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub const fn into_bytes(self) -> [u8; $len] {
                self.0
            }

            pub fn zero() -> Self {
                Self([0u8; $len])
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl ::std::convert::From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl ::std::convert::From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl ::std::convert::AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl<'a> ::std::convert::TryFrom<&'a [u8]> for $name {
            type Error = usize;

            fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
                <[u8; $len]>::try_from(value)
                    .map(Self)
                    .map_err(|_| value.len())
            }
        }
    };
}

/// Generates hex-formatted `Debug`/`Display` and `FromStr`.
macro_rules! impl_buf_fmt {
    ($name:ident, $len:expr) => {
        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&::hex::encode(self.0))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                // Abbreviated form for logs.
                let hex = ::hex::encode(self.0);
                f.write_str(&hex[..6])?;
                f.write_str("..")?;
                f.write_str(&hex[hex.len() - 6..])
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut buf = [0u8; $len];
                ::hex::decode_to_slice(s, &mut buf)?;
                Ok(Self(buf))
            }
        }
    };
}

/// Generates borsh impls by delegating to the inner byte array.
macro_rules! impl_buf_borsh {
    ($name:ident, $len:expr) => {
        impl ::borsh::BorshSerialize for $name {
            fn serialize<W: ::std::io::Write>(&self, writer: &mut W) -> ::std::io::Result<()> {
                writer.write_all(&self.0)
            }
        }

        impl ::borsh::BorshDeserialize for $name {
            fn deserialize_reader<R: ::std::io::Read>(reader: &mut R) -> ::std::io::Result<Self> {
                let mut buf = [0u8; $len];
                reader.read_exact(&mut buf)?;
                Ok(Self(buf))
            }
        }
    };
}

/// Generates serde impls: hex strings for human-readable formats, raw bytes
/// otherwise.
macro_rules! impl_buf_serde {
    ($name:ident, $len:expr) => {
        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                if s.is_human_readable() {
                    s.serialize_str(&::hex::encode(self.0))
                } else {
                    s.serialize_bytes(&self.0)
                }
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                use ::serde::de::Error;
                if d.is_human_readable() {
                    let s = <String as ::serde::Deserialize>::deserialize(d)?;
                    s.parse().map_err(D::Error::custom)
                } else {
                    let v = <Vec<u8> as ::serde::Deserialize>::deserialize(d)?;
                    Self::try_from(v.as_slice())
                        .map_err(|l| D::Error::custom(format!("expected {} bytes, got {l}", $len)))
                }
            }
        }
    };
}

/// Generates an `Arbitrary` impl filling the buffer from the unstructured
/// input.
macro_rules! impl_buf_arbitrary {
    ($name:ident, $len:expr) => {
        impl<'a> ::arbitrary::Arbitrary<'a> for $name {
            fn arbitrary(u: &mut ::arbitrary::Unstructured<'a>) -> ::arbitrary::Result<Self> {
                Ok(Self(<[u8; $len]>::arbitrary(u)?))
            }
        }
    };
}

pub(crate) use {impl_buf_arbitrary, impl_buf_borsh, impl_buf_core, impl_buf_fmt, impl_buf_serde};
