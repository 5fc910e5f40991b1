//! Satoshi amounts.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// An amount of bitcoin, in satoshis.
///
/// All amounts in replicated state use this type rather than raw integers so
/// that unit mistakes fail to typecheck. Arithmetic is checked; overflow is a
/// rejection at the call site, never a wrap.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
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
#[repr(transparent)]
pub struct BitcoinAmount(u64);

impl BitcoinAmount {
    pub const ZERO: Self = Self(0);

    /// The number of satoshis in one bitcoin.
    pub const SAT_PER_BTC: u64 = 100_000_000;

    pub const fn from_sat(sat: u64) -> Self {
        Self(sat)
    }

    pub const fn to_sat(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl From<bitcoin::Amount> for BitcoinAmount {
    fn from(value: bitcoin::Amount) -> Self {
        Self::from_sat(value.to_sat())
    }
}

impl From<BitcoinAmount> for bitcoin::Amount {
    fn from(value: BitcoinAmount) -> Self {
        bitcoin::Amount::from_sat(value.to_sat())
    }
}
