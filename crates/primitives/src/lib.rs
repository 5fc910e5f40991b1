//! Core primitive types shared across the peg: fixed-size byte buffers,
//! satoshi amounts, and thin wrappers around `bitcoin` values that carry
//! the serialization impls required by replicated state.

pub mod amount;
pub mod btc;
pub mod buf;
pub mod errors;

pub(crate) mod macros;

pub use amount::BitcoinAmount;
pub use btc::{BitcoinOutPoint, BitcoinScript, BitcoinTxid};
pub use buf::{Buf32, Buf33, Buf64};
pub use errors::Mismatch;
