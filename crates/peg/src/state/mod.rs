//! Replicated state: the peg container and its component tables.

pub mod peg;
pub mod sets;
pub mod signing;
pub mod utxo;

pub use peg::PegState;
pub use sets::{SignatorySetEntry, SignatorySetsTable};
pub use signing::{SigningTx, TxOutput};
pub use utxo::{Utxo, UtxoTable};
