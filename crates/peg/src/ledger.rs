//! Interface to the sidechain's coin ledger.

use moorage_primitives::BitcoinAmount;

/// The coin ledger holding pegged balances.
///
/// The peg only ever credits it: a verified deposit mints pegged coins to
/// the recipient committed in the deposit transaction. Burns flow the other
/// way as withdrawal transactions routed by the ledger into the peg's
/// pending output queue.
pub trait CoinLedger {
    /// Credits `amount` of pegged coin to the sidechain account identified
    /// by the opaque `recipient` bytes.
    fn mint(&mut self, recipient: &[u8], amount: BitcoinAmount);
}
