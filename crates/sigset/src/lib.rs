//! Signatory sets: deterministic selection of validators for Bitcoin
//! custody, the weighted-threshold witness script that encodes them, and the
//! derived pay-to-signatory-set (P2SS) address.

pub mod errors;
pub mod script;
pub mod selection;
pub mod set;

pub use errors::SigsetError;
pub use selection::{rank_validators, select_signatories, Validator};
pub use set::{Signatory, SignatorySet};

/// The maximum number of signatories in a signatory set.
///
/// Signatory sets are constructed by iterating over the validator set in
/// descending order of voting power, skipping validators which have not
/// committed a signatory key.
///
/// This constant balances the decentralization of the signatory set against
/// the size of the resulting witness script (affecting fees), and is chosen
/// so that the script always stays within Bitcoin's standardness limit for
/// witness scripts.
pub const MAX_SIGNATORIES: usize = 76;
