//! Deposit transaction anatomy.
//!
//! A deposit pays a tracked P2SS address and commits, in a separate
//! `OP_RETURN` output, to the sidechain recipient that should be credited.
//! The commitment payload is a one-byte length prefix followed by the
//! recipient's sidechain address bytes.

use bitcoin::{
    opcodes::all::OP_RETURN,
    script::{Instruction, PushBytesBuf},
    ScriptBuf, Transaction,
};

/// Builds the commitment output script for a deposit to `recipient`.
///
/// Returns `None` when the recipient doesn't fit the one-byte length prefix.
pub fn commitment_script(recipient: &[u8]) -> Option<ScriptBuf> {
    if recipient.len() > u8::MAX as usize {
        return None;
    }
    let mut payload = Vec::with_capacity(1 + recipient.len());
    payload.push(recipient.len() as u8);
    payload.extend_from_slice(recipient);

    let data = PushBytesBuf::try_from(payload).ok()?;
    Some(ScriptBuf::new_op_return(data))
}

/// Extracts the recipient committed in a deposit transaction.
///
/// Scans for the first `OP_RETURN` output; its single pushed payload must be
/// a length-prefixed address. Returns `None` when no well-formed commitment
/// is present.
pub fn extract_commitment(tx: &Transaction) -> Option<Vec<u8>> {
    for output in &tx.output {
        let script = &output.script_pubkey;
        if !script.is_op_return() {
            continue;
        }

        let mut instructions = script.instructions();
        match instructions.next() {
            Some(Ok(Instruction::Op(op))) if op == OP_RETURN => {}
            _ => continue,
        }
        let Some(Ok(Instruction::PushBytes(data))) = instructions.next() else {
            return None;
        };
        if instructions.next().is_some() {
            return None;
        }

        let (len, rest) = data.as_bytes().split_first()?;
        if *len as usize != rest.len() {
            return None;
        }
        return Some(rest.to_vec());
    }
    None
}
