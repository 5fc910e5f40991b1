//! Witness-script assembly for signatory sets.
//!
//! The script is a weighted multisig: each signatory's `CHECKSIG` result
//! gates adding their voting power to an accumulator, and the final
//! accumulator is compared against the spending threshold. It avoids
//! `OP_CHECKMULTISIG`'s 20-key limit, weights signatures by voting power
//! rather than count, and verifies in a single pass over the witness stack.

use bitcoin::{
    opcodes::all::{
        OP_ADD, OP_CHECKSIG, OP_ELSE, OP_ENDIF, OP_GREATERTHAN, OP_IF, OP_SWAP,
    },
    script::Builder,
    ScriptBuf, Witness,
};

use crate::set::Signatory;

/// Builds the witness script for an ordered, non-empty signatory list.
///
/// Layout, for signatories `s0..sn` with voting powers `vp0..vpn`:
///
/// ```text
/// <pk0> CHECKSIG IF <vp0>        ELSE 0 ENDIF
/// SWAP <pk1> CHECKSIG IF <vp1> ADD ENDIF
/// ...
/// <threshold> GREATERTHAN
/// ```
///
/// The first arm seeds the accumulator with `vp0` or zero; every later arm
/// swaps the accumulator below the next signature, checks it, and adds that
/// signatory's power on success. Integer pushes use the standard encoder's
/// minimal-length form; voting powers are `u32` by construction, which keeps
/// every push in range.
pub(crate) fn witness_script(signatories: &[Signatory], threshold: u64) -> ScriptBuf {
    let mut builder = Builder::new();

    for (pos, signatory) in signatories.iter().enumerate() {
        let vp = signatory.voting_power as i64;
        if pos == 0 {
            builder = builder
                .push_slice(signatory.signatory_key.into_bytes())
                .push_opcode(OP_CHECKSIG)
                .push_opcode(OP_IF)
                .push_int(vp)
                .push_opcode(OP_ELSE)
                .push_int(0)
                .push_opcode(OP_ENDIF);
        } else {
            builder = builder
                .push_opcode(OP_SWAP)
                .push_slice(signatory.signatory_key.into_bytes())
                .push_opcode(OP_CHECKSIG)
                .push_opcode(OP_IF)
                .push_int(vp)
                .push_opcode(OP_ADD)
                .push_opcode(OP_ENDIF);
        }
    }

    builder
        .push_int(threshold as i64)
        .push_opcode(OP_GREATERTHAN)
        .into_script()
}

/// Assembles the witness stack for one input of a finalized disbursal.
///
/// `signatures` holds one slot per signatory in script order; `None` slots
/// serialize as an empty push so the corresponding `CHECKSIG` fails and that
/// arm contributes zero. The stack is emitted highest script position first,
/// so that signatory 0's slot sits on top when execution reaches the first
/// `CHECKSIG`. The reverse ordering is a protocol invariant matched to the
/// script layout above.
pub fn assemble_witness(signatures: &[Option<Vec<u8>>], witness_script: &ScriptBuf) -> Witness {
    let mut witness = Witness::new();
    for slot in signatures.iter().rev() {
        match slot {
            Some(der) => witness.push(der),
            None => witness.push([]),
        }
    }
    witness.push(witness_script.as_bytes());
    witness
}
