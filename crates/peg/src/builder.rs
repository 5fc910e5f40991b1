//! Disbursal construction and fee apportionment.

use bitcoin::consensus;
use moorage_primitives::{BitcoinAmount, BitcoinScript};

use crate::{
    errors::DisbursalError,
    params::FeePolicy,
    state::signing::{unsigned_disbursal_tx, TxOutput},
    state::utxo::Utxo,
};

/// The built shape of a disbursal: fee-adjusted user outputs, the change
/// output, and the fee actually deducted.
#[derive(Debug)]
pub(crate) struct BuiltDisbursal {
    pub outputs: Vec<TxOutput>,
    pub change: TxOutput,
    pub fee_paid: BitcoinAmount,
}

/// Builds a disbursal deterministically.
///
/// Inputs and requested outputs keep their given order. The change output
/// (paying `change_script`) is appended last and receives whatever the
/// inputs don't cover, which must come out strictly positive before fees.
/// The fee is charged on the unsigned transaction's serialized length,
/// floored at the relay minimum, and split across the user outputs only,
/// rounding up; the peg's change is never tapped for fees.
pub(crate) fn build_disbursal(
    inputs: &[Utxo],
    requested: &[TxOutput],
    change_script: &BitcoinScript,
    fee_policy: &FeePolicy,
) -> Result<BuiltDisbursal, DisbursalError> {
    let total_in = inputs
        .iter()
        .try_fold(0u64, |acc, u| acc.checked_add(u.value().to_sat()))
        .ok_or(DisbursalError::AmountOverflow)?;

    let mut spent = 0u64;
    for output in requested {
        spent = spent
            .checked_add(output.value().to_sat())
            .ok_or(DisbursalError::AmountOverflow)?;
        if spent >= total_in {
            return Err(DisbursalError::InsufficientFunds {
                inputs: total_in,
                outputs: spent,
            });
        }
    }
    if requested.is_empty() {
        return Err(DisbursalError::InsufficientFunds {
            inputs: total_in,
            outputs: 0,
        });
    }

    let change = TxOutput::new(
        change_script.clone(),
        BitcoinAmount::from_sat(total_in - spent),
    );

    // Fee is a function of the unsigned length only; output values are
    // fixed-width, so adjusting them below doesn't change the size.
    let unsigned = unsigned_disbursal_tx(inputs, requested, &change);
    let tx_len = consensus::serialize(&unsigned).len();
    let fee = fee_policy.fee_for(tx_len);

    let fee_share = fee.div_ceil(requested.len() as u64);
    let outputs = requested
        .iter()
        .map(|output| {
            let value = output.value().to_sat();
            if value <= fee_share {
                return Err(DisbursalError::OutputBelowFee {
                    output: value,
                    fee_share,
                });
            }
            Ok(TxOutput::new(
                output.script().clone(),
                BitcoinAmount::from_sat(value - fee_share),
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fee_paid = BitcoinAmount::from_sat(fee_share * requested.len() as u64);

    Ok(BuiltDisbursal {
        outputs,
        change,
        fee_paid,
    })
}
