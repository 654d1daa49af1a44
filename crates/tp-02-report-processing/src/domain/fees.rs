//! Protocol fee computation
//!
//! The fee is taken from reported profit only (losses are never charged)
//! and split between node operators and the treasury at a fixed ratio.

use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use shared_types::{mul_div, Address};

/// Basis-point denominator: 10_000 bps == 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Fixed fee parameters of the pool.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Protocol fee on profit, in basis points.
    pub fee_basis_points: u16,
    /// Node-operator portion of the fee, in basis points of the fee.
    pub operator_split_bps: u16,
    /// Treasury fee recipient.
    pub treasury: Address,
    /// Account whose shares are retired on burn requests.
    pub burner: Address,
}

/// A computed fee split for one report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSplit {
    pub total_fee: u128,
    pub operator_fee: u128,
    pub treasury_fee: u128,
}

impl FeePolicy {
    /// Computes the fee split for a profit amount.
    ///
    /// `operator + treasury == total` always; division dust lands on the
    /// treasury side.
    pub fn split(&self, profit: u128) -> ReportResult<FeeSplit> {
        let total_fee = mul_div(profit, self.fee_basis_points as u128, BPS_DENOMINATOR)
            .ok_or(ReportError::ArithmeticOverflow)?;
        let operator_fee = mul_div(total_fee, self.operator_split_bps as u128, BPS_DENOMINATOR)
            .ok_or(ReportError::ArithmeticOverflow)?;
        Ok(FeeSplit {
            total_fee,
            operator_fee,
            treasury_fee: total_fee - operator_fee,
        })
    }
}
