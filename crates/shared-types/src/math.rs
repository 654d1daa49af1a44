//! # Wide-Integer Math
//!
//! Share-rate and discount-factor computations multiply two `u128` values
//! before dividing; the intermediate product needs 256 bits.

use crate::entities::U256;

/// Fixed-point scale shared by the share rate and the withdrawal discount
/// factor: 1e27 represents 1.0.
pub const E27: u128 = 10u128.pow(27);

/// Computes `a * b / denom` with a 256-bit intermediate.
///
/// Returns `None` when `denom == 0` or when the quotient does not fit in
/// `u128`. Division truncates toward zero, matching integer share math
/// everywhere else in the system.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Option<u128> {
    if denom == 0 {
        return None;
    }
    let product = U256::from(a) * U256::from(b);
    let quotient = product / U256::from(denom);
    if quotient > U256::from(u128::MAX) {
        return None;
    }
    Some(quotient.as_u128())
}
