use alloy::primitives::U256;

use crate::constants::{INTERMEDIATE_UNIT_SCALE, SLIPPAGE_PERCENT, SMALLEST_UNIT_SCALE};

/// Converts a display amount (ether) into smallest units (wei), truncating.
/// Negative and NaN inputs map to zero.
pub fn to_smallest_unit(display_amount: f64) -> U256 {
    let scaled = display_amount * SMALLEST_UNIT_SCALE;
    if !scaled.is_finite() || scaled <= 0.0 {
        return U256::ZERO;
    }
    U256::from(scaled.trunc() as u128)
}

pub fn to_display_unit(amount: U256) -> f64 {
    as_f64(amount) / SMALLEST_UNIT_SCALE
}

/// Wei to gwei, only used for human readable gas prices.
pub fn to_intermediate_unit(amount: U256) -> f64 {
    as_f64(amount) / INTERMEDIATE_UNIT_SCALE
}

fn as_f64(amount: U256) -> f64 {
    // decimal digits always parse as f64
    amount.to_string().parse::<f64>().unwrap_or(f64::MAX)
}

/// Returns `gas_limit * gas_price + value` and whether `balance` covers it.
pub fn transaction_cost(gas_limit: u64, gas_price: u128, value: U256, balance: U256) -> (U256, bool) {
    let gas_cost = U256::from(gas_limit).saturating_mul(U256::from(gas_price));
    let total_cost = gas_cost.saturating_add(value);
    (total_cost, balance >= total_cost)
}

/// Minimum acceptable output after the fixed slippage tolerance. The deduction
/// is floored, so the minimum rounds up.
pub fn apply_slippage(amount: U256) -> U256 {
    let deduction = amount.saturating_mul(U256::from(SLIPPAGE_PERCENT)) / U256::from(100u64);
    amount - deduction
}

/// Share of `balance` to deposit, floored: `balance * percent / 100`.
pub fn deposit_amount(balance: U256, percent: u64) -> U256 {
    balance.saturating_mul(U256::from(percent)) / U256::from(100u64)
}
