//! Constant-product swap math with the 0.3% venue fee.
//!
//! Exact-in rounds down and the venue keeps the dust. Exact-out rounds up with a
//! trailing `+ 1` so the venue never receives less than its fee-adjusted
//! invariant requires.

use alloy::primitives::U256;

use crate::error::{Result, RouterError};
use crate::utils::constants::{SWAP_FEE_DENOMINATOR, SWAP_FEE_NUMERATOR};

/// Output of a swap given an exact input.
///
/// `floor(amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997))`
///
/// # Errors
/// * [`RouterError::InsufficientAmount`] if `amount_in` is zero
/// * [`RouterError::InvalidReserves`] if either reserve is zero
/// * [`RouterError::ArithmeticOverflow`] if an intermediate exceeds 256 bits
pub fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_in.is_zero() {
        return Err(RouterError::InsufficientAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RouterError::InvalidReserves);
    }

    let amount_in_with_fee = checked_mul(amount_in, U256::from(SWAP_FEE_NUMERATOR))?;
    let numerator = checked_mul(amount_in_with_fee, reserve_out)?;
    let denominator = checked_mul(reserve_in, U256::from(SWAP_FEE_DENOMINATOR))?
        .checked_add(amount_in_with_fee)
        .ok_or(RouterError::ArithmeticOverflow)?;

    Ok(numerator / denominator)
}

/// Input required for an exact output.
///
/// `floor(reserve_in * amount_out * 1000 / ((reserve_out - amount_out) * 997)) + 1`
///
/// # Errors
/// * [`RouterError::InsufficientAmount`] if `amount_out` is zero
/// * [`RouterError::InvalidReserves`] if either reserve is zero
/// * [`RouterError::InsufficientLiquidity`] if `amount_out >= reserve_out`
/// * [`RouterError::ArithmeticOverflow`] if an intermediate exceeds 256 bits
pub fn amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_out.is_zero() {
        return Err(RouterError::InsufficientAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RouterError::InvalidReserves);
    }
    if amount_out >= reserve_out {
        return Err(RouterError::InsufficientLiquidity);
    }

    let numerator = checked_mul(
        checked_mul(reserve_in, amount_out)?,
        U256::from(SWAP_FEE_DENOMINATOR),
    )?;
    let denominator = checked_mul(reserve_out - amount_out, U256::from(SWAP_FEE_NUMERATOR))?;

    Ok(numerator / denominator + U256::from(1))
}

/// `a * b` or [`RouterError::ArithmeticOverflow`]
fn checked_mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)
}
