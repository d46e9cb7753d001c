//! 18-decimal fixed point arithmetic used by the weighted pool curve.
//!
//! Every multiplication and division takes an explicit [`Rounding`] so each
//! caller states which side absorbs the truncated dust.

use alloy::primitives::U256;

use crate::error::{Result, RouterError};

/// One unit in 18-decimal fixed point
pub const BONE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Smallest base accepted by [`pow`]
pub const MIN_POW_BASE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Largest base accepted by [`pow`], `2 * BONE - 1`
pub const MAX_POW_BASE: U256 = U256::from_limbs([1_999_999_999_999_999_999, 0, 0, 0]);

/// The series in [`pow_approx`] stops once a term drops below this value
pub const POW_PRECISION: U256 = U256::from_limbs([100_000_000, 0, 0, 0]);

/// Direction in which a truncated quotient is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Towards positive infinity
    Up,
    /// Towards zero
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

/// `a * b / denominator` with a full 256-bit intermediate.
///
/// # Errors
/// * [`RouterError::ArithmeticOverflow`] if `a * b` does not fit in 256 bits
/// * [`RouterError::PoolMathDomainError`] if `denominator` is zero
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    if denominator.is_zero() {
        return Err(RouterError::domain("division by zero"));
    }
    let product = a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)?;
    let quotient = product / denominator;
    if rounding.is_up() && !(product % denominator).is_zero() {
        // quotient < product here, so adding one never wraps
        return Ok(quotient + U256::from(1));
    }
    Ok(quotient)
}

/// Fixed point product `a * b / BONE`.
///
/// # Errors
/// * [`RouterError::ArithmeticOverflow`] on overflow
pub fn mul(a: U256, b: U256, rounding: Rounding) -> Result<U256> {
    mul_div(a, b, BONE, rounding)
}

/// Fixed point quotient `a * BONE / b`.
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] if `b` is zero
/// * [`RouterError::ArithmeticOverflow`] on overflow
pub fn div(a: U256, b: U256, rounding: Rounding) -> Result<U256> {
    mul_div(a, BONE, b, rounding)
}

/// `|a - b|` and whether the difference is negative
fn sub_sign(a: U256, b: U256) -> (U256, bool) {
    if a >= b {
        (a - b, false)
    } else {
        (b - a, true)
    }
}

/// `base ^ n` for a fixed point base and an integer exponent, by squaring.
///
/// # Errors
/// * [`RouterError::ArithmeticOverflow`] when the result leaves 256 bits
pub fn powi(base: U256, n: u64) -> Result<U256> {
    let mut base = base;
    let mut z = if n % 2 == 0 { BONE } else { base };
    let mut n = n / 2;
    while n != 0 {
        base = mul(base, base, Rounding::Down)?;
        if n % 2 != 0 {
            z = mul(z, base, Rounding::Down)?;
        }
        n /= 2;
    }
    Ok(z)
}

/// `base ^ exp` for a fractional exponent via the binomial series
/// `sum_k (exp choose k) * (base - 1)^k`, truncated once a term drops below
/// `precision`.
///
/// Only converges for `base` in `(0, 2)`. Callers go through [`pow`], which
/// checks the range.
///
/// # Errors
/// * [`RouterError::ArithmeticOverflow`] if a partial sum underflows
pub fn pow_approx(base: U256, exp: U256, precision: U256) -> Result<U256> {
    let (x, x_negative) = sub_sign(base, BONE);
    let mut term = BONE;
    let mut sum = term;
    let mut negative = false;

    let mut i = 1u64;
    while term >= precision {
        let big_k = U256::from(i) * BONE;
        let (c, c_negative) = sub_sign(exp, big_k - BONE);
        term = mul(term, mul(c, x, Rounding::Down)?, Rounding::Down)?;
        term = div(term, big_k, Rounding::Down)?;
        if term.is_zero() {
            break;
        }

        if x_negative {
            negative = !negative;
        }
        if c_negative {
            negative = !negative;
        }
        sum = if negative {
            sum.checked_sub(term).ok_or(RouterError::ArithmeticOverflow)?
        } else {
            sum.checked_add(term).ok_or(RouterError::ArithmeticOverflow)?
        };
        i += 1;
    }

    Ok(sum)
}

/// `base ^ exp` with both operands in fixed point.
///
/// The whole part of the exponent is computed exactly with [`powi`], the
/// remainder with [`pow_approx`].
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] if `base` is outside
///   `[MIN_POW_BASE, MAX_POW_BASE]`
/// * [`RouterError::ArithmeticOverflow`] on overflow
pub fn pow(base: U256, exp: U256) -> Result<U256> {
    if base < MIN_POW_BASE {
        return Err(RouterError::domain("power base below range"));
    }
    if base > MAX_POW_BASE {
        return Err(RouterError::domain("power base above range"));
    }

    let whole = u64::try_from(exp / BONE).map_err(|_| RouterError::ArithmeticOverflow)?;
    let remain = exp % BONE;

    let whole_pow = powi(base, whole)?;
    if remain.is_zero() {
        return Ok(whole_pow);
    }

    let partial = pow_approx(base, remain, POW_PRECISION)?;
    mul(whole_pow, partial, Rounding::Down)
}
