//! Weighted pool bonding curve.
//!
//! Single-asset joins and exits price the trading part of the amount with the
//! swap fee scaled by `1 - w`, where `w` is the normalized weight of the asset.
//! Exits additionally charge the exit fee on the redeemed shares. All-asset
//! joins and exits are proportional and fee-free.
//!
//! Amounts paid to the caller round down, amounts charged to the caller round
//! up. Nothing here mutates the pool; callers apply the returned deltas.

use alloy::primitives::{Address, U256};

use crate::error::{Result, RouterError};
use crate::math::fixed::{div, mul, mul_div, pow, Rounding, BONE};
use crate::types::{PoolAsset, PoolState};

/// Single-asset joins may add at most half of the asset's balance
pub const MAX_IN_RATIO: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// Single-asset exits may remove at most a third of the asset's balance
pub const MAX_OUT_RATIO: U256 = U256::from_limbs([333_333_333_333_333_334, 0, 0, 0]);

/// Validated view of one asset of a pool
struct Binding<'a> {
    /// The pool
    pool: &'a PoolState,
    /// The asset record
    record: &'a PoolAsset,
    /// `weight / total_weight`
    normalized_weight: U256,
}

impl<'a> Binding<'a> {
    /// Validates the pool and binds `asset`
    fn new(pool: &'a PoolState, asset: Address) -> Result<Self> {
        check_pool(pool)?;
        let record = pool.record(asset)?;
        let normalized_weight = div(record.weight, pool.total_weight(), Rounding::Down)?;
        Ok(Self {
            pool,
            record,
            normalized_weight,
        })
    }

    /// `1 - (1 - w) * swap_fee`, the share of a traded amount the pool keeps working
    fn after_swap_fee(&self) -> Result<U256> {
        let fee = mul(
            BONE - self.normalized_weight,
            self.pool.swap_fee,
            Rounding::Up,
        )?;
        Ok(BONE - fee)
    }

    /// `1 / w` as a fixed point exponent
    fn inverse_weight(&self, rounding: Rounding) -> Result<U256> {
        div(BONE, self.normalized_weight, rounding)
    }
}

/// Rejects pools the curve is undefined for
fn check_pool(pool: &PoolState) -> Result<()> {
    if pool.total_shares.is_zero() {
        return Err(RouterError::domain("pool has no shares outstanding"));
    }
    if pool.assets.is_empty() {
        return Err(RouterError::domain("pool has no assets"));
    }
    if pool.assets.iter().any(|record| record.weight.is_zero()) {
        return Err(RouterError::domain("zero weight"));
    }
    if pool.assets.iter().any(|record| record.balance.is_zero()) {
        return Err(RouterError::domain("zero balance"));
    }
    if pool.swap_fee >= BONE || pool.exit_fee >= BONE {
        return Err(RouterError::domain("fee must be below one"));
    }
    Ok(())
}

/// Pool shares issued for depositing `amount_in` of a single asset.
///
/// `supply * ((balance + amount_in * (1 - (1 - w) * fee)) / balance) ^ w - supply`,
/// rounded down.
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] on an invalid pool, an unbound asset,
///   or when `amount_in` exceeds [`MAX_IN_RATIO`] of the balance
pub fn pool_shares_out_given_single_asset_in(
    pool: &PoolState,
    asset: Address,
    amount_in: U256,
) -> Result<U256> {
    let binding = Binding::new(pool, asset)?;
    let balance = binding.record.balance;
    if amount_in > mul(balance, MAX_IN_RATIO, Rounding::Down)? {
        return Err(RouterError::domain("deposit exceeds max in ratio"));
    }

    let in_after_fee = mul(amount_in, binding.after_swap_fee()?, Rounding::Down)?;
    let new_balance = balance
        .checked_add(in_after_fee)
        .ok_or(RouterError::ArithmeticOverflow)?;
    let asset_ratio = div(new_balance, balance, Rounding::Down)?;
    let pool_ratio = pow(asset_ratio, binding.normalized_weight)?;
    let new_supply = mul(pool_ratio, pool.total_shares, Rounding::Down)?;

    Ok(new_supply.saturating_sub(pool.total_shares))
}

/// Amount of a single asset that must be deposited to receive `shares_out`.
///
/// Inverse of [`pool_shares_out_given_single_asset_in`], rounded up.
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] on an invalid pool, an unbound asset,
///   or when the deposit would exceed [`MAX_IN_RATIO`] of the balance
pub fn single_asset_in_given_pool_shares_out(
    pool: &PoolState,
    asset: Address,
    shares_out: U256,
) -> Result<U256> {
    let binding = Binding::new(pool, asset)?;
    let balance = binding.record.balance;
    let supply = pool.total_shares;

    let new_supply = supply
        .checked_add(shares_out)
        .ok_or(RouterError::ArithmeticOverflow)?;
    let pool_ratio = div(new_supply, supply, Rounding::Up)?;
    let asset_ratio = pow(pool_ratio, binding.inverse_weight(Rounding::Up)?)?;
    let new_balance = mul(asset_ratio, balance, Rounding::Up)?;
    let in_after_fee = new_balance.saturating_sub(balance);
    let amount_in = div(in_after_fee, binding.after_swap_fee()?, Rounding::Up)?;

    if amount_in > mul(balance, MAX_IN_RATIO, Rounding::Down)? {
        return Err(RouterError::domain("deposit exceeds max in ratio"));
    }
    Ok(amount_in)
}

/// Amount of a single asset paid out for redeeming `shares_in`.
///
/// The exit fee is taken from the shares, the swap fee from the trading part
/// of the payout. Rounded down.
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] on an invalid pool, an unbound asset,
///   when the shares are not below the supply, or when the payout would exceed
///   [`MAX_OUT_RATIO`] of the balance
pub fn single_asset_out_given_pool_shares_in(
    pool: &PoolState,
    asset: Address,
    shares_in: U256,
) -> Result<U256> {
    let binding = Binding::new(pool, asset)?;
    let balance = binding.record.balance;
    let supply = pool.total_shares;

    let shares_after_exit_fee = mul(shares_in, BONE - pool.exit_fee, Rounding::Down)?;
    let new_supply = supply
        .checked_sub(shares_after_exit_fee)
        .ok_or(RouterError::domain("shares exceed supply"))?;
    let pool_ratio = div(new_supply, supply, Rounding::Up)?;
    let asset_ratio = pow(pool_ratio, binding.inverse_weight(Rounding::Down)?)?;
    let new_balance = mul(asset_ratio, balance, Rounding::Up)?;
    let out_before_fee = balance.saturating_sub(new_balance);
    let amount_out = mul(out_before_fee, binding.after_swap_fee()?, Rounding::Down)?;

    if amount_out > mul(balance, MAX_OUT_RATIO, Rounding::Down)? {
        return Err(RouterError::domain("withdrawal exceeds max out ratio"));
    }
    Ok(amount_out)
}

/// Pool shares that must be redeemed to receive `amount_out` of a single asset.
///
/// Inverse of [`single_asset_out_given_pool_shares_in`], rounded up.
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] on an invalid pool, an unbound asset,
///   or when `amount_out` exceeds [`MAX_OUT_RATIO`] of the balance
pub fn pool_shares_in_given_single_asset_out(
    pool: &PoolState,
    asset: Address,
    amount_out: U256,
) -> Result<U256> {
    let binding = Binding::new(pool, asset)?;
    let balance = binding.record.balance;
    let supply = pool.total_shares;
    if amount_out > mul(balance, MAX_OUT_RATIO, Rounding::Down)? {
        return Err(RouterError::domain("withdrawal exceeds max out ratio"));
    }

    let out_before_fee = div(amount_out, binding.after_swap_fee()?, Rounding::Up)?;
    let new_balance = balance
        .checked_sub(out_before_fee)
        .ok_or(RouterError::domain("withdrawal exceeds balance"))?;
    let asset_ratio = div(new_balance, balance, Rounding::Down)?;
    let pool_ratio = pow(asset_ratio, binding.normalized_weight)?;
    let new_supply = mul(pool_ratio, supply, Rounding::Down)?;
    let shares_after_exit_fee = supply.saturating_sub(new_supply);

    div(shares_after_exit_fee, BONE - pool.exit_fee, Rounding::Up)
}

/// Per-asset deposits, in pool order, for minting exactly `shares_out`.
///
/// `ceil(balance_i * shares_out / supply)`
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] on an invalid pool
pub fn all_assets_in_given_pool_shares_out(
    pool: &PoolState,
    shares_out: U256,
) -> Result<Vec<(Address, U256)>> {
    check_pool(pool)?;
    pool.assets
        .iter()
        .map(|record| {
            mul_div(record.balance, shares_out, pool.total_shares, Rounding::Up)
                .map(|amount| (record.asset, amount))
        })
        .collect()
}

/// Per-asset payouts, in pool order, for redeeming `shares_in`.
///
/// `floor(balance_i * shares_in / supply)`
///
/// # Errors
/// * [`RouterError::PoolMathDomainError`] on an invalid pool or when
///   `shares_in` exceeds the supply
pub fn all_assets_out_given_pool_shares_in(
    pool: &PoolState,
    shares_in: U256,
) -> Result<Vec<(Address, U256)>> {
    check_pool(pool)?;
    if shares_in > pool.total_shares {
        return Err(RouterError::domain("shares exceed supply"));
    }
    pool.assets
        .iter()
        .map(|record| {
            mul_div(record.balance, shares_in, pool.total_shares, Rounding::Down)
                .map(|amount| (record.asset, amount))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_helpers::{address_from_str, ether, pool_state};
    use proptest::prelude::*;

    fn assert_close(actual: U256, expected: U256, tolerance: u128) {
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        assert!(
            diff <= U256::from(tolerance),
            "{actual} differs from {expected} by {diff}"
        );
    }

    #[test]
    fn test_single_asset_in_given_shares_out() {
        let pool = pool_state();
        let token0 = address_from_str("A");

        for (shares_out, expected) in &[
            // shares, deposit
            (1u128, 20_354_430_379_746_835_444u128),
            (10, 212_658_227_848_101_265_823),
        ] {
            assert_eq!(
                single_asset_in_given_pool_shares_out(&pool, token0, ether(*shares_out))
                    .unwrap(),
                U256::from(*expected)
            );
        }
    }

    #[test]
    fn test_shares_out_inverts_single_asset_in() {
        let pool = pool_state();
        let token0 = address_from_str("A");

        // 212.65 after the 1.25% effective fee is exactly 210, and sqrt(1.21) = 1.1
        let shares = pool_shares_out_given_single_asset_in(
            &pool,
            token0,
            U256::from(212_658_227_848_101_265_823u128),
        )
        .unwrap();
        assert_close(shares, ether(10), 100_000_000_000);
    }

    #[test]
    fn test_single_asset_out_given_shares_in() {
        let pool = pool_state();
        let token1 = address_from_str("B");

        for (shares_in, expected) in &[
            // shares, payout
            (1u128, 19_553_485_031_250_000_000u128),
            (10, 186_736_003_125_000_000_000),
        ] {
            assert_eq!(
                single_asset_out_given_pool_shares_in(&pool, token1, ether(*shares_in)).unwrap(),
                U256::from(*expected)
            );
        }
    }

    #[test]
    fn test_shares_in_inverts_single_asset_out() {
        let pool = pool_state();
        let token1 = address_from_str("B");

        let shares = pool_shares_in_given_single_asset_out(
            &pool,
            token1,
            U256::from(19_553_485_031_250_000_000u128),
        )
        .unwrap();
        assert_close(shares, ether(1), 100_000_000_000);
    }

    #[test]
    fn test_all_assets_rounding() {
        let pool = pool_state();
        let amounts = all_assets_in_given_pool_shares_out(&pool, ether(1)).unwrap();
        assert_eq!(
            amounts,
            vec![
                (address_from_str("A"), ether(10)),
                (address_from_str("B"), ether(10))
            ]
        );
        let amounts = all_assets_out_given_pool_shares_in(&pool, ether(1)).unwrap();
        assert_eq!(amounts[0].1, ether(10));

        // 10 units against 3 shares: deposits round up, payouts round down
        let mut small = pool_state();
        small.total_shares = U256::from(3);
        for record in &mut small.assets {
            record.balance = U256::from(10);
        }
        let deposits = all_assets_in_given_pool_shares_out(&small, U256::from(1)).unwrap();
        let payouts = all_assets_out_given_pool_shares_in(&small, U256::from(1)).unwrap();
        assert_eq!(deposits[0].1, U256::from(4));
        assert_eq!(payouts[0].1, U256::from(3));
    }

    #[test]
    fn test_domain_errors() {
        let token0 = address_from_str("A");

        let mut pool = pool_state();
        pool.assets[1].weight = U256::ZERO;
        assert_eq!(
            pool_shares_out_given_single_asset_in(&pool, token0, ether(1)),
            Err(RouterError::domain("zero weight"))
        );

        let mut pool = pool_state();
        pool.assets[0].balance = U256::ZERO;
        assert_eq!(
            all_assets_in_given_pool_shares_out(&pool, ether(1)),
            Err(RouterError::domain("zero balance"))
        );

        let mut pool = pool_state();
        pool.total_shares = U256::ZERO;
        assert_eq!(
            all_assets_out_given_pool_shares_in(&pool, ether(1)),
            Err(RouterError::domain("pool has no shares outstanding"))
        );

        let pool = pool_state();
        assert_eq!(
            single_asset_in_given_pool_shares_out(&pool, address_from_str("C"), ether(1)),
            Err(RouterError::domain("asset is not bound to the pool"))
        );
        assert_eq!(
            pool_shares_out_given_single_asset_in(&pool, token0, ether(600)),
            Err(RouterError::domain("deposit exceeds max in ratio"))
        );
        assert_eq!(
            pool_shares_in_given_single_asset_out(&pool, token0, ether(400)),
            Err(RouterError::domain("withdrawal exceeds max out ratio"))
        );
        assert_eq!(
            single_asset_out_given_pool_shares_in(&pool, token0, ether(200)),
            Err(RouterError::domain("shares exceed supply"))
        );
        assert_eq!(
            all_assets_out_given_pool_shares_in(&pool, ether(101)),
            Err(RouterError::domain("shares exceed supply"))
        );
    }

    proptest! {
        #[test]
        fn proportional_join_keeps_share_value(
            shares in 1u128..100_000_000_000_000_000_000,
            balance0 in 1u128..1_000_000_000_000_000_000_000_000,
            balance1 in 1u128..1_000_000_000_000_000_000_000_000,
        ) {
            let mut pool = pool_state();
            pool.assets[0].balance = U256::from(balance0);
            pool.assets[1].balance = U256::from(balance1);
            let supply = pool.total_shares;
            let new_supply = supply + U256::from(shares);

            let deposits = all_assets_in_given_pool_shares_out(&pool, U256::from(shares)).unwrap();
            for (record, (asset, amount)) in pool.assets.iter().zip(deposits) {
                prop_assert_eq!(record.asset, asset);
                let new_balance = record.balance + amount;
                // new_balance / new_supply >= balance / supply
                prop_assert!(new_balance * supply >= record.balance * new_supply);
            }
        }

        #[test]
        fn proportional_exit_never_overpays(
            shares in 1u128..100_000_000_000_000_000_000,
        ) {
            let pool = pool_state();
            let supply = pool.total_shares;
            let payouts = all_assets_out_given_pool_shares_in(&pool, U256::from(shares)).unwrap();
            for (record, (_, amount)) in pool.assets.iter().zip(payouts) {
                prop_assert!(amount * supply <= record.balance * U256::from(shares));
            }
        }
    }
}
