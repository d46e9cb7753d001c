//! Joins and exits touching every asset of the pool at once.
//!
//! A join funds every pool asset from one funding asset. Each pool asset is
//! reached through its own intermediary route, priced exact-out against one
//! shared snapshot in pool order, so routes sharing a pair see each other's
//! price impact. An exit redeems shares for every pool asset and routes each
//! payout into one target asset.

use alloy::primitives::{Address, U256};
use log::info;
use serde::Serialize;

use super::{at_least, at_most, settle, Call, Router};
use crate::error::{Result, RouterError};
use crate::ledger::{Ledger, ReserveSource};
use crate::math::weighted;
use crate::route::codec::decode_intermediaries;
use crate::route::dispatch::ReserveSnapshot;
use crate::route::hop::Intermediary;
use crate::route::quote::RouteQuote;
use crate::settle::plan::{Plan, PlanBuilder, RefundAsset};
use crate::types::PoolState;

/// Outcome of an all-asset join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllAssetMint {
    /// Funding actually consumed
    pub amount_in: U256,
    /// Unconsumed funding returned to the sender
    pub refund: U256,
}

/// How an all-asset join is funded
#[derive(Debug, Clone, Copy)]
enum Funding {
    /// `max` of `asset` pulled from the sender
    Tokens {
        /// Funding asset
        asset: Address,
        /// Amount pulled up front
        max: U256,
    },
    /// Attached native value
    Native(U256),
}

/// One pool asset of an all-asset operation and how it is reached
struct Leg {
    /// Pool asset
    asset: Address,
    /// Amount deposited or redeemed
    amount: U256,
    /// Swap route, absent when the pool asset is the outer asset itself
    route: Option<RouteQuote>,
}

/// Decodes the intermediaries, one per pool asset
fn intermediaries(state: &PoolState, bytes: &[u8]) -> Result<Vec<Intermediary>> {
    let intermediaries = decode_intermediaries(bytes)?;
    if intermediaries.len() != state.assets.len() {
        return Err(RouterError::malformed(
            "one intermediary per pool asset required",
        ));
    }
    Ok(intermediaries)
}

impl Router {
    /// Join for exact shares funded through one asset
    fn plan_mint_all<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        funding: Funding,
        shares: U256,
        pool: Address,
        intermediaries_bytes: &[u8],
    ) -> Result<Plan<AllAssetMint>> {
        Self::check_deadline(source, call.deadline)?;
        let (funding_asset, max) = match funding {
            Funding::Tokens { asset, max } => (asset, max),
            Funding::Native(value) => (self.wrapped_native, value),
        };
        let state = source.pool_state(pool)?;
        let intermediaries = intermediaries(&state, intermediaries_bytes)?;
        let deposits = weighted::all_assets_in_given_pool_shares_out(&state, shares)?;

        let dispatcher = self.dispatcher();
        let mut snapshot = ReserveSnapshot::new(source);
        let mut legs = Vec::with_capacity(deposits.len());
        let mut total = U256::ZERO;
        for ((asset, amount), intermediary) in deposits.into_iter().zip(&intermediaries) {
            let hops = intermediary.path_for_mint(funding_asset, asset);
            let route = if hops.is_empty() {
                None
            } else {
                Some(dispatcher.quote_exact_out(&hops, amount, &mut snapshot)?)
            };
            let cost = route.as_ref().map_or(amount, RouteQuote::amount_in);
            total = total
                .checked_add(cost)
                .ok_or(RouterError::ArithmeticOverflow)?;
            legs.push(Leg {
                asset,
                amount,
                route,
            });
        }
        at_most(max, total)?;
        let refund = max - total;

        let mut plan = PlanBuilder::new();
        match funding {
            Funding::Tokens { asset, max } => {
                plan.transfer(asset, call.sender, self.address, max);
            }
            Funding::Native(value) => {
                plan.receive_native(call.sender, self.address, value);
                plan.wrap(self.address, value);
            }
        }
        for leg in &legs {
            if let Some(route) = &leg.route {
                route.settle(&mut plan, self.address, self.address);
            }
            plan.transfer(leg.asset, self.address, pool, leg.amount);
        }
        plan.mint(pool, shares, self.address);
        plan.transfer(pool, self.address, call.recipient, shares);
        match funding {
            Funding::Tokens { asset, .. } => {
                plan.refund(RefundAsset::Token(asset), self.address, call.sender, refund);
            }
            Funding::Native(_) => {
                if !refund.is_zero() {
                    plan.unwrap(self.address, refund);
                }
                plan.refund(RefundAsset::Native, self.address, call.sender, refund);
            }
        }

        Ok(plan.finish(AllAssetMint {
            amount_in: total,
            refund,
        }))
    }

    /// Exit of exact shares into one asset, paid natively when `native`
    fn plan_burn_all<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        native: bool,
        shares: U256,
        min_amounts_out: &[U256],
        target: Address,
        amount_out_min: U256,
        pool: Address,
        intermediaries_bytes: &[u8],
    ) -> Result<Plan<U256>> {
        Self::check_deadline(source, call.deadline)?;
        let state = source.pool_state(pool)?;
        let intermediaries = intermediaries(&state, intermediaries_bytes)?;
        if min_amounts_out.len() != state.assets.len() {
            return Err(RouterError::malformed(
                "one minimum per pool asset required",
            ));
        }
        let payouts = weighted::all_assets_out_given_pool_shares_in(&state, shares)?;
        for ((_, amount), min) in payouts.iter().zip(min_amounts_out) {
            at_least(*min, *amount)?;
        }

        let dispatcher = self.dispatcher();
        let mut snapshot = ReserveSnapshot::new(source);
        let mut legs = Vec::with_capacity(payouts.len());
        let mut total = U256::ZERO;
        for ((asset, amount), intermediary) in payouts.iter().zip(&intermediaries) {
            let hops = intermediary.path_for_burn(*asset, target);
            let route = if hops.is_empty() {
                None
            } else {
                Some(dispatcher.quote_exact_in(&hops, *amount, &mut snapshot)?)
            };
            let proceeds = route.as_ref().map_or(*amount, RouteQuote::amount_out);
            total = total
                .checked_add(proceeds)
                .ok_or(RouterError::ArithmeticOverflow)?;
            legs.push(Leg {
                asset: *asset,
                amount: *amount,
                route,
            });
        }
        at_least(amount_out_min, total)?;

        let receiver = if native { self.address } else { call.recipient };
        let mut plan = PlanBuilder::new();
        plan.transfer(pool, call.sender, self.address, shares);
        plan.burn(pool, self.address, shares, payouts, self.address);
        for leg in &legs {
            match &leg.route {
                Some(route) => route.settle(&mut plan, self.address, receiver),
                None if receiver != self.address => {
                    plan.transfer(leg.asset, self.address, receiver, leg.amount);
                }
                None => {}
            }
        }
        if native {
            plan.unwrap(self.address, total);
            plan.send_native(self.address, call.recipient, total);
        }
        Ok(plan.finish(total))
    }

    /// Plans minting exactly `shares` by routing `funding_asset` into every
    /// pool asset. At most `amount_in_max` is pulled up front and the unused
    /// part is refunded.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] unless there is one intermediary per pool asset
    /// * [`RouterError::SlippageExceeded`] if the routes cost more than `amount_in_max`
    /// * Deadline, pool math and swap math errors
    pub fn plan_swap_tokens_for_all_tokens_and_mint_exact<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        funding_asset: Address,
        amount_in_max: U256,
        shares: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<Plan<AllAssetMint>> {
        self.plan_mint_all(
            source,
            call,
            Funding::Tokens {
                asset: funding_asset,
                max: amount_in_max,
            },
            shares,
            pool,
            intermediaries,
        )
    }

    /// Mints exactly `shares` from one funding asset routed into every pool asset.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_tokens_for_all_tokens_and_mint_exact`], plus
    ///   settlement errors and [`RouterError::RefundTransferFailed`]
    pub fn swap_tokens_for_all_tokens_and_mint_exact<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        funding_asset: Address,
        amount_in_max: U256,
        shares: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<AllAssetMint> {
        let plan = self.plan_swap_tokens_for_all_tokens_and_mint_exact(
            &*ledger,
            call,
            funding_asset,
            amount_in_max,
            shares,
            pool,
            intermediaries,
        )?;
        let outcome = settle(ledger, plan)?;
        info!(
            "minted {shares} shares of {pool} from all assets for {} of {funding_asset}",
            outcome.amount_in
        );
        Ok(outcome)
    }

    /// Plans minting exactly `shares` from attached native value. All value is
    /// wrapped up front; the unused part is unwrapped and refunded.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_tokens_for_all_tokens_and_mint_exact`]
    pub fn plan_swap_eth_for_all_tokens_and_mint_exact<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        value: U256,
        shares: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<Plan<AllAssetMint>> {
        if value.is_zero() {
            return Err(RouterError::InsufficientAmount);
        }
        self.plan_mint_all(
            source,
            call,
            Funding::Native(value),
            shares,
            pool,
            intermediaries,
        )
    }

    /// Mints exactly `shares` from attached native value routed into every
    /// pool asset, refunding the rest.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_eth_for_all_tokens_and_mint_exact`], plus
    ///   settlement errors and [`RouterError::RefundTransferFailed`]
    pub fn swap_eth_for_all_tokens_and_mint_exact<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        value: U256,
        shares: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<AllAssetMint> {
        let plan = self.plan_swap_eth_for_all_tokens_and_mint_exact(
            &*ledger,
            call,
            value,
            shares,
            pool,
            intermediaries,
        )?;
        let outcome = settle(ledger, plan)?;
        info!(
            "minted {shares} shares of {pool} from all assets for {} native, refunded {}",
            outcome.amount_in, outcome.refund
        );
        Ok(outcome)
    }

    /// Plans redeeming `shares` for every pool asset and routing each payout
    /// into `target`.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] unless there is one intermediary and
    ///   one minimum per pool asset
    /// * [`RouterError::SlippageExceeded`] if a payout is below its minimum or
    ///   the total is below `amount_out_min`
    /// * Deadline, pool math and swap math errors
    pub fn plan_burn_for_all_tokens_and_swap_for_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        shares: U256,
        min_amounts_out: &[U256],
        target: Address,
        amount_out_min: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_burn_all(
            source,
            call,
            false,
            shares,
            min_amounts_out,
            target,
            amount_out_min,
            pool,
            intermediaries,
        )
    }

    /// Redeems `shares` for every pool asset and swaps them all into `target`.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_for_all_tokens_and_swap_for_tokens`], plus
    ///   settlement errors
    pub fn burn_for_all_tokens_and_swap_for_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        shares: U256,
        min_amounts_out: &[U256],
        target: Address,
        amount_out_min: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_burn_for_all_tokens_and_swap_for_tokens(
            &*ledger,
            call,
            shares,
            min_amounts_out,
            target,
            amount_out_min,
            pool,
            intermediaries,
        )?;
        let amount_out = settle(ledger, plan)?;
        info!("burned {shares} shares of {pool} for {amount_out} of {target}");
        Ok(amount_out)
    }

    /// Plans redeeming `shares` for every pool asset and routing each payout
    /// into native value.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_for_all_tokens_and_swap_for_tokens`]
    pub fn plan_burn_for_all_tokens_and_swap_for_eth<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        shares: U256,
        min_amounts_out: &[U256],
        amount_out_min: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_burn_all(
            source,
            call,
            true,
            shares,
            min_amounts_out,
            self.wrapped_native,
            amount_out_min,
            pool,
            intermediaries,
        )
    }

    /// Redeems `shares` for every pool asset and pays the recipient native value.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_for_all_tokens_and_swap_for_eth`], plus
    ///   settlement errors
    pub fn burn_for_all_tokens_and_swap_for_eth<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        shares: U256,
        min_amounts_out: &[U256],
        amount_out_min: U256,
        pool: Address,
        intermediaries: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_burn_for_all_tokens_and_swap_for_eth(
            &*ledger,
            call,
            shares,
            min_amounts_out,
            amount_out_min,
            pool,
            intermediaries,
        )?;
        let amount_out = settle(ledger, plan)?;
        info!("burned {shares} shares of {pool} for {amount_out} native");
        Ok(amount_out)
    }
}
