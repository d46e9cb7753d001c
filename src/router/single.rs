//! Joins and exits of a weighted pool through a single pool asset, reached
//! by a swap path.
//!
//! Joins end their path at a pool asset: the route settles into the router,
//! which deposits into the pool and forwards the issued shares. Exits start
//! their path at a pool asset: the router takes the sender's shares, redeems
//! them for the asset and routes the payout on.

use alloy::primitives::{Address, U256};
use log::info;

use super::{at_least, at_most, settle, Call, Router};
use crate::error::{Result, RouterError};
use crate::ledger::{Ledger, ReserveSource};
use crate::math::weighted;
use crate::route::codec::Path;
use crate::route::dispatch::ReserveSnapshot;
use crate::route::quote::RouteQuote;
use crate::settle::plan::{Plan, PlanBuilder, RefundAsset};

/// Where the funding of a join comes from
#[derive(Debug, Clone, Copy)]
enum Funding {
    /// The sender's balance of the path's first asset
    Tokens,
    /// Native value attached to the call
    Native(U256),
}

/// Where the output of an exit goes
#[derive(Debug, Clone, Copy)]
enum Payout {
    /// The path's last asset to the recipient
    Tokens,
    /// Native value to the recipient
    Native,
}

impl Router {
    /// Opens a join plan: funds the router when paying natively and settles
    /// the route into the router
    fn fund_join(&self, plan: &mut PlanBuilder, call: &Call, funding: Funding, route: &RouteQuote) {
        match funding {
            Funding::Tokens => route.settle(plan, call.sender, self.address),
            Funding::Native(value) => {
                plan.receive_native(call.sender, self.address, value);
                plan.wrap(self.address, route.amount_in());
                route.settle(plan, self.address, self.address);
            }
        }
    }

    /// Closes a join plan: returns attached value the route did not consume
    fn refund_unspent(&self, plan: &mut PlanBuilder, call: &Call, funding: Funding, route: &RouteQuote) {
        if let Funding::Native(value) = funding {
            plan.refund(
                RefundAsset::Native,
                self.address,
                call.sender,
                value.saturating_sub(route.amount_in()),
            );
        }
    }

    /// Deposits the routed asset and forwards the issued shares
    fn deposit(
        &self,
        plan: &mut PlanBuilder,
        call: &Call,
        pool: Address,
        asset: Address,
        amount: U256,
        shares: U256,
    ) {
        plan.transfer(asset, self.address, pool, amount);
        plan.mint(pool, shares, self.address);
        plan.transfer(pool, self.address, call.recipient, shares);
    }

    /// Takes the sender's shares and redeems them for `amount` of `asset`
    fn redeem(
        &self,
        plan: &mut PlanBuilder,
        call: &Call,
        pool: Address,
        shares: U256,
        asset: Address,
        amount: U256,
    ) {
        plan.transfer(pool, call.sender, self.address, shares);
        plan.burn(pool, self.address, shares, vec![(asset, amount)], self.address);
    }

    /// Routes the redeemed asset on to the recipient
    fn pay_out(&self, plan: &mut PlanBuilder, call: &Call, payout: Payout, route: &RouteQuote) {
        match payout {
            Payout::Tokens => route.settle(plan, self.address, call.recipient),
            Payout::Native => {
                route.settle(plan, self.address, self.address);
                plan.unwrap(self.address, route.amount_out());
                plan.send_native(self.address, call.recipient, route.amount_out());
            }
        }
    }

    /// Join for an exact route input
    fn plan_mint_exact_in<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        funding: Funding,
        amount_in: U256,
        min_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        if let Funding::Native(value) = funding {
            self.native_source(&path)?;
            if value.is_zero() {
                return Err(RouterError::InsufficientAmount);
            }
        }
        let state = source.pool_state(pool)?;
        let route = self.dispatcher().quote_exact_in(
            path.hops(),
            amount_in,
            &mut ReserveSnapshot::new(source),
        )?;
        let deposit = route.amount_out();
        let shares = weighted::pool_shares_out_given_single_asset_in(
            &state,
            path.destination(),
            deposit,
        )?;
        at_least(min_shares, shares)?;

        let mut plan = PlanBuilder::new();
        self.fund_join(&mut plan, call, funding, &route);
        self.deposit(&mut plan, call, pool, path.destination(), deposit, shares);
        self.refund_unspent(&mut plan, call, funding, &route);
        Ok(plan.finish(shares))
    }

    /// Join for exact shares
    fn plan_mint_exact_out<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        funding: Funding,
        shares: U256,
        amount_in_max: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        if let Funding::Native(_) = funding {
            self.native_source(&path)?;
        }
        let state = source.pool_state(pool)?;
        let deposit =
            weighted::single_asset_in_given_pool_shares_out(&state, path.destination(), shares)?;
        let route = self.dispatcher().quote_exact_out(
            path.hops(),
            deposit,
            &mut ReserveSnapshot::new(source),
        )?;
        let amount_in = route.amount_in();
        at_most(amount_in_max, amount_in)?;

        let mut plan = PlanBuilder::new();
        self.fund_join(&mut plan, call, funding, &route);
        self.deposit(&mut plan, call, pool, path.destination(), deposit, shares);
        self.refund_unspent(&mut plan, call, funding, &route);
        Ok(plan.finish(amount_in))
    }

    /// Exit of exact shares
    fn plan_burn_exact_in<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        payout: Payout,
        shares: U256,
        amount_out_min: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        if let Payout::Native = payout {
            self.native_destination(&path)?;
        }
        let state = source.pool_state(pool)?;
        let redeemed =
            weighted::single_asset_out_given_pool_shares_in(&state, path.source(), shares)?;
        let route = self.dispatcher().quote_exact_in(
            path.hops(),
            redeemed,
            &mut ReserveSnapshot::new(source),
        )?;
        let amount_out = route.amount_out();
        at_least(amount_out_min, amount_out)?;

        let mut plan = PlanBuilder::new();
        self.redeem(&mut plan, call, pool, shares, path.source(), redeemed);
        self.pay_out(&mut plan, call, payout, &route);
        Ok(plan.finish(amount_out))
    }

    /// Exit for an exact route output
    fn plan_burn_exact_out<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        payout: Payout,
        amount_out: U256,
        max_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        if let Payout::Native = payout {
            self.native_destination(&path)?;
        }
        let state = source.pool_state(pool)?;
        let route = self.dispatcher().quote_exact_out(
            path.hops(),
            amount_out,
            &mut ReserveSnapshot::new(source),
        )?;
        let redeemed = route.amount_in();
        let shares =
            weighted::pool_shares_in_given_single_asset_out(&state, path.source(), redeemed)?;
        at_most(max_shares, shares)?;

        let mut plan = PlanBuilder::new();
        self.redeem(&mut plan, call, pool, shares, path.source(), redeemed);
        self.pay_out(&mut plan, call, payout, &route);
        Ok(plan.finish(shares))
    }

    /// Plans swapping an exact input into the pool asset at the end of
    /// `path` and joining with it.
    ///
    /// # Errors
    /// * [`RouterError::SlippageExceeded`] if fewer than `min_shares` are issued
    /// * [`RouterError::PoolMathDomainError`] if the path does not end at a pool asset
    /// * Deadline, path and swap math errors
    pub fn plan_swap_exact_tokens_for_tokens_and_mint<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_in: U256,
        min_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_mint_exact_in(
            source,
            call,
            Funding::Tokens,
            amount_in,
            min_shares,
            pool,
            path,
        )
    }

    /// Swaps an exact input into a pool asset and joins with it.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_exact_tokens_for_tokens_and_mint`], plus
    ///   settlement errors
    pub fn swap_exact_tokens_for_tokens_and_mint<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_in: U256,
        min_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_swap_exact_tokens_for_tokens_and_mint(
            &*ledger, call, amount_in, min_shares, pool, path,
        )?;
        let shares = settle(ledger, plan)?;
        info!("minted {shares} shares of {pool} from {amount_in} input");
        Ok(shares)
    }

    /// Plans swapping attached native value into a pool asset and joining.
    ///
    /// # Errors
    /// * [`RouterError::InsufficientAmount`] for zero value
    /// * See [`Router::plan_swap_exact_tokens_for_tokens_and_mint`]
    pub fn plan_swap_exact_eth_for_tokens_and_mint<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        value: U256,
        min_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_mint_exact_in(
            source,
            call,
            Funding::Native(value),
            value,
            min_shares,
            pool,
            path,
        )
    }

    /// Swaps attached native value into a pool asset and joins with it.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_exact_eth_for_tokens_and_mint`], plus
    ///   settlement errors
    pub fn swap_exact_eth_for_tokens_and_mint<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        value: U256,
        min_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_swap_exact_eth_for_tokens_and_mint(
            &*ledger, call, value, min_shares, pool, path,
        )?;
        let shares = settle(ledger, plan)?;
        info!("minted {shares} shares of {pool} from {value} native");
        Ok(shares)
    }

    /// Plans minting exactly `shares` from the pool asset at the end of
    /// `path`, paying at most `amount_in_max` of the first asset.
    ///
    /// # Errors
    /// * [`RouterError::SlippageExceeded`] if the input exceeds `amount_in_max`
    /// * Deadline, path, pool math and swap math errors
    pub fn plan_swap_tokens_for_tokens_and_mint_exact<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        shares: U256,
        amount_in_max: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_mint_exact_out(
            source,
            call,
            Funding::Tokens,
            shares,
            amount_in_max,
            pool,
            path,
        )
    }

    /// Mints exactly `shares` through a single pool asset.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_tokens_for_tokens_and_mint_exact`], plus
    ///   settlement errors
    pub fn swap_tokens_for_tokens_and_mint_exact<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        shares: U256,
        amount_in_max: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_swap_tokens_for_tokens_and_mint_exact(
            &*ledger,
            call,
            shares,
            amount_in_max,
            pool,
            path,
        )?;
        let amount_in = settle(ledger, plan)?;
        info!("minted exactly {shares} shares of {pool} for {amount_in} input");
        Ok(amount_in)
    }

    /// Plans minting exactly `shares` from attached native value. Only the
    /// required input is wrapped; the rest is refunded.
    ///
    /// # Errors
    /// * [`RouterError::SlippageExceeded`] if `value` does not cover the input
    /// * See [`Router::plan_swap_tokens_for_tokens_and_mint_exact`]
    pub fn plan_swap_eth_for_tokens_and_mint_exact<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        value: U256,
        shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_mint_exact_out(
            source,
            call,
            Funding::Native(value),
            shares,
            value,
            pool,
            path,
        )
    }

    /// Mints exactly `shares` from attached native value, refunding the rest.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_eth_for_tokens_and_mint_exact`], plus
    ///   settlement errors and [`RouterError::RefundTransferFailed`]
    pub fn swap_eth_for_tokens_and_mint_exact<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        value: U256,
        shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self
            .plan_swap_eth_for_tokens_and_mint_exact(&*ledger, call, value, shares, pool, path)?;
        let amount_in = settle(ledger, plan)?;
        info!("minted exactly {shares} shares of {pool} for {amount_in} native");
        Ok(amount_in)
    }

    /// Plans redeeming exactly `shares` for the pool asset at the start of
    /// `path` and swapping it along the path.
    ///
    /// # Errors
    /// * [`RouterError::SlippageExceeded`] if the output is below `amount_out_min`
    /// * Deadline, path, pool math and swap math errors
    pub fn plan_burn_exact_and_swap_for_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        shares: U256,
        amount_out_min: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_burn_exact_in(
            source,
            call,
            Payout::Tokens,
            shares,
            amount_out_min,
            pool,
            path,
        )
    }

    /// Redeems exactly `shares` and swaps the payout along `path`.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_exact_and_swap_for_tokens`], plus settlement errors
    pub fn burn_exact_and_swap_for_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        shares: U256,
        amount_out_min: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_burn_exact_and_swap_for_tokens(
            &*ledger,
            call,
            shares,
            amount_out_min,
            pool,
            path,
        )?;
        let amount_out = settle(ledger, plan)?;
        info!("burned {shares} shares of {pool} for {amount_out} output");
        Ok(amount_out)
    }

    /// Plans redeeming exactly `shares` and swapping into native value.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_exact_and_swap_for_tokens`]; the path must
    ///   end at the wrapped native asset
    pub fn plan_burn_exact_and_swap_for_eth<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        shares: U256,
        amount_out_min: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_burn_exact_in(
            source,
            call,
            Payout::Native,
            shares,
            amount_out_min,
            pool,
            path,
        )
    }

    /// Redeems exactly `shares` and pays the recipient native value.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_exact_and_swap_for_eth`], plus settlement errors
    pub fn burn_exact_and_swap_for_eth<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        shares: U256,
        amount_out_min: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_burn_exact_and_swap_for_eth(
            &*ledger,
            call,
            shares,
            amount_out_min,
            pool,
            path,
        )?;
        let amount_out = settle(ledger, plan)?;
        info!("burned {shares} shares of {pool} for {amount_out} native");
        Ok(amount_out)
    }

    /// Plans redeeming as few shares as needed for an exact output of the
    /// path's last asset.
    ///
    /// # Errors
    /// * [`RouterError::SlippageExceeded`] if more than `max_shares` are needed
    /// * Deadline, path, pool math and swap math errors
    pub fn plan_burn_and_swap_for_exact_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_out: U256,
        max_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_burn_exact_out(
            source,
            call,
            Payout::Tokens,
            amount_out,
            max_shares,
            pool,
            path,
        )
    }

    /// Redeems as few shares as needed for an exact output.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_and_swap_for_exact_tokens`], plus settlement errors
    pub fn burn_and_swap_for_exact_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_out: U256,
        max_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_burn_and_swap_for_exact_tokens(
            &*ledger, call, amount_out, max_shares, pool, path,
        )?;
        let shares = settle(ledger, plan)?;
        info!("burned {shares} shares of {pool} for exactly {amount_out} output");
        Ok(shares)
    }

    /// Plans redeeming as few shares as needed for an exact amount of native
    /// value.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_and_swap_for_exact_tokens`]; the path must
    ///   end at the wrapped native asset
    pub fn plan_burn_and_swap_for_exact_eth<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_out: U256,
        max_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<Plan<U256>> {
        self.plan_burn_exact_out(
            source,
            call,
            Payout::Native,
            amount_out,
            max_shares,
            pool,
            path,
        )
    }

    /// Redeems as few shares as needed for an exact amount of native value.
    ///
    /// # Errors
    /// * See [`Router::plan_burn_and_swap_for_exact_eth`], plus settlement errors
    pub fn burn_and_swap_for_exact_eth<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_out: U256,
        max_shares: U256,
        pool: Address,
        path: &[u8],
    ) -> Result<U256> {
        let plan = self.plan_burn_and_swap_for_exact_eth(
            &*ledger, call, amount_out, max_shares, pool, path,
        )?;
        let shares = settle(ledger, plan)?;
        info!("burned {shares} shares of {pool} for exactly {amount_out} native");
        Ok(shares)
    }
}
