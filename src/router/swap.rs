//! Plain swaps along a path, with optional native input or output.

use alloy::primitives::U256;
use log::info;

use super::{at_least, at_most, settle, Call, Router};
use crate::error::{Result, RouterError};
use crate::ledger::{Ledger, ReserveSource};
use crate::route::codec::Path;
use crate::route::dispatch::ReserveSnapshot;
use crate::settle::plan::{Plan, PlanBuilder, RefundAsset};

impl Router {
    /// Plans an exact-in swap paying at least `amount_out_min` to the recipient.
    ///
    /// # Errors
    /// * [`RouterError::DeadlineExpired`], [`RouterError::SlippageExceeded`],
    ///   [`RouterError::MalformedPath`] or a propagated swap math error
    pub fn plan_swap_exact_tokens_for_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_in: U256,
        amount_out_min: U256,
        path: &[u8],
    ) -> Result<Plan<Vec<U256>>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        let route = self.dispatcher().quote_exact_in(
            path.hops(),
            amount_in,
            &mut ReserveSnapshot::new(source),
        )?;
        at_least(amount_out_min, route.amount_out())?;

        let mut plan = PlanBuilder::new();
        route.settle(&mut plan, call.sender, call.recipient);
        Ok(plan.finish(route.amounts()))
    }

    /// Swaps an exact input for as much output as the path gives.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_exact_tokens_for_tokens`], plus settlement errors
    pub fn swap_exact_tokens_for_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_in: U256,
        amount_out_min: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let plan = self.plan_swap_exact_tokens_for_tokens(
            &*ledger,
            call,
            amount_in,
            amount_out_min,
            path,
        )?;
        let amounts = settle(ledger, plan)?;
        info!("swap exact in settled: {amounts:?}");
        Ok(amounts)
    }

    /// Plans an exact-out swap charging the sender at most `amount_in_max`.
    ///
    /// # Errors
    /// * [`RouterError::DeadlineExpired`], [`RouterError::SlippageExceeded`],
    ///   [`RouterError::MalformedPath`] or a propagated swap math error
    pub fn plan_swap_tokens_for_exact_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_out: U256,
        amount_in_max: U256,
        path: &[u8],
    ) -> Result<Plan<Vec<U256>>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        let route = self.dispatcher().quote_exact_out(
            path.hops(),
            amount_out,
            &mut ReserveSnapshot::new(source),
        )?;
        at_most(amount_in_max, route.amount_in())?;

        let mut plan = PlanBuilder::new();
        route.settle(&mut plan, call.sender, call.recipient);
        Ok(plan.finish(route.amounts()))
    }

    /// Swaps as little input as needed for an exact output.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_tokens_for_exact_tokens`], plus settlement errors
    pub fn swap_tokens_for_exact_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_out: U256,
        amount_in_max: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let plan = self.plan_swap_tokens_for_exact_tokens(
            &*ledger,
            call,
            amount_out,
            amount_in_max,
            path,
        )?;
        let amounts = settle(ledger, plan)?;
        info!("swap exact out settled: {amounts:?}");
        Ok(amounts)
    }

    /// Plans an exact-in swap of native value. The path starts at the wrapped
    /// native asset.
    ///
    /// # Errors
    /// * [`RouterError::InsufficientAmount`] for zero value
    /// * See [`Router::plan_swap_exact_tokens_for_tokens`]
    pub fn plan_swap_exact_eth_for_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        value: U256,
        amount_out_min: U256,
        path: &[u8],
    ) -> Result<Plan<Vec<U256>>> {
        Self::check_deadline(source, call.deadline)?;
        if value.is_zero() {
            return Err(RouterError::InsufficientAmount);
        }
        let path = Path::decode(path)?;
        self.native_source(&path)?;
        let route = self.dispatcher().quote_exact_in(
            path.hops(),
            value,
            &mut ReserveSnapshot::new(source),
        )?;
        at_least(amount_out_min, route.amount_out())?;

        let mut plan = PlanBuilder::new();
        plan.receive_native(call.sender, self.address, value);
        plan.wrap(self.address, value);
        route.settle(&mut plan, self.address, call.recipient);
        Ok(plan.finish(route.amounts()))
    }

    /// Swaps attached native value for as much output as the path gives.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_exact_eth_for_tokens`], plus settlement errors
    pub fn swap_exact_eth_for_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        value: U256,
        amount_out_min: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let plan =
            self.plan_swap_exact_eth_for_tokens(&*ledger, call, value, amount_out_min, path)?;
        let amounts = settle(ledger, plan)?;
        info!("swap exact native in settled: {amounts:?}");
        Ok(amounts)
    }

    /// Plans an exact-out swap into native value. The path ends at the
    /// wrapped native asset.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_tokens_for_exact_tokens`]
    pub fn plan_swap_tokens_for_exact_eth<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_out: U256,
        amount_in_max: U256,
        path: &[u8],
    ) -> Result<Plan<Vec<U256>>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        self.native_destination(&path)?;
        let route = self.dispatcher().quote_exact_out(
            path.hops(),
            amount_out,
            &mut ReserveSnapshot::new(source),
        )?;
        at_most(amount_in_max, route.amount_in())?;

        let mut plan = PlanBuilder::new();
        route.settle(&mut plan, call.sender, self.address);
        plan.unwrap(self.address, amount_out);
        plan.send_native(self.address, call.recipient, amount_out);
        Ok(plan.finish(route.amounts()))
    }

    /// Swaps as little input as needed for an exact amount of native value.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_tokens_for_exact_eth`], plus settlement errors
    pub fn swap_tokens_for_exact_eth<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_out: U256,
        amount_in_max: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let plan =
            self.plan_swap_tokens_for_exact_eth(&*ledger, call, amount_out, amount_in_max, path)?;
        let amounts = settle(ledger, plan)?;
        info!("swap exact native out settled: {amounts:?}");
        Ok(amounts)
    }

    /// Plans an exact-in swap into native value. The path ends at the wrapped
    /// native asset.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_exact_tokens_for_tokens`]
    pub fn plan_swap_exact_tokens_for_eth<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        amount_in: U256,
        amount_out_min: U256,
        path: &[u8],
    ) -> Result<Plan<Vec<U256>>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        self.native_destination(&path)?;
        let route = self.dispatcher().quote_exact_in(
            path.hops(),
            amount_in,
            &mut ReserveSnapshot::new(source),
        )?;
        let amount_out = route.amount_out();
        at_least(amount_out_min, amount_out)?;

        let mut plan = PlanBuilder::new();
        route.settle(&mut plan, call.sender, self.address);
        plan.unwrap(self.address, amount_out);
        plan.send_native(self.address, call.recipient, amount_out);
        Ok(plan.finish(route.amounts()))
    }

    /// Swaps an exact input for as much native value as the path gives.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_exact_tokens_for_eth`], plus settlement errors
    pub fn swap_exact_tokens_for_eth<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        amount_in: U256,
        amount_out_min: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let plan =
            self.plan_swap_exact_tokens_for_eth(&*ledger, call, amount_in, amount_out_min, path)?;
        let amounts = settle(ledger, plan)?;
        info!("swap into native settled: {amounts:?}");
        Ok(amounts)
    }

    /// Plans an exact-out swap funded by attached native value. Only the
    /// required input is wrapped; the rest is refunded to the sender.
    ///
    /// # Errors
    /// * [`RouterError::SlippageExceeded`] if `value` does not cover the input
    /// * See [`Router::plan_swap_tokens_for_exact_tokens`]
    pub fn plan_swap_eth_for_exact_tokens<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        call: &Call,
        value: U256,
        amount_out: U256,
        path: &[u8],
    ) -> Result<Plan<Vec<U256>>> {
        Self::check_deadline(source, call.deadline)?;
        let path = Path::decode(path)?;
        self.native_source(&path)?;
        let route = self.dispatcher().quote_exact_out(
            path.hops(),
            amount_out,
            &mut ReserveSnapshot::new(source),
        )?;
        let amount_in = route.amount_in();
        at_most(value, amount_in)?;

        let mut plan = PlanBuilder::new();
        plan.receive_native(call.sender, self.address, value);
        plan.wrap(self.address, amount_in);
        route.settle(&mut plan, self.address, call.recipient);
        plan.refund(
            RefundAsset::Native,
            self.address,
            call.sender,
            value - amount_in,
        );
        Ok(plan.finish(route.amounts()))
    }

    /// Swaps attached native value for an exact output, refunding the rest.
    ///
    /// # Errors
    /// * See [`Router::plan_swap_eth_for_exact_tokens`], plus settlement errors
    ///   and [`RouterError::RefundTransferFailed`]
    pub fn swap_eth_for_exact_tokens<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        call: &Call,
        value: U256,
        amount_out: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let plan = self.plan_swap_eth_for_exact_tokens(&*ledger, call, value, amount_out, path)?;
        let amounts = settle(ledger, plan)?;
        info!("swap native for exact out settled: {amounts:?}");
        Ok(amounts)
    }
}
