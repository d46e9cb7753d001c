//! The operation catalog.
//!
//! Every operation comes in two forms. `plan_*` reads a [`ReserveSource`] and
//! returns the full settlement [`Plan`] without side effects. The bare name
//! plans against a [`Ledger`], executes the plan under a checkpoint and
//! returns the plan's outcome.

/// Joins and exits through every pool asset
mod all_assets;
/// Settlement scenarios across every operation
#[cfg(test)]
mod scenarios;
/// Joins and exits through one pool asset
mod single;
/// Plain and native swaps
mod swap;

pub use all_assets::AllAssetMint;

use alloy::primitives::{Address, U256};
use log::debug;

use crate::config::{Config, Venues};
use crate::error::{Result, RouterError};
use crate::ledger::{Ledger, ReserveSource};
use crate::route::codec::Path;
use crate::route::dispatch::{Dispatcher, ReserveSnapshot};
use crate::settle::executor::Executor;
use crate::settle::plan::Plan;

/// Caller side of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    /// Who pays and receives refunds
    pub sender: Address,
    /// Who receives the output
    pub recipient: Address,
    /// Last ledger timestamp at which the operation may settle
    pub deadline: u64,
}

impl Call {
    /// Creates a call settling by `deadline`.
    #[must_use]
    pub const fn new(sender: Address, recipient: Address, deadline: u64) -> Self {
        Self {
            sender,
            recipient,
            deadline,
        }
    }
}

/// Routes swaps across the two venues and in and out of weighted pools.
#[derive(Debug, Clone)]
pub struct Router {
    /// Holder the router settles intermediate balances through
    address: Address,
    /// Wrapped form of the native asset
    wrapped_native: Address,
    /// Both venues
    venues: Venues,
}

impl Router {
    /// Creates a router for the venues of `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            address: config.router,
            wrapped_native: config.wrapped_native,
            venues: config.venues.clone(),
        }
    }

    /// Holder address of the router.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Wrapped form of the native asset.
    #[must_use]
    pub const fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    /// Leg pricing over this router's venues
    const fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.venues)
    }

    /// Fails once the ledger clock is past `deadline`
    fn check_deadline<S: ReserveSource + ?Sized>(source: &S, deadline: u64) -> Result<()> {
        let now = source.timestamp();
        if now > deadline {
            return Err(RouterError::DeadlineExpired { deadline, now });
        }
        Ok(())
    }

    /// Fails unless the path starts at the wrapped native asset
    fn native_source(&self, path: &Path) -> Result<()> {
        if path.source() != self.wrapped_native {
            return Err(RouterError::malformed(
                "path does not start at the wrapped native asset",
            ));
        }
        Ok(())
    }

    /// Fails unless the path ends at the wrapped native asset
    fn native_destination(&self, path: &Path) -> Result<()> {
        if path.destination() != self.wrapped_native {
            return Err(RouterError::malformed(
                "path does not end at the wrapped native asset",
            ));
        }
        Ok(())
    }

    /// Output of every leg of `path` for an exact input.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] if the path does not decode
    /// * Any swap math error of a leg
    pub fn get_amounts_out<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        amount_in: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let path = Path::decode(path)?;
        let route = self.dispatcher().quote_exact_in(
            path.hops(),
            amount_in,
            &mut ReserveSnapshot::new(source),
        )?;
        Ok(route.amounts())
    }

    /// Input of every leg of `path` for an exact output.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] if the path does not decode or reuses a pair
    /// * Any swap math error of a leg
    pub fn get_amounts_in<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        amount_out: U256,
        path: &[u8],
    ) -> Result<Vec<U256>> {
        let path = Path::decode(path)?;
        let route = self.dispatcher().quote_exact_out(
            path.hops(),
            amount_out,
            &mut ReserveSnapshot::new(source),
        )?;
        Ok(route.amounts())
    }
}

/// Fails when `actual` is below the caller's minimum
fn at_least(limit: U256, actual: U256) -> Result<()> {
    if actual < limit {
        return Err(RouterError::SlippageExceeded { limit, actual });
    }
    Ok(())
}

/// Fails when `actual` is above the caller's maximum
fn at_most(limit: U256, actual: U256) -> Result<()> {
    if actual > limit {
        return Err(RouterError::SlippageExceeded { limit, actual });
    }
    Ok(())
}

/// Executes `plan` against `ledger` and hands back its outcome
fn settle<L: Ledger + ?Sized, T: std::fmt::Debug>(ledger: &mut L, plan: Plan<T>) -> Result<T> {
    Executor::new(ledger).execute(&plan)?;
    debug!(
        "settled {} instructions: {:?}",
        plan.instructions().len(),
        plan.outcome()
    );
    Ok(plan.into_outcome())
}
