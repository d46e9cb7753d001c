//! Walks a path leg by leg and prices every leg against venue reserves.
//!
//! All legs of one operation are priced against a single [`ReserveSnapshot`].
//! Each priced leg is applied to the snapshot before the next one is priced,
//! so later legs see the reserves the earlier legs leave behind when they
//! settle in the same order.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use itertools::Itertools;
use log::debug;

use crate::config::Venues;
use crate::error::{Result, RouterError};
use crate::ledger::ReserveSource;
use crate::math::swap;
use crate::route::hop::Hop;
use crate::route::pair::sort_assets;
use crate::route::quote::{RouteQuote, SwapQuote};
use crate::types::ReservePair;

/// Reserves read once per operation, adjusted by every planned leg.
pub struct ReserveSnapshot<'a, S: ?Sized> {
    /// Where untouched pairs are read from
    source: &'a S,
    /// `(reserve0, reserve1)` of every pair touched so far
    reserves: HashMap<Address, (U256, U256)>,
}

impl<'a, S: ReserveSource + ?Sized> ReserveSnapshot<'a, S> {
    /// Snapshot that reads each pair from `source` on first use.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            reserves: HashMap::new(),
        }
    }

    /// Underlying reserve source.
    pub const fn source(&self) -> &'a S {
        self.source
    }

    /// `(reserve0, reserve1)` of `pair`, read through on first use
    fn sorted(&mut self, pair: Address) -> Result<(U256, U256)> {
        if let Some(reserves) = self.reserves.get(&pair) {
            return Ok(*reserves);
        }
        let reserves = self.source.reserves_of(pair)?;
        self.reserves.insert(pair, reserves);
        Ok(reserves)
    }

    /// Reserves of `pair` oriented from `asset_in` to `asset_out`.
    ///
    /// # Errors
    /// * If the source cannot report the reserves
    pub fn reserves(
        &mut self,
        pair: Address,
        asset_in: Address,
        asset_out: Address,
    ) -> Result<ReservePair> {
        let (reserve0, reserve1) = self.sorted(pair)?;
        let (token0, _) = sort_assets(asset_in, asset_out);
        Ok(if asset_in == token0 {
            ReservePair {
                reserve_in: reserve0,
                reserve_out: reserve1,
            }
        } else {
            ReservePair {
                reserve_in: reserve1,
                reserve_out: reserve0,
            }
        })
    }

    /// Moves the reserves of the quoted pair as if the leg had settled.
    ///
    /// # Errors
    /// * [`RouterError::ArithmeticOverflow`] if a reserve overflows
    /// * [`RouterError::InsufficientLiquidity`] if the leg drains the pair
    pub fn apply(&mut self, quote: &SwapQuote) -> Result<()> {
        let current = self.reserves(quote.pair, quote.asset_in, quote.asset_out)?;
        let reserve_in = current
            .reserve_in
            .checked_add(quote.amount_in)
            .ok_or(RouterError::ArithmeticOverflow)?;
        let reserve_out = current
            .reserve_out
            .checked_sub(quote.amount_out)
            .ok_or(RouterError::InsufficientLiquidity)?;

        let sorted = if quote.asset_in < quote.asset_out {
            (reserve_in, reserve_out)
        } else {
            (reserve_out, reserve_in)
        };
        self.reserves.insert(quote.pair, sorted);
        Ok(())
    }
}

/// Prices paths against the two venues.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'v> {
    /// Venues legs resolve to
    venues: &'v Venues,
}

impl<'v> Dispatcher<'v> {
    /// Dispatcher over `venues`.
    #[must_use]
    pub const fn new(venues: &'v Venues) -> Self {
        Self { venues }
    }

    /// Pair executing the leg `from -> to`, on the venue of the destination hop
    fn pair_of(&self, from: &Hop, to: &Hop) -> Address {
        self.venues.pair_for(to.venue, from.asset, to.asset)
    }

    /// Prices `hops` forward from an exact input and applies every leg to
    /// `snapshot`.
    ///
    /// # Errors
    /// * [`RouterError::PathExhausted`] if there is no leg
    /// * Any error of [`swap::amount_out`]
    pub fn quote_exact_in<S: ReserveSource + ?Sized>(
        &self,
        hops: &[Hop],
        amount_in: U256,
        snapshot: &mut ReserveSnapshot<'_, S>,
    ) -> Result<RouteQuote> {
        if hops.len() < 2 {
            return Err(RouterError::PathExhausted);
        }

        let mut amount = amount_in;
        let mut quotes = Vec::with_capacity(hops.len() - 1);
        for (from, to) in hops.iter().tuple_windows() {
            let pair = self.pair_of(from, to);
            let reserves = snapshot.reserves(pair, from.asset, to.asset)?;
            let amount_out = swap::amount_out(amount, reserves.reserve_in, reserves.reserve_out)?;
            let quote = SwapQuote {
                pair,
                venue: to.venue,
                asset_in: from.asset,
                asset_out: to.asset,
                amount_in: amount,
                amount_out,
            };
            debug!("{quote:?}");
            snapshot.apply(&quote)?;
            quotes.push(quote);
            amount = amount_out;
        }
        RouteQuote::new(quotes)
    }

    /// Prices `hops` backward from an exact output, then applies every leg to
    /// `snapshot` in settlement order.
    ///
    /// # Errors
    /// * [`RouterError::PathExhausted`] if there is no leg
    /// * [`RouterError::MalformedPath`] if two legs run through the same pair
    /// * Any error of [`swap::amount_in`]
    pub fn quote_exact_out<S: ReserveSource + ?Sized>(
        &self,
        hops: &[Hop],
        amount_out: U256,
        snapshot: &mut ReserveSnapshot<'_, S>,
    ) -> Result<RouteQuote> {
        if hops.len() < 2 {
            return Err(RouterError::PathExhausted);
        }
        let pairs = hops
            .iter()
            .tuple_windows()
            .map(|(from, to)| self.pair_of(from, to))
            .collect::<Vec<_>>();
        // Backward pricing reads every pair before any leg moves it
        if !pairs.iter().all_unique() {
            return Err(RouterError::malformed("exact-out path reuses a pair"));
        }

        let mut amount = amount_out;
        let mut quotes = Vec::with_capacity(pairs.len());
        for (window, pair) in hops.windows(2).zip(pairs).rev() {
            let [from, to] = window else {
                continue;
            };
            let reserves = snapshot.reserves(pair, from.asset, to.asset)?;
            let amount_in = swap::amount_in(amount, reserves.reserve_in, reserves.reserve_out)?;
            quotes.push(SwapQuote {
                pair,
                venue: to.venue,
                asset_in: from.asset,
                asset_out: to.asset,
                amount_in,
                amount_out: amount,
            });
            amount = amount_in;
        }
        quotes.reverse();

        for quote in &quotes {
            debug!("{quote:?}");
            snapshot.apply(quote)?;
        }
        RouteQuote::new(quotes)
    }
}
