//! In-memory ledger with constant-product pair and weighted pool semantics.
//!
//! Pairs behave like Uniswap V2 pairs: inputs are transferred in first, `swap`
//! pays the outputs and accepts the trade only if the fee-adjusted product of
//! the balances does not drop. Pools issue and redeem shares against the
//! assets they hold beyond their recorded balances. Every effect is appended
//! to an event log so tests can assert on settlement order.

use std::collections::{HashMap, HashSet};

use alloy::primitives::{Address, U256};
use log::trace;
use serde::Serialize;

use crate::error::{Result, RouterError};
use crate::ledger::portfolio::Portfolio;
use crate::ledger::{Ledger, ReserveSource};
use crate::math::weighted;
use crate::route::pair::sort_assets;
use crate::types::PoolState;
use crate::utils::constants::{SWAP_FEE_DENOMINATOR, SWAP_FEE_NUMERATOR};

/// Effect recorded by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    /// Asset moved between holders
    Transfer {
        /// Asset moved
        asset: Address,
        /// Payer
        from: Address,
        /// Payee
        to: Address,
        /// Amount moved
        amount: U256,
    },
    /// Native value moved between holders
    NativeTransfer {
        /// Payer
        from: Address,
        /// Payee
        to: Address,
        /// Amount moved
        amount: U256,
    },
    /// Native value wrapped
    Deposit {
        /// Holder
        holder: Address,
        /// Amount wrapped
        amount: U256,
    },
    /// Wrapped native unwrapped
    Withdrawal {
        /// Holder
        holder: Address,
        /// Amount unwrapped
        amount: U256,
    },
    /// Pair trade
    Swap {
        /// Pair
        pair: Address,
        /// Token0 received
        amount0_in: U256,
        /// Token1 received
        amount1_in: U256,
        /// Token0 paid
        amount0_out: U256,
        /// Token1 paid
        amount1_out: U256,
        /// Receiver of the outputs
        to: Address,
    },
    /// Pool shares issued
    Mint {
        /// Pool
        pool: Address,
        /// Receiver of the shares
        to: Address,
        /// Shares issued
        shares: U256,
    },
    /// Pool shares redeemed
    Burn {
        /// Pool
        pool: Address,
        /// Former holder of the shares
        from: Address,
        /// Shares redeemed
        shares: U256,
    },
}

/// Recorded state of one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRecord {
    /// Lower sorted asset
    pub token0: Address,
    /// Higher sorted asset
    pub token1: Address,
    /// Recorded reserve of token0
    pub reserve0: U256,
    /// Recorded reserve of token1
    pub reserve1: U256,
}

/// Everything a checkpoint restores
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Asset holdings per holder
    balances: HashMap<Address, Portfolio>,
    /// Native value per holder
    native: Portfolio,
    /// Pairs by address
    pairs: HashMap<Address, PairRecord>,
    /// Weighted pools by address, with their recorded balances
    pools: HashMap<Address, PoolState>,
    /// Effects in order
    events: Vec<LedgerEvent>,
    /// Ledger time
    timestamp: u64,
}

/// Ledger test double holding every balance in memory
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    /// Asset that wraps native value
    wrapped_native: Address,
    /// Holders refusing native value
    rejects_native: HashSet<Address>,
    /// Restorable state
    state: State,
}

impl MemoryLedger {
    /// Empty ledger at time zero.
    #[must_use]
    pub fn new(wrapped_native: Address) -> Self {
        Self {
            wrapped_native,
            rejects_native: HashSet::new(),
            state: State::default(),
        }
    }

    /// Gives `holder` `amount` of `asset` out of thin air.
    pub fn mint_balance(&mut self, holder: Address, asset: Address, amount: U256) {
        let balance = self
            .state
            .balances
            .entry(holder)
            .or_default()
            .holdings
            .entry(asset)
            .or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Gives `holder` `amount` of native value.
    pub fn credit_native(&mut self, holder: Address, amount: U256) {
        let balance = self.state.native.holdings.entry(holder).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Registers a pair holding the given reserves.
    pub fn add_pair(
        &mut self,
        pair: Address,
        asset_a: Address,
        asset_b: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) {
        let (token0, token1) = sort_assets(asset_a, asset_b);
        let (reserve0, reserve1) = if token0 == asset_a {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        self.mint_balance(pair, token0, reserve0);
        self.mint_balance(pair, token1, reserve1);
        self.state.pairs.insert(
            pair,
            PairRecord {
                token0,
                token1,
                reserve0,
                reserve1,
            },
        );
    }

    /// Registers a weighted pool holding its recorded balances.
    pub fn add_pool(&mut self, pool: PoolState) {
        for record in &pool.assets {
            self.mint_balance(pool.address, record.asset, record.balance);
        }
        self.state.pools.insert(pool.address, pool);
    }

    /// Moves the ledger clock.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.state.timestamp = timestamp;
    }

    /// Makes every native transfer to `holder` fail.
    pub fn reject_native(&mut self, holder: Address) {
        self.rejects_native.insert(holder);
    }

    /// Balance of `asset` held by `holder`, zero when none.
    #[must_use]
    pub fn balance_of(&self, holder: Address, asset: Address) -> U256 {
        self.state
            .balances
            .get(&holder)
            .map_or(U256::ZERO, |portfolio| portfolio.balance(&asset))
    }

    /// Native value held by `holder`.
    #[must_use]
    pub fn native_balance(&self, holder: Address) -> U256 {
        self.state.native.balance(&holder)
    }

    /// Recorded state of `pair`.
    #[must_use]
    pub fn pair(&self, pair: Address) -> Option<&PairRecord> {
        self.state.pairs.get(&pair)
    }

    /// Effects since creation or the last [`MemoryLedger::clear_events`].
    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        &self.state.events
    }

    /// Forgets the recorded effects.
    pub fn clear_events(&mut self) {
        self.state.events.clear();
    }

    /// Asset transfers in order, as `(asset, from, to, amount)`.
    #[must_use]
    pub fn transfers(&self) -> Vec<(Address, Address, Address, U256)> {
        self.state
            .events
            .iter()
            .filter_map(|event| match event {
                LedgerEvent::Transfer {
                    asset,
                    from,
                    to,
                    amount,
                } => Some((*asset, *from, *to, *amount)),
                _ => None,
            })
            .collect()
    }

    /// Holdings of `holder`, created empty on first use
    fn portfolio(&mut self, holder: Address) -> &mut Portfolio {
        self.state.balances.entry(holder).or_default()
    }

    /// Moves an asset and logs the transfer
    fn move_asset(&mut self, asset: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        self.portfolio(from).debit(asset, amount)?;
        self.portfolio(to).credit(asset, amount)?;
        trace!("transfer {amount} of {asset} {from} -> {to}");
        self.state.events.push(LedgerEvent::Transfer {
            asset,
            from,
            to,
            amount,
        });
        Ok(())
    }

    /// Recorded state of `pool`
    fn pool_record(&self, pool: Address) -> Result<PoolState> {
        self.state
            .pools
            .get(&pool)
            .cloned()
            .ok_or(RouterError::UnknownPool { pool })
    }
}

/// `balance * 1000 - amount_in * 3`, the balance net of the venue fee
fn fee_adjusted(balance: U256, amount_in: U256) -> Result<U256> {
    let fee = U256::from(SWAP_FEE_DENOMINATOR - SWAP_FEE_NUMERATOR);
    balance
        .checked_mul(U256::from(SWAP_FEE_DENOMINATOR))
        .and_then(|scaled| scaled.checked_sub(amount_in.checked_mul(fee)?))
        .ok_or(RouterError::ArithmeticOverflow)
}

/// Whether a single-asset deposit of `deposit` pays for `shares`
fn single_deposit_covers(pool: &PoolState, asset: Address, deposit: U256, shares: U256) -> bool {
    weighted::single_asset_in_given_pool_shares_out(pool, asset, shares)
        .is_ok_and(|required| deposit >= required)
        || weighted::pool_shares_out_given_single_asset_in(pool, asset, deposit)
            .is_ok_and(|issued| shares <= issued)
}

/// Whether redeeming `shares` pays for a single-asset `payout`
fn single_payout_covered(pool: &PoolState, asset: Address, payout: U256, shares: U256) -> bool {
    weighted::single_asset_out_given_pool_shares_in(pool, asset, shares)
        .is_ok_and(|owed| payout <= owed)
        || weighted::pool_shares_in_given_single_asset_out(pool, asset, payout)
            .is_ok_and(|required| shares >= required)
}

impl ReserveSource for MemoryLedger {
    fn timestamp(&self) -> u64 {
        self.state.timestamp
    }

    fn reserves_of(&self, pair: Address) -> Result<(U256, U256)> {
        Ok(self
            .state
            .pairs
            .get(&pair)
            .map_or((U256::ZERO, U256::ZERO), |record| {
                (record.reserve0, record.reserve1)
            }))
    }

    fn pool_state(&self, pool: Address) -> Result<PoolState> {
        self.pool_record(pool)
    }
}

impl Ledger for MemoryLedger {
    type Checkpoint = State;

    fn checkpoint(&self) -> State {
        self.state.clone()
    }

    fn revert_to(&mut self, checkpoint: State) {
        self.state = checkpoint;
    }

    fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        self.move_asset(asset, from, to, amount)
    }

    fn transfer_native(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        if self.rejects_native.contains(&to) {
            return Err(RouterError::ledger(format!("{to} rejects native value")));
        }
        self.state.native.debit(from, amount)?;
        self.state.native.credit(to, amount)?;
        self.state
            .events
            .push(LedgerEvent::NativeTransfer { from, to, amount });
        Ok(())
    }

    fn wrap(&mut self, holder: Address, amount: U256) -> Result<()> {
        self.state.native.debit(holder, amount)?;
        let wrapped_native = self.wrapped_native;
        self.portfolio(holder).credit(wrapped_native, amount)?;
        self.state
            .events
            .push(LedgerEvent::Deposit { holder, amount });
        Ok(())
    }

    fn unwrap(&mut self, holder: Address, amount: U256) -> Result<()> {
        let wrapped_native = self.wrapped_native;
        self.portfolio(holder).debit(wrapped_native, amount)?;
        self.state.native.credit(holder, amount)?;
        self.state
            .events
            .push(LedgerEvent::Withdrawal { holder, amount });
        Ok(())
    }

    fn swap(
        &mut self,
        pair: Address,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    ) -> Result<()> {
        let record = self
            .state
            .pairs
            .get(&pair)
            .cloned()
            .ok_or_else(|| RouterError::ledger(format!("no pair at {pair}")))?;
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(RouterError::ledger("swap pays nothing out"));
        }
        if amount0_out >= record.reserve0 || amount1_out >= record.reserve1 {
            return Err(RouterError::InsufficientLiquidity);
        }
        if to == record.token0 || to == record.token1 {
            return Err(RouterError::ledger("swap pays an asset of the pair"));
        }

        let held0 = self.balance_of(pair, record.token0);
        let held1 = self.balance_of(pair, record.token1);
        let balance0 = held0
            .checked_sub(amount0_out)
            .ok_or_else(|| RouterError::ledger("pair cannot pay token0"))?;
        let balance1 = held1
            .checked_sub(amount1_out)
            .ok_or_else(|| RouterError::ledger("pair cannot pay token1"))?;

        // Whatever the pair holds beyond its reserves net of outputs is input
        let amount0_in = balance0.saturating_sub(record.reserve0 - amount0_out);
        let amount1_in = balance1.saturating_sub(record.reserve1 - amount1_out);
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(RouterError::ledger("swap received no input"));
        }

        let adjusted = fee_adjusted(balance0, amount0_in)?
            .checked_mul(fee_adjusted(balance1, amount1_in)?)
            .ok_or(RouterError::ArithmeticOverflow)?;
        let required = record
            .reserve0
            .checked_mul(record.reserve1)
            .and_then(|k| k.checked_mul(U256::from(SWAP_FEE_DENOMINATOR.pow(2))))
            .ok_or(RouterError::ArithmeticOverflow)?;
        if adjusted < required {
            return Err(RouterError::ledger("swap decreases the pair invariant"));
        }

        if !amount0_out.is_zero() {
            self.move_asset(record.token0, pair, to, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            self.move_asset(record.token1, pair, to, amount1_out)?;
        }
        if let Some(record) = self.state.pairs.get_mut(&pair) {
            record.reserve0 = balance0;
            record.reserve1 = balance1;
        }
        self.state.events.push(LedgerEvent::Swap {
            pair,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            to,
        });
        Ok(())
    }

    fn mint(&mut self, pool: Address, shares: U256, to: Address) -> Result<()> {
        let state = self.pool_record(pool)?;
        if shares.is_zero() {
            return Err(RouterError::ledger("mint of zero shares"));
        }

        let deposits = state
            .assets
            .iter()
            .map(|record| {
                self.balance_of(pool, record.asset)
                    .saturating_sub(record.balance)
            })
            .collect::<Vec<_>>();
        let deposited = deposits.iter().filter(|amount| !amount.is_zero()).count();

        let covered = match deposited {
            0 => false,
            1 => state
                .assets
                .iter()
                .zip(&deposits)
                .find(|(_, amount)| !amount.is_zero())
                .is_some_and(|(record, amount)| {
                    single_deposit_covers(&state, record.asset, *amount, shares)
                }),
            _ => weighted::all_assets_in_given_pool_shares_out(&state, shares)?
                .iter()
                .zip(&deposits)
                .all(|((_, required), deposit)| deposit >= required),
        };
        if !covered {
            return Err(RouterError::ledger("deposits do not pay for the shares"));
        }

        let holdings = state
            .assets
            .iter()
            .map(|record| self.balance_of(pool, record.asset))
            .collect::<Vec<_>>();
        if let Some(recorded) = self.state.pools.get_mut(&pool) {
            for (record, held) in recorded.assets.iter_mut().zip(holdings) {
                record.balance = held;
            }
            recorded.total_shares = recorded
                .total_shares
                .checked_add(shares)
                .ok_or(RouterError::ArithmeticOverflow)?;
        }
        self.portfolio(to).credit(pool, shares)?;
        self.state
            .events
            .push(LedgerEvent::Mint { pool, to, shares });
        Ok(())
    }

    fn burn(
        &mut self,
        pool: Address,
        from: Address,
        shares: U256,
        payouts: &[(Address, U256)],
        to: Address,
    ) -> Result<()> {
        let state = self.pool_record(pool)?;
        if shares.is_zero() {
            return Err(RouterError::ledger("burn of zero shares"));
        }

        let covered = match payouts {
            [] => false,
            [(asset, payout)] => single_payout_covered(&state, *asset, *payout, shares),
            _ => {
                let owed = weighted::all_assets_out_given_pool_shares_in(&state, shares)?;
                owed.len() == payouts.len()
                    && owed
                        .iter()
                        .zip(payouts)
                        .all(|((asset, owed), (paid_asset, paid))| {
                            asset == paid_asset && paid <= owed
                        })
            }
        };
        if !covered {
            return Err(RouterError::ledger("shares do not pay for the payouts"));
        }

        self.portfolio(from).debit(pool, shares)?;
        if let Some(recorded) = self.state.pools.get_mut(&pool) {
            recorded.total_shares = recorded.total_shares.saturating_sub(shares);
            for (asset, payout) in payouts {
                if let Some(record) = recorded.assets.iter_mut().find(|r| r.asset == *asset) {
                    record.balance = record.balance.saturating_sub(*payout);
                }
            }
        }
        self.state
            .events
            .push(LedgerEvent::Burn { pool, from, shares });
        for (asset, payout) in payouts {
            if !payout.is_zero() {
                self.move_asset(*asset, pool, to, *payout)?;
            }
        }
        Ok(())
    }
}
