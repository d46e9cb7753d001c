use std::path::Path;

use alloy::primitives::{Address, U256};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::ledger::MemoryLedger;
use crate::route::hop::Venue;
use crate::types::PoolState;

/// A constant-product pair as listed in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSnapshot {
    /// Venue the pair lives on
    pub venue: Venue,
    /// One asset of the pair
    pub token_a: Address,
    /// The other asset of the pair
    pub token_b: Address,
    /// Reserve of `token_a`
    pub reserve_a: U256,
    /// Reserve of `token_b`
    pub reserve_b: U256,
}

/// An asset balance of one holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Holder
    pub holder: Address,
    /// Asset held, `None` for native value
    #[serde(default)]
    pub asset: Option<Address>,
    /// Amount held
    pub amount: U256,
}

/// Market state to quote and simulate against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Ledger time
    #[serde(default)]
    pub timestamp: u64,
    /// Pairs on both venues
    #[serde(default)]
    pub pairs: Vec<PairSnapshot>,
    /// Weighted pools
    #[serde(default)]
    pub pools: Vec<PoolState>,
    /// Holder balances
    #[serde(default)]
    pub balances: Vec<BalanceSnapshot>,
}

impl MarketSnapshot {
    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    /// * If the file cannot be read or is not a valid snapshot
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_str(&raw).wrap_err("parsing snapshot")
    }

    /// Loads the snapshot into a fresh in-memory ledger. Pair addresses are
    /// derived from the venues of `config`.
    #[must_use]
    pub fn into_ledger(self, config: &Config) -> MemoryLedger {
        let mut ledger = MemoryLedger::new(config.wrapped_native);
        ledger.set_timestamp(self.timestamp);
        for pair in self.pairs {
            ledger.add_pair(
                config
                    .venues
                    .pair_for(pair.venue, pair.token_a, pair.token_b),
                pair.token_a,
                pair.token_b,
                pair.reserve_a,
                pair.reserve_b,
            );
        }
        for pool in self.pools {
            ledger.add_pool(pool);
        }
        for balance in self.balances {
            match balance.asset {
                Some(asset) => ledger.mint_balance(balance.holder, asset, balance.amount),
                None => ledger.credit_native(balance.holder, balance.amount),
            }
        }
        ledger
    }
}
