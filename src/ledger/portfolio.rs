use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{Result, RouterError};

/// Holdings of one holder, keyed by asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    /// Map of assets to their balances
    pub holdings: HashMap<Address, U256>,
}

impl Portfolio {
    /// Portfolio holding `holdings`.
    #[must_use]
    pub const fn new(holdings: HashMap<Address, U256>) -> Self {
        Self { holdings }
    }

    /// Balance of `asset`, zero when never held.
    #[must_use]
    pub fn balance(&self, asset: &Address) -> U256 {
        self.holdings.get(asset).copied().unwrap_or_default()
    }

    /// Adds `amount` of `asset`.
    ///
    /// # Errors
    /// * [`RouterError::ArithmeticOverflow`] if the balance overflows
    pub fn credit(&mut self, asset: Address, amount: U256) -> Result<()> {
        let balance = self.holdings.entry(asset).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(RouterError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Removes `amount` of `asset`.
    ///
    /// # Errors
    /// * [`RouterError::Ledger`] if the balance is short
    pub fn debit(&mut self, asset: Address, amount: U256) -> Result<()> {
        let balance = self.balance(&asset);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            RouterError::ledger(format!(
                "insufficient balance of {asset}: {balance} < {amount}"
            ))
        })?;
        self.holdings.insert(asset, remaining);
        Ok(())
    }
}
