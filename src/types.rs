use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};

/// Reserves of a two-asset pair oriented along the direction of a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservePair {
    /// Reserve of the asset flowing into the pair
    pub reserve_in: U256,
    /// Reserve of the asset flowing out of the pair
    pub reserve_out: U256,
}

/// One asset bound to a weighted pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAsset {
    /// Asset identifier
    pub asset: Address,
    /// Pool balance of the asset
    pub balance: U256,
    /// Denormalized weight of the asset
    pub weight: U256,
}

/// Weighted pool as read from the ledger at the start of an operation
///
/// Fees are 18-decimal fractions of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Address of the pool, which is also the identifier of its share asset
    pub address: Address,
    /// Bound assets in pool order
    pub assets: Vec<PoolAsset>,
    /// Outstanding pool shares
    pub total_shares: U256,
    /// Swap fee charged on the trading part of single-asset joins and exits
    pub swap_fee: U256,
    /// Exit fee charged on redeemed shares
    pub exit_fee: U256,
}

impl PoolState {
    /// Position of `asset` in pool order.
    #[must_use]
    pub fn position(&self, asset: Address) -> Option<usize> {
        self.assets.iter().position(|record| record.asset == asset)
    }

    /// Returns the record of a bound asset.
    ///
    /// # Errors
    /// * [`RouterError::PoolMathDomainError`] if the asset is not bound to the pool
    pub fn record(&self, asset: Address) -> Result<&PoolAsset> {
        self.assets
            .iter()
            .find(|record| record.asset == asset)
            .ok_or(RouterError::domain("asset is not bound to the pool"))
    }

    /// Sum of the denormalized weights.
    #[must_use]
    pub fn total_weight(&self) -> U256 {
        self.assets
            .iter()
            .fold(U256::ZERO, |total, record| total.saturating_add(record.weight))
    }

    /// Bound asset identifiers in pool order.
    pub fn asset_ids(&self) -> impl Iterator<Item = Address> + '_ {
        self.assets.iter().map(|record| record.asset)
    }
}
