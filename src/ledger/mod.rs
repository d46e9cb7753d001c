//! Collaborator interfaces the router settles against.
//!
//! [`ReserveSource`] is everything planning reads. [`Ledger`] adds the writes an
//! executor performs, plus checkpoints so a failed operation leaves no trace.

/// In-memory ledger
pub mod memory;
/// Per-holder asset balances
pub mod portfolio;

use alloy::primitives::{Address, U256};

use crate::error::Result;
use crate::types::PoolState;

pub use memory::{LedgerEvent, MemoryLedger};
pub use portfolio::Portfolio;

/// Read side of the ledger.
pub trait ReserveSource {
    /// Current ledger time, compared against operation deadlines.
    fn timestamp(&self) -> u64;

    /// Reserves of a pair as `(reserve0, reserve1)` over its sorted assets.
    /// A pair that does not exist reports zero reserves.
    ///
    /// # Errors
    /// * If the reserves cannot be read
    fn reserves_of(&self, pair: Address) -> Result<(U256, U256)>;

    /// State of the weighted pool at `pool`.
    ///
    /// # Errors
    /// * [`crate::error::RouterError::UnknownPool`] if no pool lives there
    fn pool_state(&self, pool: Address) -> Result<PoolState>;
}

/// Write side of the ledger.
///
/// Atomicity across several writes comes from [`Ledger::checkpoint`] and
/// [`Ledger::revert_to`].
pub trait Ledger: ReserveSource {
    /// Opaque restore point
    type Checkpoint;

    /// Captures everything a failed operation must restore.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Restores the state captured by `checkpoint`, discarding every later write.
    fn revert_to(&mut self, checkpoint: Self::Checkpoint);

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    /// * If `from` holds less than `amount`
    fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: U256)
        -> Result<()>;

    /// Moves native value.
    ///
    /// # Errors
    /// * If `from` holds less than `amount` or `to` refuses native value
    fn transfer_native(&mut self, from: Address, to: Address, amount: U256) -> Result<()>;

    /// Turns native value of `holder` into wrapped native.
    ///
    /// # Errors
    /// * If `holder` holds less native value than `amount`
    fn wrap(&mut self, holder: Address, amount: U256) -> Result<()>;

    /// Turns wrapped native of `holder` into native value.
    ///
    /// # Errors
    /// * If `holder` holds less wrapped native than `amount`
    fn unwrap(&mut self, holder: Address, amount: U256) -> Result<()>;

    /// Pair swap paying the requested outputs to `to`. The input must already
    /// sit in the pair.
    ///
    /// # Errors
    /// * If the pair's fee-adjusted invariant would decrease
    fn swap(
        &mut self,
        pair: Address,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    ) -> Result<()>;

    /// Issues `shares` of `pool` to `to` against the deposits the pool holds
    /// beyond its recorded balances.
    ///
    /// # Errors
    /// * If the deposits do not pay for `shares`
    fn mint(&mut self, pool: Address, shares: U256, to: Address) -> Result<()>;

    /// Redeems `shares` held by `from` and pays `payouts` to `to`.
    ///
    /// # Errors
    /// * If `from` holds fewer shares or the shares do not pay for `payouts`
    fn burn(
        &mut self,
        pool: Address,
        from: Address,
        shares: U256,
        payouts: &[(Address, U256)],
        to: Address,
    ) -> Result<()>;
}
