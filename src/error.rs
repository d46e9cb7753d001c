//! Error taxonomy shared by every routing, pool math and settlement operation.
//!
//! Any error aborts the whole operation. Nothing here is recovered locally.

use alloy::primitives::{Address, U256};
use derive_more::{Display, Error};

/// Result alias used across the crate.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Everything that can make a routing operation fail.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RouterError {
    /// The encoded path or intermediary list cannot be decoded or is unusable.
    #[display("malformed path: {reason}")]
    MalformedPath {
        /// What is wrong with the path
        reason: &'static str,
    },

    /// The path has no legs to dispatch.
    #[display("path exhausted: no legs to dispatch")]
    PathExhausted,

    /// One of the reserves of a pair is zero (or the pair does not exist).
    #[display("invalid reserves")]
    InvalidReserves,

    /// The requested output would drain the pair.
    #[display("insufficient liquidity")]
    InsufficientLiquidity,

    /// A zero amount was supplied where a positive one is required.
    #[display("insufficient amount")]
    InsufficientAmount,

    /// Weighted-pool math was asked to work outside of its domain.
    #[display("pool math domain error: {reason}")]
    PoolMathDomainError {
        /// Which precondition was violated
        reason: &'static str,
    },

    /// The computed amount is worse than the caller's bound.
    #[display("slippage exceeded: computed {actual}, bound {limit}")]
    SlippageExceeded {
        /// The caller supplied minimum output or maximum input
        limit: U256,
        /// The amount the operation would have settled
        actual: U256,
    },

    /// The operation was submitted after its expiry.
    #[display("deadline expired: {deadline} < {now}")]
    DeadlineExpired {
        /// The caller supplied deadline
        deadline: u64,
        /// The ledger time at execution
        now: u64,
    },

    /// Forwarding unspent value back to the caller failed.
    #[display("refund of {amount} to {recipient} failed")]
    RefundTransferFailed {
        /// Who the refund was addressed to
        recipient: Address,
        /// The refunded amount
        amount: U256,
    },

    /// A 256-bit intermediate value overflowed.
    #[display("arithmetic overflow")]
    ArithmeticOverflow,

    /// No pool is registered at the given address.
    #[display("unknown pool {pool}")]
    UnknownPool {
        /// Pool address that was looked up
        pool: Address,
    },

    /// Execution did not reproduce an amount computed during planning.
    #[display("settlement mismatch: planned {expected}, settled {actual}")]
    SettlementMismatch {
        /// Planned amount
        expected: U256,
        /// Amount reported by the ledger
        actual: U256,
    },

    /// The ledger rejected a settlement instruction.
    #[display("ledger rejected instruction: {reason}")]
    Ledger {
        /// Reason reported by the ledger
        reason: String,
    },
}

impl RouterError {
    /// Shorthand for [`RouterError::MalformedPath`].
    #[must_use]
    pub const fn malformed(reason: &'static str) -> Self {
        Self::MalformedPath { reason }
    }

    /// Shorthand for [`RouterError::PoolMathDomainError`].
    #[must_use]
    pub const fn domain(reason: &'static str) -> Self {
        Self::PoolMathDomainError { reason }
    }

    /// Shorthand for [`RouterError::Ledger`].
    #[must_use]
    pub fn ledger(reason: impl Into<String>) -> Self {
        Self::Ledger {
            reason: reason.into(),
        }
    }
}
