use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::route::quote::SwapQuote;

/// Which asset a refund is paid in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefundAsset {
    /// Native value
    Native,
    /// A ledger asset
    Token(Address),
}

/// One settlement step against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    /// Native value attached to the call moves to the router
    ReceiveNative {
        /// Caller
        from: Address,
        /// Router holder
        to: Address,
        /// Attached value
        amount: U256,
    },
    /// Native value of `holder` becomes wrapped native
    Wrap {
        /// Holder of the native value
        holder: Address,
        /// Amount wrapped
        amount: U256,
    },
    /// Wrapped native of `holder` becomes native value
    Unwrap {
        /// Holder of the wrapped native
        holder: Address,
        /// Amount unwrapped
        amount: U256,
    },
    /// Plain asset transfer
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
    /// Pair swap paying `quote.amount_out` to `to`
    Swap {
        /// Planned leg
        quote: SwapQuote,
        /// Receiver of the output
        to: Address,
    },
    /// Pool issues `shares` against the deposits it holds
    Mint {
        /// Pool
        pool: Address,
        /// Shares issued
        shares: U256,
        /// Receiver of the shares
        to: Address,
    },
    /// Pool redeems `shares` of `from` for `payouts`
    Burn {
        /// Pool
        pool: Address,
        /// Holder of the shares
        from: Address,
        /// Shares redeemed
        shares: U256,
        /// Assets paid out, in pool order
        payouts: Vec<(Address, U256)>,
        /// Receiver of the payouts
        to: Address,
    },
    /// Native value sent to the recipient of the operation
    SendNative {
        /// Payer
        from: Address,
        /// Payee
        to: Address,
        /// Amount sent
        amount: U256,
    },
    /// Unspent value returned to the caller, attempted once
    Refund {
        /// Asset of the refund
        asset: RefundAsset,
        /// Payer
        from: Address,
        /// Payee
        to: Address,
        /// Amount refunded
        amount: U256,
    },
}

/// Settlement instructions of one operation and the amounts it reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan<T> {
    /// Instructions in settlement order
    instructions: Vec<Instruction>,
    /// Amounts reported once the plan settles
    outcome: T,
}

impl<T> Plan<T> {
    /// Instructions in settlement order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Amounts the operation reports once settled.
    #[must_use]
    pub const fn outcome(&self) -> &T {
        &self.outcome
    }

    /// Consumes the plan, keeping its outcome.
    #[must_use]
    pub fn into_outcome(self) -> T {
        self.outcome
    }
}

/// Accumulates instructions without touching any ledger.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    /// Instructions in settlement order
    instructions: Vec<Instruction>,
}

impl PlanBuilder {
    /// Empty plan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    /// Moves attached native value from the caller to the router.
    pub fn receive_native(&mut self, from: Address, to: Address, amount: U256) {
        self.instructions
            .push(Instruction::ReceiveNative { from, to, amount });
    }

    /// Wraps native value held by `holder`.
    pub fn wrap(&mut self, holder: Address, amount: U256) {
        self.instructions.push(Instruction::Wrap { holder, amount });
    }

    /// Unwraps wrapped native held by `holder`.
    pub fn unwrap(&mut self, holder: Address, amount: U256) {
        self.instructions.push(Instruction::Unwrap { holder, amount });
    }

    /// Moves `amount` of `asset`.
    pub fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: U256) {
        self.instructions.push(Instruction::Transfer {
            asset,
            from,
            to,
            amount,
        });
    }

    /// Executes one quoted leg, paying its output to `to`.
    pub fn swap(&mut self, quote: &SwapQuote, to: Address) {
        self.instructions.push(Instruction::Swap {
            quote: quote.clone(),
            to,
        });
    }

    /// Issues `shares` against what the pool received.
    pub fn mint(&mut self, pool: Address, shares: U256, to: Address) {
        self.instructions
            .push(Instruction::Mint { pool, shares, to });
    }

    /// Redeems `shares` held by `from` for `payouts`, paid to `to`.
    pub fn burn(
        &mut self,
        pool: Address,
        from: Address,
        shares: U256,
        payouts: Vec<(Address, U256)>,
        to: Address,
    ) {
        self.instructions.push(Instruction::Burn {
            pool,
            from,
            shares,
            payouts,
            to,
        });
    }

    /// Pays native value out.
    pub fn send_native(&mut self, from: Address, to: Address, amount: U256) {
        self.instructions
            .push(Instruction::SendNative { from, to, amount });
    }

    /// Adds a refund unless `amount` is zero.
    pub fn refund(&mut self, asset: RefundAsset, from: Address, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        self.instructions.push(Instruction::Refund {
            asset,
            from,
            to,
            amount,
        });
    }

    /// Seals the plan with the amounts the operation reports.
    #[must_use]
    pub fn finish<T>(self, outcome: T) -> Plan<T> {
        Plan {
            instructions: self.instructions,
            outcome,
        }
    }
}
