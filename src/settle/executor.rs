use log::{trace, warn};

use crate::error::{Result, RouterError};
use crate::ledger::Ledger;
use crate::math::swap;
use crate::route::pair::sort_assets;
use crate::settle::plan::{Instruction, Plan, RefundAsset};

/// Applies plans to a ledger all or nothing.
pub struct Executor<'l, L: Ledger + ?Sized> {
    /// Ledger the plans are applied to
    ledger: &'l mut L,
}

impl<'l, L: Ledger + ?Sized> Executor<'l, L> {
    /// Wraps `ledger`.
    pub fn new(ledger: &'l mut L) -> Self {
        Self { ledger }
    }

    /// Applies every instruction of `plan` in order.
    ///
    /// On the first failure the ledger is reverted to where it stood before
    /// the plan and the error is returned.
    ///
    /// # Errors
    /// * [`RouterError::SettlementMismatch`] if a pair would pay less than planned
    /// * [`RouterError::RefundTransferFailed`] if a refund cannot be delivered
    /// * Any error the ledger reports
    pub fn execute<T>(&mut self, plan: &Plan<T>) -> Result<()> {
        let checkpoint = self.ledger.checkpoint();
        for (step, instruction) in plan.instructions().iter().enumerate() {
            trace!("step {step}: {instruction:?}");
            if let Err(err) = self.apply(instruction) {
                warn!("settlement failed at step {step}, reverting: {err}");
                self.ledger.revert_to(checkpoint);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Applies one instruction
    fn apply(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::ReceiveNative { from, to, amount }
            | Instruction::SendNative { from, to, amount } => {
                self.ledger.transfer_native(*from, *to, *amount)
            }
            Instruction::Wrap { holder, amount } => self.ledger.wrap(*holder, *amount),
            Instruction::Unwrap { holder, amount } => self.ledger.unwrap(*holder, *amount),
            Instruction::Transfer {
                asset,
                from,
                to,
                amount,
            } => self.ledger.transfer(*asset, *from, *to, *amount),
            Instruction::Swap { quote, to } => {
                let (reserve0, reserve1) = self.ledger.reserves_of(quote.pair)?;
                let (token0, _) = sort_assets(quote.asset_in, quote.asset_out);
                let (reserve_in, reserve_out) = if quote.asset_in == token0 {
                    (reserve0, reserve1)
                } else {
                    (reserve1, reserve0)
                };
                let live = swap::amount_out(quote.amount_in, reserve_in, reserve_out)?;
                if live < quote.amount_out {
                    return Err(RouterError::SettlementMismatch {
                        expected: quote.amount_out,
                        actual: live,
                    });
                }
                let (amount0_out, amount1_out) = quote.direction().amounts_out(quote.amount_out);
                self.ledger.swap(quote.pair, amount0_out, amount1_out, *to)
            }
            Instruction::Mint { pool, shares, to } => self.ledger.mint(*pool, *shares, *to),
            Instruction::Burn {
                pool,
                from,
                shares,
                payouts,
                to,
            } => self.ledger.burn(*pool, *from, *shares, payouts, *to),
            Instruction::Refund {
                asset,
                from,
                to,
                amount,
            } => {
                let delivered = match asset {
                    RefundAsset::Native => self.ledger.transfer_native(*from, *to, *amount),
                    RefundAsset::Token(token) => {
                        self.ledger.transfer(*token, *from, *to, *amount)
                    }
                };
                delivered.map_err(|_| RouterError::RefundTransferFailed {
                    recipient: *to,
                    amount: *amount,
                })
            }
        }
    }
}
