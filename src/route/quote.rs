use std::fmt::{self, Debug, Display};

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::error::{Result, RouterError};
use crate::route::hop::Venue;
use crate::settle::plan::PlanBuilder;

/// The direction of a swap in a pair.
///
/// A pair stores its assets sorted as token0 and token1, so a leg either sells
/// token0 for token1 or the reverse.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub enum Direction {
    /// Swap from token0 to token1 in the pair
    ZeroForOne,
    /// Swap from token1 to token0 in the pair
    OneForZero,
}

impl Direction {
    /// Direction of a leg selling `asset_in` for `asset_out`.
    #[must_use]
    pub fn of(asset_in: Address, asset_out: Address) -> Self {
        if asset_in < asset_out {
            Self::ZeroForOne
        } else {
            Self::OneForZero
        }
    }

    /// The `(amount0_out, amount1_out)` pair call arguments for `amount_out`.
    #[must_use]
    pub const fn amounts_out(self, amount_out: U256) -> (U256, U256) {
        match self {
            Self::ZeroForOne => (U256::ZERO, amount_out),
            Self::OneForZero => (amount_out, U256::ZERO),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroForOne => write!(f, "0>1"),
            Self::OneForZero => write!(f, "1>0"),
        }
    }
}

/// Amounts of one leg of a route
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SwapQuote {
    /// Pair executing the leg
    pub pair: Address,
    /// Venue of the pair
    pub venue: Venue,
    /// Asset sold into the pair
    pub asset_in: Address,
    /// Asset bought from the pair
    pub asset_out: Address,
    /// Amount sold
    pub amount_in: U256,
    /// Amount bought
    pub amount_out: U256,
}

impl SwapQuote {
    /// Direction of the leg within its pair.
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::of(self.asset_in, self.asset_out)
    }
}

impl Debug for SwapQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            // Quote(0xab.. on B 0>1, 100 -> 181)
            "Quote({} on {} {:?}, {} -> {})",
            self.pair,
            self.venue,
            self.direction(),
            self.amount_in,
            self.amount_out
        )
    }
}

/// Quotes of every leg of one route, in route order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteQuote {
    /// The quotes for each leg of the route
    swap_quotes: Vec<SwapQuote>,
}

impl RouteQuote {
    /// Wraps the leg quotes of a route.
    ///
    /// # Errors
    /// * [`RouterError::PathExhausted`] if there are no legs
    pub fn new(swap_quotes: Vec<SwapQuote>) -> Result<Self> {
        if swap_quotes.is_empty() {
            return Err(RouterError::PathExhausted);
        }
        Ok(Self { swap_quotes })
    }

    /// Leg quotes in route order.
    #[must_use]
    pub fn swap_quotes(&self) -> &[SwapQuote] {
        &self.swap_quotes
    }

    /// Amount sold into the first leg.
    #[must_use]
    pub fn amount_in(&self) -> U256 {
        self.swap_quotes
            .first()
            .map_or(U256::ZERO, |quote| quote.amount_in)
    }

    /// Amount bought from the last leg.
    #[must_use]
    pub fn amount_out(&self) -> U256 {
        self.swap_quotes
            .last()
            .map_or(U256::ZERO, |quote| quote.amount_out)
    }

    /// The input followed by the output of every leg.
    #[must_use]
    pub fn amounts(&self) -> Vec<U256> {
        std::iter::once(self.amount_in())
            .chain(self.swap_quotes.iter().map(|quote| quote.amount_out))
            .collect()
    }

    /// Appends the settlement of the route: `source` funds the first pair,
    /// each pair pays the next one and the last pays `recipient`.
    pub fn settle(&self, plan: &mut PlanBuilder, source: Address, recipient: Address) {
        let Some(first) = self.swap_quotes.first() else {
            return;
        };
        plan.transfer(first.asset_in, source, first.pair, first.amount_in);

        for (index, quote) in self.swap_quotes.iter().enumerate() {
            let to = self
                .swap_quotes
                .get(index + 1)
                .map_or(recipient, |next| next.pair);
            plan.swap(quote, to);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settle::plan::Instruction;
    use crate::test_helpers::address_from_str;

    fn quote(pair: &str, asset_in: &str, asset_out: &str, amount_in: u64, amount_out: u64) -> SwapQuote {
        SwapQuote {
            pair: address_from_str(pair),
            venue: Venue::A,
            asset_in: address_from_str(asset_in),
            asset_out: address_from_str(asset_out),
            amount_in: U256::from(amount_in),
            amount_out: U256::from(amount_out),
        }
    }

    #[test]
    fn test_direction() {
        let (a, b) = (address_from_str("A"), address_from_str("B"));
        assert_eq!(Direction::of(a, b), Direction::ZeroForOne);
        assert_eq!(Direction::of(b, a), Direction::OneForZero);
        assert_eq!(
            Direction::ZeroForOne.amounts_out(U256::from(5)),
            (U256::ZERO, U256::from(5))
        );
        assert_eq!(Direction::OneForZero.to_string(), "1>0");
    }

    #[test]
    fn test_empty_route() {
        assert_eq!(RouteQuote::new(Vec::new()), Err(RouterError::PathExhausted));
    }

    #[test]
    fn test_amounts() {
        let route = RouteQuote::new(vec![
            quote("F1", "A", "B", 10, 18),
            quote("F2", "B", "C", 18, 5),
        ])
        .unwrap();
        assert_eq!(route.amount_in(), U256::from(10));
        assert_eq!(route.amount_out(), U256::from(5));
        assert_eq!(
            route.amounts(),
            vec![U256::from(10), U256::from(18), U256::from(5)]
        );
    }

    #[test]
    fn test_settle_chains_pairs() {
        let route = RouteQuote::new(vec![
            quote("F1", "A", "B", 10, 18),
            quote("F2", "B", "C", 18, 5),
        ])
        .unwrap();
        let (sender, recipient) = (address_from_str("S"), address_from_str("R"));
        let mut plan = PlanBuilder::new();
        route.settle(&mut plan, sender, recipient);
        let plan = plan.finish(());

        assert_eq!(
            plan.instructions(),
            &[
                Instruction::Transfer {
                    asset: address_from_str("A"),
                    from: sender,
                    to: address_from_str("F1"),
                    amount: U256::from(10),
                },
                Instruction::Swap {
                    quote: quote("F1", "A", "B", 10, 18),
                    to: address_from_str("F2"),
                },
                Instruction::Swap {
                    quote: quote("F2", "B", "C", 18, 5),
                    to: recipient,
                },
            ]
        );
    }
}
