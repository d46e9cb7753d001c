use std::fmt::{self, Display};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// One of the two constant-product venues a leg can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Venue {
    /// Selected by a zero flag byte
    A,
    /// Selected by any nonzero flag byte
    B,
}

impl Venue {
    /// Resolves a flag byte.
    #[must_use]
    pub const fn from_flag(flag: u8) -> Self {
        if flag == 0 {
            Self::A
        } else {
            Self::B
        }
    }

    /// Canonical flag byte of the venue.
    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// One position of a path.
///
/// The venue of a hop selects the venue of the leg that ends at the hop. The
/// venue of the first hop is not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    /// Asset held at this position
    pub asset: Address,
    /// Venue of the leg arriving here
    pub venue: Venue,
}

impl Hop {
    /// Creates a hop.
    #[must_use]
    pub const fn new(asset: Address, venue: Venue) -> Self {
        Self { asset, venue }
    }
}

/// Route between an outer asset and one asset of the pool in an all-asset
/// operation.
///
/// Legs are numbered in flow order: a join flows from the funding asset into
/// the pool asset, an exit from the pool asset into the target. Without an
/// intermediate asset the route is a single leg on `previous_venue`. With one
/// it is two legs, the first on `previous_venue` and the second on
/// `next_venue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intermediary {
    /// Venue of the first leg in flow order
    pub previous_venue: Venue,
    /// Optional asset routed through
    pub asset: Option<Address>,
    /// Venue of the second leg in flow order
    pub next_venue: Venue,
}

impl Intermediary {
    /// Hops from `funding` into `pool_asset` for a join. Empty when the pool
    /// asset is the funding asset itself.
    #[must_use]
    pub fn path_for_mint(&self, funding: Address, pool_asset: Address) -> Vec<Hop> {
        if funding == pool_asset {
            return Vec::new();
        }
        match self.asset {
            None => vec![
                Hop::new(funding, self.previous_venue),
                Hop::new(pool_asset, self.previous_venue),
            ],
            Some(middle) => vec![
                Hop::new(funding, self.previous_venue),
                Hop::new(middle, self.previous_venue),
                Hop::new(pool_asset, self.next_venue),
            ],
        }
    }

    /// Hops from `pool_asset` into `target` for an exit. Empty when the pool
    /// asset is the target itself.
    #[must_use]
    pub fn path_for_burn(&self, pool_asset: Address, target: Address) -> Vec<Hop> {
        if pool_asset == target {
            return Vec::new();
        }
        match self.asset {
            None => vec![
                Hop::new(pool_asset, self.previous_venue),
                Hop::new(target, self.previous_venue),
            ],
            Some(middle) => vec![
                Hop::new(pool_asset, self.previous_venue),
                Hop::new(middle, self.previous_venue),
                Hop::new(target, self.next_venue),
            ],
        }
    }
}
