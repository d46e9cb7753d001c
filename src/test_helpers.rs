use alloy::primitives::{Address, U256};

use crate::config::{Config, VenueConfig, Venues};
use crate::ledger::MemoryLedger;
use crate::math::fixed::BONE;
use crate::route::hop::{Hop, Venue};
use crate::types::{PoolAsset, PoolState};
use crate::utils::constants::{VENUE_A_INIT_CODE_HASH, VENUE_B_INIT_CODE_HASH};

/// Address whose low bytes spell out `label`
#[allow(dead_code)]
pub fn address_from_str(label: &str) -> Address {
    Address::left_padding_from(label.as_bytes())
}

/// `amount` whole units of an 18-decimal asset
#[allow(dead_code)]
pub fn ether(amount: u128) -> U256 {
    U256::from(amount) * BONE
}

/// Hop at the asset labelled `asset`
#[allow(dead_code)]
pub fn hop(asset: &str, venue: Venue) -> Hop {
    Hop {
        asset: address_from_str(asset),
        venue,
    }
}

/// Path `assets[0] -> assets[1] -> ...` where each leg runs on the venue
/// paired with its destination
#[allow(dead_code)]
pub fn hops(source: &str, legs: &[(&str, Venue)]) -> Vec<Hop> {
    let mut hops = vec![hop(source, Venue::A)];
    hops.extend(legs.iter().map(|(asset, venue)| hop(asset, *venue)));
    hops
}

/// Two assets `A` and `B` with 1000 units each, equal weights, 100 shares
/// outstanding, a 2.5% swap fee and a 0.5% exit fee
#[allow(dead_code)]
pub fn pool_state() -> PoolState {
    PoolState {
        address: address_from_str("POOL"),
        assets: ["A", "B"]
            .iter()
            .map(|asset| PoolAsset {
                asset: address_from_str(asset),
                balance: ether(1_000),
                weight: ether(10),
            })
            .collect(),
        total_shares: ether(100),
        swap_fee: BONE / U256::from(40),
        exit_fee: BONE / U256::from(200),
    }
}

/// Router, wrapped native and both venue factories at labelled addresses
#[allow(dead_code)]
pub fn config() -> Config {
    Config {
        router: address_from_str("ROUTER"),
        wrapped_native: address_from_str("WETH"),
        venues: Venues {
            a: VenueConfig {
                factory: address_from_str("FACTORY_A"),
                init_code_hash: VENUE_A_INIT_CODE_HASH,
            },
            b: VenueConfig {
                factory: address_from_str("FACTORY_B"),
                init_code_hash: VENUE_B_INIT_CODE_HASH,
            },
        },
    }
}

/// Ledger with the given pairs `(venue, token_a, token_b, reserve_a, reserve_b)`
#[allow(dead_code)]
pub fn ledger(pairs: &[(Venue, &str, &str, u128, u128)]) -> MemoryLedger {
    let config = config();
    let mut ledger = MemoryLedger::new(config.wrapped_native);
    for (venue, token_a, token_b, reserve_a, reserve_b) in pairs {
        let token_a = address_from_str(token_a);
        let token_b = address_from_str(token_b);
        ledger.add_pair(
            config.venues.pair_for(*venue, token_a, token_b),
            token_a,
            token_b,
            U256::from(*reserve_a),
            U256::from(*reserve_b),
        );
    }
    ledger
}
