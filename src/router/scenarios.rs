//! End-to-end settlements against the in-memory ledger.

#![allow(clippy::unwrap_used)]

use alloy::primitives::{Address, U256};

use super::{Call, Router};
use crate::error::RouterError;
use crate::ledger::{MemoryLedger, ReserveSource};
use crate::math::{swap, weighted};
use crate::route::codec::{encode_intermediaries, Path};
use crate::route::hop::{Intermediary, Venue};
use crate::test_helpers::{address_from_str, config, ether, hops, ledger, pool_state};

struct Market {
    router: Router,
    ledger: MemoryLedger,
    call: Call,
    pool: Address,
}

fn market() -> Market {
    let router = Router::new(&config());
    let reserve = 1_000 * 10u128.pow(18);
    let mut ledger = ledger(&[
        (Venue::A, "A", "B", reserve, reserve),
        (Venue::B, "B", "C", reserve, reserve),
        (Venue::A, "WETH", "A", reserve, reserve),
        (Venue::B, "WETH", "B", reserve, reserve),
    ]);
    let pool = pool_state();
    let sender = address_from_str("S");
    ledger.add_pool(pool.clone());
    ledger.mint_balance(sender, address_from_str("A"), ether(10));
    ledger.mint_balance(sender, address_from_str("B"), ether(10));
    ledger.mint_balance(sender, pool.address, ether(10));
    ledger.credit_native(sender, ether(100));
    Market {
        router,
        ledger,
        call: Call::new(sender, address_from_str("R"), 10),
        pool: pool.address,
    }
}

fn path(source: &str, legs: &[(&str, Venue)]) -> Vec<u8> {
    Path::new(hops(source, legs)).unwrap().encode()
}

fn direct(venues: &[Venue]) -> Vec<u8> {
    encode_intermediaries(
        &venues
            .iter()
            .map(|venue| Intermediary {
                previous_venue: *venue,
                asset: None,
                next_venue: *venue,
            })
            .collect::<Vec<_>>(),
    )
}

impl Market {
    /// Every asset the router could be left holding
    fn router_is_empty(&self) -> bool {
        let router = self.router.address();
        ["A", "B", "C", "WETH"]
            .iter()
            .all(|asset| self.ledger.balance_of(router, address_from_str(asset)).is_zero())
            && self.ledger.balance_of(router, self.pool).is_zero()
            && self.ledger.native_balance(router).is_zero()
    }
}

#[test]
fn test_two_venue_swap_moves_assets_pair_to_pair() {
    let mut market = market();
    let (a, b, c) = (address_from_str("A"), address_from_str("B"), address_from_str("C"));
    let path = path("A", &[("B", Venue::A), ("C", Venue::B)]);

    let amounts = market
        .router
        .swap_exact_tokens_for_tokens(&mut market.ledger, &market.call, ether(1), U256::ZERO, &path)
        .unwrap();

    let ab = market.router.venues.pair_for(Venue::A, a, b);
    let bc = market.router.venues.pair_for(Venue::B, b, c);
    assert_eq!(
        market.ledger.transfers(),
        vec![
            (a, market.call.sender, ab, ether(1)),
            (b, ab, bc, amounts[1]),
            (c, bc, market.call.recipient, amounts[2]),
        ]
    );
    assert_eq!(market.ledger.balance_of(market.call.sender, a), ether(9));
    assert_eq!(market.ledger.balance_of(market.call.recipient, c), amounts[2]);
    assert!(market.router_is_empty());
}

#[test]
fn test_slippage_leaves_the_ledger_untouched() {
    let mut market = market();
    let path = path("A", &[("B", Venue::A), ("C", Venue::B)]);
    let quoted = market
        .router
        .get_amounts_out(&market.ledger, ether(1), &path)
        .unwrap();

    let result = market.router.swap_exact_tokens_for_tokens(
        &mut market.ledger,
        &market.call,
        ether(1),
        quoted[2] + U256::from(1),
        &path,
    );

    assert_eq!(
        result,
        Err(RouterError::SlippageExceeded {
            limit: quoted[2] + U256::from(1),
            actual: quoted[2],
        })
    );
    assert!(market.ledger.events().is_empty());
    assert_eq!(
        market.ledger.balance_of(market.call.sender, address_from_str("A")),
        ether(10)
    );
}

#[test]
fn test_rejected_refund_rolls_back_the_swap() {
    let mut market = market();
    let path = path("WETH", &[("A", Venue::A)]);
    let amount_in = market
        .router
        .get_amounts_in(&market.ledger, ether(1), &path)
        .unwrap()[0];
    market.ledger.reject_native(market.call.sender);

    let result = market.router.swap_eth_for_exact_tokens(
        &mut market.ledger,
        &market.call,
        ether(50),
        ether(1),
        &path,
    );

    assert_eq!(
        result,
        Err(RouterError::RefundTransferFailed {
            recipient: market.call.sender,
            amount: ether(50) - amount_in,
        })
    );
    assert!(market.ledger.events().is_empty());
    assert_eq!(market.ledger.native_balance(market.call.sender), ether(100));
    assert!(market.ledger.balance_of(market.call.recipient, address_from_str("A")).is_zero());
}

#[test]
fn test_native_exact_out_refunds_the_unused_value() {
    let mut market = market();
    let path = path("WETH", &[("A", Venue::A)]);

    let amounts = market
        .router
        .swap_eth_for_exact_tokens(&mut market.ledger, &market.call, ether(50), ether(1), &path)
        .unwrap();

    assert_eq!(
        market.ledger.native_balance(market.call.sender),
        ether(100) - amounts[0]
    );
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, address_from_str("A")),
        ether(1)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_single_asset_join_and_exit() {
    let mut market = market();
    let (a, b) = (address_from_str("A"), address_from_str("B"));
    let (sender, recipient) = (market.call.sender, market.call.recipient);

    let shares = market
        .router
        .swap_exact_tokens_for_tokens_and_mint(
            &mut market.ledger,
            &market.call,
            ether(10),
            U256::ZERO,
            market.pool,
            &path("B", &[("A", Venue::A)]),
        )
        .unwrap();

    assert_eq!(market.ledger.balance_of(recipient, market.pool), shares);
    let joined = market.ledger.pool_state(market.pool).unwrap();
    assert_eq!(joined.total_shares, ether(100) + shares);
    assert_eq!(joined.record(a).unwrap().balance, market.ledger.balance_of(market.pool, a));
    assert!(market.router_is_empty());

    let exit = Call::new(recipient, sender, 10);
    let amount_out = market
        .router
        .burn_exact_and_swap_for_tokens(
            &mut market.ledger,
            &exit,
            shares,
            U256::ZERO,
            market.pool,
            &path("A", &[("B", Venue::A)]),
        )
        .unwrap();

    // Two venue fees and the pool fees are lost on the round trip
    assert!(amount_out < ether(10));
    assert_eq!(market.ledger.balance_of(sender, b), amount_out);
    assert!(market.ledger.balance_of(recipient, market.pool).is_zero());
    assert_eq!(
        market.ledger.pool_state(market.pool).unwrap().total_shares,
        ether(100)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_native_mint_exact_and_burn_for_exact_native() {
    let mut market = market();
    let (sender, recipient) = (market.call.sender, market.call.recipient);

    let amount_in = market
        .router
        .swap_eth_for_tokens_and_mint_exact(
            &mut market.ledger,
            &market.call,
            ether(50),
            ether(1),
            market.pool,
            &path("WETH", &[("A", Venue::A)]),
        )
        .unwrap();
    assert_eq!(market.ledger.native_balance(sender), ether(100) - amount_in);
    assert_eq!(market.ledger.balance_of(recipient, market.pool), ether(1));
    assert!(market.router_is_empty());

    let shares = market
        .router
        .burn_and_swap_for_exact_eth(
            &mut market.ledger,
            &market.call,
            ether(1),
            ether(10),
            market.pool,
            &path("A", &[("WETH", Venue::A)]),
        )
        .unwrap();
    assert_eq!(market.ledger.native_balance(recipient), ether(1));
    assert_eq!(market.ledger.balance_of(sender, market.pool), ether(10) - shares);
    assert!(market.router_is_empty());
}

#[test]
fn test_all_asset_native_join_refunds_exactly() {
    let mut market = market();
    let sender = market.call.sender;

    let outcome = market
        .router
        .swap_eth_for_all_tokens_and_mint_exact(
            &mut market.ledger,
            &market.call,
            ether(100),
            ether(1),
            market.pool,
            &direct(&[Venue::A, Venue::B]),
        )
        .unwrap();

    assert_eq!(outcome.amount_in + outcome.refund, ether(100));
    assert_eq!(market.ledger.native_balance(sender), outcome.refund);
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, market.pool),
        ether(1)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_all_asset_exit_into_a_pool_asset() {
    let mut market = market();
    let a = address_from_str("A");

    let amount_out = market
        .router
        .burn_for_all_tokens_and_swap_for_tokens(
            &mut market.ledger,
            &market.call,
            ether(1),
            &[U256::ZERO, U256::ZERO],
            a,
            U256::ZERO,
            market.pool,
            &direct(&[Venue::A, Venue::A]),
        )
        .unwrap();

    // A is paid out directly, B is swapped into A on venue A
    assert!(amount_out > ether(10));
    assert!(amount_out < ether(20));
    assert_eq!(market.ledger.balance_of(market.call.recipient, a), amount_out);
    assert_eq!(
        market.ledger.balance_of(market.call.sender, market.pool),
        ether(9)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_all_asset_exit_into_native() {
    let mut market = market();

    let amount_out = market
        .router
        .burn_for_all_tokens_and_swap_for_eth(
            &mut market.ledger,
            &market.call,
            ether(1),
            &[U256::ZERO, U256::ZERO],
            U256::ZERO,
            market.pool,
            &direct(&[Venue::A, Venue::B]),
        )
        .unwrap();

    assert_eq!(market.ledger.native_balance(market.call.recipient), amount_out);
    assert!(market.router_is_empty());
}

/// Reserve of every fixture pair
fn reserve() -> U256 {
    ether(1_000)
}

#[test]
fn test_all_asset_join_through_a_shared_pair() {
    let mut market = market();
    let (weth, a) = (address_from_str("WETH"), address_from_str("A"));
    let sender = market.call.sender;
    market.ledger.mint_balance(sender, weth, ether(100));
    // A straight from WETH on venue A; B from WETH through A, both legs on venue A
    let intermediaries = encode_intermediaries(&[
        Intermediary {
            previous_venue: Venue::A,
            asset: None,
            next_venue: Venue::A,
        },
        Intermediary {
            previous_venue: Venue::A,
            asset: Some(a),
            next_venue: Venue::A,
        },
    ]);

    let outcome = market
        .router
        .swap_tokens_for_all_tokens_and_mint_exact(
            &mut market.ledger,
            &market.call,
            weth,
            ether(100),
            ether(1),
            market.pool,
            &intermediaries,
        )
        .unwrap();

    let deposit = ether(10);
    let weth_for_a = swap::amount_in(deposit, reserve(), reserve()).unwrap();
    let a_for_b = swap::amount_in(deposit, reserve(), reserve()).unwrap();
    // The second purchase on WETH/A sees the reserves the first one left
    let weth_for_b =
        swap::amount_in(a_for_b, reserve() + weth_for_a, reserve() - deposit).unwrap();
    assert_eq!(outcome.amount_in, weth_for_a + weth_for_b);
    assert_eq!(outcome.amount_in, U256::from(20_607_139_780_030_076_132u128));
    assert_eq!(outcome.refund, ether(100) - outcome.amount_in);
    assert_eq!(market.ledger.balance_of(sender, weth), outcome.refund);
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, market.pool),
        ether(1)
    );
    let pool = market.ledger.pool_state(market.pool).unwrap();
    assert_eq!(pool.total_shares, ether(101));
    assert!(pool.assets.iter().all(|record| record.balance == ether(1_010)));
    assert!(market.router_is_empty());
}

#[test]
fn test_all_asset_join_funded_by_a_pool_asset() {
    let mut market = market();
    let a = address_from_str("A");
    let sender = market.call.sender;
    market.ledger.mint_balance(sender, a, ether(40));

    let outcome = market
        .router
        .swap_tokens_for_all_tokens_and_mint_exact(
            &mut market.ledger,
            &market.call,
            a,
            ether(30),
            ether(1),
            market.pool,
            &direct(&[Venue::A, Venue::A]),
        )
        .unwrap();

    // A is deposited as is, only B is bought
    let a_for_b = swap::amount_in(ether(10), reserve(), reserve()).unwrap();
    assert_eq!(outcome.amount_in, ether(10) + a_for_b);
    assert_eq!(outcome.amount_in, U256::from(20_131_404_313_951_956_881u128));
    assert_eq!(outcome.refund, ether(30) - outcome.amount_in);
    assert_eq!(market.ledger.balance_of(sender, a), ether(50) - outcome.amount_in);
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, market.pool),
        ether(1)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_exact_out_token_swap() {
    let mut market = market();
    let (a, b) = (address_from_str("A"), address_from_str("B"));

    let amounts = market
        .router
        .swap_tokens_for_exact_tokens(
            &mut market.ledger,
            &market.call,
            ether(1),
            ether(10),
            &path("A", &[("B", Venue::A)]),
        )
        .unwrap();

    assert_eq!(
        amounts,
        vec![swap::amount_in(ether(1), reserve(), reserve()).unwrap(), ether(1)]
    );
    assert_eq!(market.ledger.balance_of(market.call.recipient, b), ether(1));
    assert_eq!(market.ledger.balance_of(market.call.sender, a), ether(10) - amounts[0]);
    assert!(market.router_is_empty());
}

#[test]
fn test_exact_native_in_swap() {
    let mut market = market();

    let amounts = market
        .router
        .swap_exact_eth_for_tokens(
            &mut market.ledger,
            &market.call,
            ether(1),
            U256::ZERO,
            &path("WETH", &[("B", Venue::B)]),
        )
        .unwrap();

    assert_eq!(
        amounts,
        vec![ether(1), swap::amount_out(ether(1), reserve(), reserve()).unwrap()]
    );
    assert_eq!(market.ledger.native_balance(market.call.sender), ether(99));
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, address_from_str("B")),
        amounts[1]
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_swaps_paying_out_native() {
    let mut market = market();
    let a = address_from_str("A");
    let (sender, recipient) = (market.call.sender, market.call.recipient);
    let into_native = path("A", &[("WETH", Venue::A)]);

    let exact_in = market
        .router
        .swap_exact_tokens_for_eth(&mut market.ledger, &market.call, ether(1), U256::ZERO, &into_native)
        .unwrap();
    assert_eq!(
        exact_in[1],
        swap::amount_out(ether(1), reserve(), reserve()).unwrap()
    );
    assert_eq!(market.ledger.native_balance(recipient), exact_in[1]);
    assert!(market.router_is_empty());

    let exact_out = market
        .router
        .swap_tokens_for_exact_eth(&mut market.ledger, &market.call, ether(1), ether(5), &into_native)
        .unwrap();
    // The second swap prices against the reserves the first one left
    assert_eq!(
        exact_out[0],
        swap::amount_in(ether(1), reserve() + ether(1), reserve() - exact_in[1]).unwrap()
    );
    assert_eq!(market.ledger.native_balance(recipient), exact_in[1] + ether(1));
    assert_eq!(
        market.ledger.balance_of(sender, a),
        ether(9) - exact_out[0]
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_exact_native_join() {
    let mut market = market();

    let shares = market
        .router
        .swap_exact_eth_for_tokens_and_mint(
            &mut market.ledger,
            &market.call,
            ether(5),
            U256::ZERO,
            market.pool,
            &path("WETH", &[("A", Venue::A)]),
        )
        .unwrap();

    let deposit = swap::amount_out(ether(5), reserve(), reserve()).unwrap();
    let pool = pool_state();
    assert_eq!(
        shares,
        weighted::pool_shares_out_given_single_asset_in(&pool, address_from_str("A"), deposit)
            .unwrap()
    );
    assert_eq!(market.ledger.native_balance(market.call.sender), ether(95));
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, market.pool),
        shares
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_join_for_exact_shares_with_tokens() {
    let mut market = market();
    let pool = pool_state();

    let amount_in = market
        .router
        .swap_tokens_for_tokens_and_mint_exact(
            &mut market.ledger,
            &market.call,
            ether(1),
            ether(10),
            market.pool,
            &path("B", &[("A", Venue::A)]),
        )
        .unwrap();

    let deposit =
        weighted::single_asset_in_given_pool_shares_out(&pool, address_from_str("A"), ether(1))
            .unwrap();
    assert_eq!(
        amount_in,
        swap::amount_in(deposit, reserve(), reserve()).unwrap()
    );
    assert_eq!(
        market.ledger.balance_of(market.call.sender, address_from_str("B")),
        ether(10) - amount_in
    );
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, market.pool),
        ether(1)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_exact_exit_into_native() {
    let mut market = market();
    let pool = pool_state();

    let amount_out = market
        .router
        .burn_exact_and_swap_for_eth(
            &mut market.ledger,
            &market.call,
            ether(1),
            U256::ZERO,
            market.pool,
            &path("A", &[("WETH", Venue::A)]),
        )
        .unwrap();

    let redeemed =
        weighted::single_asset_out_given_pool_shares_in(&pool, address_from_str("A"), ether(1))
            .unwrap();
    assert_eq!(
        amount_out,
        swap::amount_out(redeemed, reserve(), reserve()).unwrap()
    );
    assert_eq!(market.ledger.native_balance(market.call.recipient), amount_out);
    assert_eq!(
        market.ledger.balance_of(market.call.sender, market.pool),
        ether(9)
    );
    assert!(market.router_is_empty());
}

#[test]
fn test_exit_for_exact_tokens() {
    let mut market = market();
    let pool = pool_state();

    let shares = market
        .router
        .burn_and_swap_for_exact_tokens(
            &mut market.ledger,
            &market.call,
            ether(1),
            ether(10),
            market.pool,
            &path("A", &[("B", Venue::A)]),
        )
        .unwrap();

    let redeemed = swap::amount_in(ether(1), reserve(), reserve()).unwrap();
    assert_eq!(
        shares,
        weighted::pool_shares_in_given_single_asset_out(&pool, address_from_str("A"), redeemed)
            .unwrap()
    );
    assert_eq!(
        market.ledger.balance_of(market.call.recipient, address_from_str("B")),
        ether(1)
    );
    assert_eq!(
        market.ledger.balance_of(market.call.sender, market.pool),
        ether(10) - shares
    );
    assert!(market.router_is_empty());
}
