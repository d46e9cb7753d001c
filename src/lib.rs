/*!
 * # Narwhal - Routing and Settlement Engine
 *
 * Narwhal routes value across two constant-product venues and a weighted
 * multi-asset pool: exact-in and exact-out swaps over multi-hop paths, and
 * joins and exits of the pool through one or every pool asset, each settled
 * as one atomic operation.
 *
 * ## Core Features
 *
 * - **Swap Math**: constant-product pricing with the 0.3% venue fee
 * - **Pool Math**: weighted bonding curve joins and exits with explicit rounding
 * - **Routing**: path decoding and leg pricing against a per-operation reserve snapshot
 * - **Settlement**: pure instruction plans executed all or nothing against a ledger
 *
 * ## Module Structure
 *
 * - `config`: Router and venue configuration
 * - `error`: The error taxonomy
 * - `ledger`: Ledger interfaces and the in-memory ledger
 * - `math`: Swap and weighted pool math
 * - `models`: Market snapshots for the command line
 * - `route`: Hops, path codec, pair addressing and leg pricing
 * - `router`: The operation catalog
 * - `settle`: Settlement plans and their execution
 * - `utils`: Constants and logging
 */

/// Router and venue configuration
pub mod config;
/// The error taxonomy
pub mod error;
/// Ledger interfaces and the in-memory ledger
pub mod ledger;
/// Swap and weighted pool math
pub mod math;
/// Market snapshots for the command line
pub mod models;
/// Hops, path codec, pair addressing and leg pricing
pub mod route;
/// The operation catalog
pub mod router;
/// Settlement plans and their execution
pub mod settle;
/// Test fixtures
#[cfg(test)]
mod test_helpers;
/// Shared value types
pub mod types;
/// Constants and logging
pub mod utils;

pub use error::{Result, RouterError};
pub use router::{AllAssetMint, Call, Router};
