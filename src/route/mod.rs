//! Paths, their byte codec and the per-leg pricing of a route.

/// Fixed-width path records
pub mod codec;
/// Leg pricing against a reserve snapshot
pub mod dispatch;
/// Hops, venues and intermediaries
pub mod hop;
/// CREATE2 pair addressing
pub mod pair;
/// Per-leg and per-route quotes
pub mod quote;

pub use codec::Path;
pub use dispatch::{Dispatcher, ReserveSnapshot};
pub use hop::{Hop, Intermediary, Venue};
pub use quote::{Direction, RouteQuote, SwapQuote};
