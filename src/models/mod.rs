/// Serializable market snapshots for the command line
pub mod snapshot;

pub use snapshot::{BalanceSnapshot, MarketSnapshot, PairSnapshot};
