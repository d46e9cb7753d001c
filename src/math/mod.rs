//! Pure pricing math: the constant-product curve shared by both venues and the
//! weighted bonding curve of the pool.

/// 18-decimal fixed point helpers
pub mod fixed;
/// Constant-product swap math
pub mod swap;
/// Weighted pool join and exit math
pub mod weighted;

pub use fixed::Rounding;
