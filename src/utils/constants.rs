use alloy::primitives::{b256, B256};

/// Pair init code hash of venue A (Uniswap V2)
pub const VENUE_A_INIT_CODE_HASH: B256 =
    b256!("0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");

/// Pair init code hash of venue B (SushiSwap)
pub const VENUE_B_INIT_CODE_HASH: B256 =
    b256!("0xe18a34eb0e04b04f7a0ac29a6e80748dca96319b42c54d679cb821dca90c6303");

/// Share of a swap input that reaches the curve, in thousandths
pub const SWAP_FEE_NUMERATOR: u64 = 997;

/// Denominator of [`SWAP_FEE_NUMERATOR`]
pub const SWAP_FEE_DENOMINATOR: u64 = 1000;
