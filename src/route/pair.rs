use alloy::primitives::{keccak256, Address, B256};

/// Orders two assets the way a pair stores them.
#[must_use]
pub fn sort_assets(asset_a: Address, asset_b: Address) -> (Address, Address) {
    if asset_a < asset_b {
        (asset_a, asset_b)
    } else {
        (asset_b, asset_a)
    }
}

/// CREATE2 address of the pair trading `asset_a` against `asset_b`.
///
/// The salt is `keccak256(token0 ++ token1)` over the sorted assets.
#[must_use]
pub fn pair_address(
    factory: Address,
    init_code_hash: B256,
    asset_a: Address,
    asset_b: Address,
) -> Address {
    let (token0, token1) = sort_assets(asset_a, asset_b);
    let salt = keccak256([token0.as_slice(), token1.as_slice()].concat());
    factory.create2(salt, init_code_hash)
}
