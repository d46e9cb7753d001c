//! Router configuration: the router's own holder address, the wrapped native
//! asset and the two constant-product venues.
//!
//! Loaded from `NARWHAL_*` environment variables (a `.env` file is honoured)
//! or from a JSON document.

use std::path::Path;

use alloy::primitives::{Address, B256};
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::route::hop::Venue;
use crate::route::pair::pair_address;
use crate::utils::constants::{VENUE_A_INIT_CODE_HASH, VENUE_B_INIT_CODE_HASH};

/// Factory of one venue and the init code hash of its pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Pair factory address
    pub factory: Address,
    /// Keccak hash of the pair creation code
    pub init_code_hash: B256,
}

/// The two venues a leg can be routed through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venues {
    /// Venue selected by a zero flag
    pub a: VenueConfig,
    /// Venue selected by a nonzero flag
    pub b: VenueConfig,
}

impl Venues {
    /// Configuration of `venue`.
    #[must_use]
    pub const fn get(&self, venue: Venue) -> &VenueConfig {
        match venue {
            Venue::A => &self.a,
            Venue::B => &self.b,
        }
    }

    /// Address of the `venue` pair trading `asset_a` against `asset_b`.
    #[must_use]
    pub fn pair_for(&self, venue: Venue, asset_a: Address, asset_b: Address) -> Address {
        let config = self.get(venue);
        pair_address(config.factory, config.init_code_hash, asset_a, asset_b)
    }
}

/// Everything the router needs to plan and settle operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Holder address the router settles intermediate balances through
    pub router: Address,
    /// Wrapped form of the native settlement asset
    pub wrapped_native: Address,
    /// Venue factories
    pub venues: Venues,
}

/// Reads a required variable
fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| eyre!("{name} not set"))
}

/// Reads and parses a required address variable
fn address_var(name: &str) -> Result<Address> {
    required(name)?
        .parse()
        .wrap_err_with(|| format!("{name} is not an address"))
}

/// Reads an optional hash variable, falling back to `default`
fn hash_var(name: &str, default: B256) -> Result<B256> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .wrap_err_with(|| format!("{name} is not a 32 byte hash")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads the configuration from the environment.
    ///
    /// Required: `NARWHAL_ROUTER`, `NARWHAL_WRAPPED_NATIVE`,
    /// `NARWHAL_VENUE_A_FACTORY`, `NARWHAL_VENUE_B_FACTORY`.
    /// Optional: `NARWHAL_VENUE_A_INIT_CODE_HASH`, `NARWHAL_VENUE_B_INIT_CODE_HASH`.
    ///
    /// # Errors
    /// * If a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            router: address_var("NARWHAL_ROUTER")?,
            wrapped_native: address_var("NARWHAL_WRAPPED_NATIVE")?,
            venues: Venues {
                a: VenueConfig {
                    factory: address_var("NARWHAL_VENUE_A_FACTORY")?,
                    init_code_hash: hash_var(
                        "NARWHAL_VENUE_A_INIT_CODE_HASH",
                        VENUE_A_INIT_CODE_HASH,
                    )?,
                },
                b: VenueConfig {
                    factory: address_var("NARWHAL_VENUE_B_FACTORY")?,
                    init_code_hash: hash_var(
                        "NARWHAL_VENUE_B_INIT_CODE_HASH",
                        VENUE_B_INIT_CODE_HASH,
                    )?,
                },
            },
        })
    }

    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    /// * If the file cannot be read or is not a valid configuration
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    /// * If the document is not a valid configuration
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).wrap_err("parsing config")
    }
}
