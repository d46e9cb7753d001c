//! Command line front end: quotes routes and simulates swaps against a
//! market snapshot.

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use log::info;
use narwhal::config::Config;
use narwhal::ledger::ReserveSource;
use narwhal::math::weighted::all_assets_in_given_pool_shares_out;
use narwhal::models::MarketSnapshot;
use narwhal::route::codec::Path;
use narwhal::utils::logger::setup_logger;
use narwhal::{Call, Router};

/// Quotes and simulates routes against a market snapshot
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file, the environment is used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON market snapshot to quote against
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Command to run
    #[command(subcommand)]
    command: Commands,
}

/// Commands
#[derive(Subcommand)]
enum Commands {
    /// Outputs of every leg for an exact input
    QuoteIn {
        /// Amount paid into the first leg
        amount: String,
        /// Hop words in hex, source first
        hops: Vec<String>,
    },
    /// Inputs of every leg for an exact output
    QuoteOut {
        /// Amount taken out of the last leg
        amount: String,
        /// Hop words in hex, source first
        hops: Vec<String>,
    },
    /// Per-asset deposits for minting exact pool shares
    MintCost {
        /// Pool address
        pool: String,
        /// Shares to mint
        shares: String,
    },
    /// Settles an exact input swap on the snapshot and prints the effects
    SimulateSwap {
        /// Account paying the input
        sender: String,
        /// Account receiving the output
        recipient: String,
        /// Exact input amount
        amount: String,
        /// Smallest acceptable output
        min_out: String,
        /// Hop words in hex, source first
        hops: Vec<String>,
    },
}

/// Parses a decimal or `0x` prefixed amount
fn parse_amount(raw: &str) -> Result<U256> {
    raw.parse()
        .map_err(|err| eyre!("{raw} is not an amount: {err}"))
}

/// Parses a hex address
fn parse_address(raw: &str) -> Result<Address> {
    raw.parse()
        .wrap_err_with(|| format!("{raw} is not an address"))
}

/// Re-encodes hex hop words into a path
fn encoded_path(hops: &[String]) -> Result<Vec<u8>> {
    Ok(Path::from_hex_words(hops)?.encode())
}

/// Loads configuration and the snapshot, then runs one command
fn main() -> Result<()> {
    setup_logger(None)?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::from_env()?,
    };
    let snapshot = match &cli.snapshot {
        Some(path) => MarketSnapshot::from_json_file(path)?,
        None => MarketSnapshot::default(),
    };
    let router = Router::new(&config);
    let mut ledger = snapshot.into_ledger(&config);
    info!("router {} ready", router.address());

    match cli.command {
        Commands::QuoteIn { amount, hops } => {
            let amounts =
                router.get_amounts_out(&ledger, parse_amount(&amount)?, &encoded_path(&hops)?)?;
            println!("{}", serde_json::to_string_pretty(&amounts)?);
        }
        Commands::QuoteOut { amount, hops } => {
            let amounts =
                router.get_amounts_in(&ledger, parse_amount(&amount)?, &encoded_path(&hops)?)?;
            println!("{}", serde_json::to_string_pretty(&amounts)?);
        }
        Commands::MintCost { pool, shares } => {
            let pool = ledger.pool_state(parse_address(&pool)?)?;
            let deposits = all_assets_in_given_pool_shares_out(&pool, parse_amount(&shares)?)?;
            println!("{}", serde_json::to_string_pretty(&deposits)?);
        }
        Commands::SimulateSwap {
            sender,
            recipient,
            amount,
            min_out,
            hops,
        } => {
            let call = Call::new(
                parse_address(&sender)?,
                parse_address(&recipient)?,
                ledger.timestamp(),
            );
            let amounts = router.swap_exact_tokens_for_tokens(
                &mut ledger,
                &call,
                parse_amount(&amount)?,
                parse_amount(&min_out)?,
                &encoded_path(&hops)?,
            )?;
            println!("{}", serde_json::to_string_pretty(&amounts)?);
            println!("{}", serde_json::to_string_pretty(ledger.events())?);
        }
    }
    Ok(())
}
