//! stardust-migrate: plan the migration of legacy Stardust outputs
//!
//! Lists an address's basic and NFT outputs over JSON-RPC, sets aside the
//! ones that cannot be migrated right now, and prints the single
//! programmable transaction that moves everything else to the address.
//!
//! ## Commands
//!
//! - **plan**: Build the migration transaction for an address
//! - **validate**: Decode one output payload (from the network or a file)
//!
//! ## Example Usage
//!
//! ```bash
//! # Human-readable plan against mainnet
//! stardust-migrate plan --address 0xa11ce...
//!
//! # JSON transaction against testnet, at a fixed timestamp
//! stardust-migrate --rpc-url testnet --json plan --address 0xa11ce... --epoch-ms 1700000000000
//!
//! # Check a saved payload
//! stardust-migrate validate --file output.json --nft
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod migrate_cli;

use migrate_cli::{plan::PlanCmd, validate::ValidateCmd, CliContext};

#[derive(Parser)]
#[command(
    name = "stardust-migrate",
    author,
    version,
    about = "Plan the migration of Stardust basic and NFT outputs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON-RPC endpoint URL or network name (mainnet, testnet, devnet).
    /// Defaults to IOTA_RPC_URL, then mainnet.
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logs unless RUST_LOG is set)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the migration transaction for an address
    Plan(PlanCmd),

    /// Decode a single output payload
    Validate(ValidateCmd),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        rpc_url,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    let ctx = CliContext::new(rpc_url.as_deref(), json, verbose)?;
    match command {
        Commands::Plan(cmd) => cmd.execute(&ctx).await,
        Commands::Validate(cmd) => cmd.execute(&ctx).await,
    }
}
