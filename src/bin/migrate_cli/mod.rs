//! CLI command implementations for stardust-migrate.

pub mod output;
pub mod plan;
pub mod validate;

use anyhow::{anyhow, Context, Result};
use move_core_types::account_address::AccountAddress;

use stardust_migration::migration::MigrationConfig;
use stardust_migration::transport::{resolve_rpc_endpoint, JsonRpcClient};

/// Settings shared by every command.
pub struct CliContext {
    pub client: JsonRpcClient,
    pub config: MigrationConfig,
    pub json: bool,
    pub verbose: bool,
}

impl CliContext {
    pub fn new(rpc_url: Option<&str>, json: bool, verbose: bool) -> Result<Self> {
        let endpoint = resolve_rpc_endpoint(rpc_url);
        let config = MigrationConfig::from_env().context("invalid migration configuration")?;
        tracing::debug!(%endpoint, package = %config.stardust_package.to_hex_literal(), "cli context");
        Ok(Self {
            client: JsonRpcClient::new(&endpoint),
            config,
            json,
            verbose,
        })
    }
}

/// Parse a `0x`-prefixed address argument.
pub fn parse_address_arg(raw: &str) -> Result<AccountAddress> {
    let raw = raw.trim();
    if !raw.starts_with("0x") {
        return Err(anyhow!("address must start with 0x: {}", raw));
    }
    AccountAddress::from_hex_literal(raw).map_err(|e| anyhow!("invalid address {}: {}", raw, e))
}
