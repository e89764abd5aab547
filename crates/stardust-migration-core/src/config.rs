//! Migration configuration.
//!
//! Defaults target the IOTA mainnet Stardust package. Every field can be
//! overridden from the environment with [`MigrationConfig::from_env`]:
//!
//! - `STARDUST_PACKAGE_ID` - package holding `basic_output`, `nft_output`, `utilities`
//! - `STARDUST_COIN_TYPE` - type argument of the outputs' balance
//! - `STARDUST_RESOLVE_CONCURRENCY` - bags resolved in parallel
//! - `STARDUST_DF_PAGE_SIZE` - dynamic fields requested per page
//! - `STARDUST_MAX_PAGES` - page limit per bag before giving up

use anyhow::Result;
use move_core_types::account_address::AccountAddress;

use stardust_migration_types::encoding::parse_address;
use stardust_migration_types::env_utils::{env_string, env_var_or};
use stardust_migration_types::framework::{
    basic_output_type, nft_output_type, BAG_TYPE, IOTA_COIN_TYPE, STARDUST_PACKAGE,
};

/// Default number of bags resolved concurrently.
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 4;
/// Default dynamic-field page size.
pub const DEFAULT_DF_PAGE_SIZE: usize = 50;
/// Default page limit per bag.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Configuration shared by the validator, resolver and graph lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Package exposing the output modules and `utilities::extract_and_send_to`.
    pub stardust_package: AccountAddress,
    /// Coin type the outputs hold (the type argument of `extract_assets`).
    pub coin_type: String,
    /// Expected `native_tokens.type` of every output.
    pub bag_type: String,
    /// Maximum bags resolved at once across a batch.
    pub resolve_concurrency: usize,
    /// Dynamic fields requested per page.
    pub dynamic_field_page_size: usize,
    /// Pages fetched for one bag before resolution fails.
    pub max_pages: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            stardust_package: STARDUST_PACKAGE,
            coin_type: IOTA_COIN_TYPE.to_string(),
            bag_type: BAG_TYPE.to_string(),
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
            dynamic_field_page_size: DEFAULT_DF_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl MigrationConfig {
    /// Load configuration from the environment on top of the defaults.
    ///
    /// Fails only if `STARDUST_PACKAGE_ID` is set to something that is not an
    /// address; unparsable numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let stardust_package = match env_string("STARDUST_PACKAGE_ID") {
            Some(raw) => parse_address(&raw, "STARDUST_PACKAGE_ID")?,
            None => defaults.stardust_package,
        };

        Ok(Self {
            stardust_package,
            coin_type: env_string("STARDUST_COIN_TYPE").unwrap_or(defaults.coin_type),
            bag_type: defaults.bag_type,
            resolve_concurrency: env_var_or(
                "STARDUST_RESOLVE_CONCURRENCY",
                defaults.resolve_concurrency,
            )
            .max(1),
            dynamic_field_page_size: env_var_or(
                "STARDUST_DF_PAGE_SIZE",
                defaults.dynamic_field_page_size,
            )
            .max(1),
            max_pages: env_var_or("STARDUST_MAX_PAGES", defaults.max_pages).max(1),
        })
    }

    /// Builder: set the Stardust package.
    pub fn with_package(mut self, package: AccountAddress) -> Self {
        self.stardust_package = package;
        self
    }

    /// Builder: set resolution concurrency (at least 1).
    pub fn with_resolve_concurrency(mut self, n: usize) -> Self {
        self.resolve_concurrency = n.max(1);
        self
    }

    /// Builder: set the dynamic-field page size (at least 1).
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.dynamic_field_page_size = n.max(1);
        self
    }

    /// Builder: set the per-bag page limit (at least 1).
    pub fn with_max_pages(mut self, n: usize) -> Self {
        self.max_pages = n.max(1);
        self
    }

    /// Struct type of basic outputs, for owned-object filters.
    pub fn basic_output_type(&self) -> String {
        basic_output_type(&self.stardust_package, &self.coin_type)
    }

    /// Struct type of NFT outputs, for owned-object filters.
    pub fn nft_output_type(&self) -> String {
        nft_output_type(&self.stardust_package, &self.coin_type)
    }
}
