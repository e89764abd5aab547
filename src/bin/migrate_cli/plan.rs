//! Plan command - build the migration transaction for an address

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use stardust_migration::planner::plan_migration;
use stardust_migration::types::ObjectData;
use stardust_migration::JsonRpcClient;

use super::output::format_plan;
use super::{parse_address_arg, CliContext};

/// Upper bound on outputs listed per type.
const DEFAULT_OUTPUT_LIMIT: usize = 5_000;

#[derive(Parser, Debug)]
pub struct PlanCmd {
    /// Address owning the outputs; also receives everything migrated
    #[arg(long)]
    pub address: String,

    /// Timestamp to classify unlock conditions at, in milliseconds.
    /// Defaults to the current epoch's start timestamp.
    #[arg(long)]
    pub epoch_ms: Option<u64>,

    /// Maximum outputs fetched per output type
    #[arg(long, default_value_t = DEFAULT_OUTPUT_LIMIT)]
    pub limit: usize,

    /// Print only the transaction JSON (implies --json)
    #[arg(long)]
    pub transaction_only: bool,
}

impl PlanCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let address = parse_address_arg(&self.address)?;
        let owner = address.to_hex_literal();

        let epoch_ms = match self.epoch_ms {
            Some(ms) => ms,
            None => {
                let client = ctx.client.clone();
                tokio::task::spawn_blocking(move || client.current_epoch_start_ms())
                    .await
                    .context("epoch lookup task failed")??
            }
        };

        let basic = list_outputs(&ctx.client, &owner, ctx.config.basic_output_type(), self.limit)
            .await
            .context("failed to list basic outputs")?;
        let nft = list_outputs(&ctx.client, &owner, ctx.config.nft_output_type(), self.limit)
            .await
            .context("failed to list NFT outputs")?;
        info!(
            owner = %owner,
            basic = basic.len(),
            nft = nft.len(),
            epoch_ms,
            "listed owned outputs"
        );

        let plan = plan_migration(&ctx.client, &ctx.config, address, epoch_ms, &basic, &nft)
            .await
            .context("failed to build migration")?;

        if self.transaction_only {
            println!("{}", serde_json::to_string_pretty(&plan.transaction)?);
        } else if ctx.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print!("{}", format_plan(&plan, ctx.verbose));
        }
        Ok(())
    }
}

async fn list_outputs(
    client: &JsonRpcClient,
    owner: &str,
    struct_type: String,
    limit: usize,
) -> Result<Vec<ObjectData>> {
    let client = client.clone();
    let owner = owner.to_string();
    tokio::task::spawn_blocking(move || client.owned_objects_of_type(&owner, &struct_type, limit))
        .await
        .context("listing task failed")?
}
