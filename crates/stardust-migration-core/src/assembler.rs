//! Batch assembly: validate, resolve, build.
//!
//! ```ignore
//! let client = JsonRpcClient::from_env();
//! let graph = build_migration(&client, &config, destination, &basic, &nft).await?;
//! let ptb = graph.to_programmable_transaction();
//! ```

use std::collections::HashSet;

use futures::stream::{self, StreamExt, TryStreamExt};
use move_core_types::account_address::AccountAddress;
use tracing::{debug, warn};

use stardust_migration_types::ObjectData;

use crate::builder::MigrationGraphBuilder;
use crate::config::MigrationConfig;
use crate::error::{GraphError, MigrationError};
use crate::graph::MigrationGraph;
use crate::output::{BasicOutput, CommonOutput, NftOutput, OutputKind};
use crate::resolver::NativeTokenResolver;
use crate::source::DynamicFieldSource;
use crate::validator::OutputValidator;

/// Build the migration graph for a batch of raw output objects.
///
/// All outputs are validated and checked for repeated object ids before
/// anything is resolved, and all bags are
/// resolved before any operation is emitted, so a failure anywhere returns
/// an error and never a partial graph. Basic outputs come before NFT
/// outputs, each list in the given order.
pub async fn build_migration<S>(
    source: &S,
    config: &MigrationConfig,
    destination: AccountAddress,
    basic_outputs: &[ObjectData],
    nft_outputs: &[ObjectData],
) -> Result<MigrationGraph, MigrationError>
where
    S: DynamicFieldSource + ?Sized,
{
    if basic_outputs.is_empty() && nft_outputs.is_empty() {
        return Err(MigrationError::NothingToMigrate);
    }

    let validator = OutputValidator::new(config);
    let basic = basic_outputs
        .iter()
        .map(|object| {
            validator
                .validate_basic(object)
                .map_err(|source| validation_error(object, OutputKind::Basic, source))
        })
        .collect::<Result<Vec<BasicOutput>, _>>()?;
    let nft = nft_outputs
        .iter()
        .map(|object| {
            validator
                .validate_nft(object)
                .map_err(|source| validation_error(object, OutputKind::Nft, source))
        })
        .collect::<Result<Vec<NftOutput>, _>>()?;
    debug!(
        basic = basic.len(),
        nft = nft.len(),
        "validated migration batch"
    );

    let commons: Vec<&CommonOutput> = basic
        .iter()
        .map(|o| &o.common)
        .chain(nft.iter().map(|o| &o.common))
        .collect();
    let mut seen = HashSet::with_capacity(commons.len());
    if let Some(dup) = commons.iter().find(|c| !seen.insert(c.id)) {
        return Err(GraphError::DuplicateObject { object_id: dup.id }.into());
    }
    let mut token_types = resolve_all(source, config, &commons).await?;
    let nft_token_types = token_types.split_off(basic.len());

    let mut builder = MigrationGraphBuilder::new(config, destination)?;
    for (output, types) in basic.iter().zip(&token_types) {
        builder.add_basic_output(output, types)?;
    }
    for (output, types) in nft.iter().zip(&nft_token_types) {
        builder.add_nft_output(output, types)?;
    }
    Ok(builder.finish()?)
}

/// Token types of every output's bag, in output order.
async fn resolve_all<S>(
    source: &S,
    config: &MigrationConfig,
    outputs: &[&CommonOutput],
) -> Result<Vec<Vec<String>>, MigrationError>
where
    S: DynamicFieldSource + ?Sized,
{
    let resolver = NativeTokenResolver::new(source, config);
    let resolver = &resolver;

    stream::iter(outputs.iter().copied())
        .map(|output| async move {
            resolver
                .resolve_bag(&output.native_tokens)
                .await
                .map_err(|source| MigrationError::Resolution {
                    object_id: output.id,
                    bag_id: output.native_tokens.id,
                    source,
                })
        })
        .buffered(config.resolve_concurrency.max(1))
        .try_collect()
        .await
}

fn validation_error(
    object: &ObjectData,
    kind: OutputKind,
    source: crate::error::ValidationError,
) -> MigrationError {
    warn!(object_id = %object.object_id, %kind, error = %source, "rejected output");
    MigrationError::Validation {
        object_id: object.object_id.clone(),
        kind,
        source,
    }
}

/// Owns a dynamic-field source and configuration for repeated batches.
///
/// Holds no per-batch state; every [`build`](Self::build) call is independent.
pub struct MigrationAssembler<S> {
    source: S,
    config: MigrationConfig,
}

impl<S: DynamicFieldSource> MigrationAssembler<S> {
    pub fn new(source: S, config: MigrationConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn build(
        &self,
        destination: AccountAddress,
        basic_outputs: &[ObjectData],
        nft_outputs: &[ObjectData],
    ) -> Result<MigrationGraph, MigrationError> {
        build_migration(
            &self.source,
            &self.config,
            destination,
            basic_outputs,
            nft_outputs,
        )
        .await
    }
}
