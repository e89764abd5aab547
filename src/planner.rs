//! Migration planning for one address.
//!
//! A user's owned outputs are not all migratable: some fail validation,
//! some are still timelocked, some currently belong to an expiration's
//! other party. [`plan_migration`] sets those aside and builds the graph
//! for the rest.

use std::collections::HashSet;

use move_core_types::account_address::AccountAddress;
use serde::Serialize;
use tracing::{debug, info, warn};

use stardust_migration_core::{
    build_migration, group_by_migration_status, DynamicFieldSource, MigrationConfig,
    MigrationError, MigrationGraph, OutputKind, OutputValidator, StardustOutput,
    UnmigratableReason,
};
use stardust_migration_types::{ObjectData, ObjectID, ProgrammableTransaction};

/// Why an owned output was left out of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SkipReason {
    Invalid { error: String },
    Unmigratable(UnmigratableReason),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Invalid { error } => write!(f, "invalid: {}", error),
            SkipReason::Unmigratable(reason) => write!(f, "{}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOutput {
    pub object_id: String,
    pub kind: OutputKind,
    pub reason: SkipReason,
}

/// Outcome of planning: the migrated outputs with their transaction, and
/// everything that was set aside.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub address: AccountAddress,
    pub epoch_timestamp_ms: u64,
    pub basic_outputs: Vec<String>,
    pub nft_outputs: Vec<String>,
    pub skipped: Vec<SkippedOutput>,
    #[serde(skip)]
    pub graph: Option<MigrationGraph>,
    pub transaction: Option<ProgrammableTransaction>,
}

impl MigrationPlan {
    pub fn has_transaction(&self) -> bool {
        self.graph.is_some()
    }

    pub fn migrated_count(&self) -> usize {
        self.basic_outputs.len() + self.nft_outputs.len()
    }
}

/// Plan the migration of `address`'s outputs at `epoch_timestamp_ms`.
///
/// Invalid and unmigratable outputs are recorded in
/// [`MigrationPlan::skipped`]. When nothing is left the plan carries no
/// graph instead of failing; resolution and construction errors still fail
/// the whole plan.
pub async fn plan_migration<S>(
    source: &S,
    config: &MigrationConfig,
    address: AccountAddress,
    epoch_timestamp_ms: u64,
    basic_objects: &[ObjectData],
    nft_objects: &[ObjectData],
) -> Result<MigrationPlan, MigrationError>
where
    S: DynamicFieldSource + ?Sized,
{
    let validator = OutputValidator::new(config);
    let mut skipped = Vec::new();

    let basic = collect_valid(
        basic_objects,
        OutputKind::Basic,
        |o| validator.validate_basic(o),
        &mut skipped,
    );
    let nft = collect_valid(
        nft_objects,
        OutputKind::Nft,
        |o| validator.validate_nft(o),
        &mut skipped,
    );

    let basic = select_migratable(
        basic_objects,
        basic,
        epoch_timestamp_ms,
        &address,
        &mut skipped,
    );
    let nft = select_migratable(nft_objects, nft, epoch_timestamp_ms, &address, &mut skipped);
    debug!(
        basic = basic.len(),
        nft = nft.len(),
        skipped = skipped.len(),
        "selected migratable outputs"
    );

    let graph = if basic.is_empty() && nft.is_empty() {
        info!(address = %address.to_hex_literal(), "no migratable outputs");
        None
    } else {
        Some(build_migration(source, config, address, &basic, &nft).await?)
    };
    let transaction = graph.as_ref().map(MigrationGraph::to_programmable_transaction);

    Ok(MigrationPlan {
        address,
        epoch_timestamp_ms,
        basic_outputs: basic.iter().map(|o| o.object_id.clone()).collect(),
        nft_outputs: nft.iter().map(|o| o.object_id.clone()).collect(),
        skipped,
        graph,
        transaction,
    })
}

fn collect_valid<T, E, F>(
    objects: &[ObjectData],
    kind: OutputKind,
    validate: F,
    skipped: &mut Vec<SkippedOutput>,
) -> Vec<T>
where
    E: std::fmt::Display,
    F: Fn(&ObjectData) -> Result<T, E>,
{
    let mut valid = Vec::with_capacity(objects.len());
    for object in objects {
        match validate(object) {
            Ok(output) => valid.push(output),
            Err(e) => {
                warn!(object_id = %object.object_id, %kind, error = %e, "skipping invalid output");
                skipped.push(SkippedOutput {
                    object_id: object.object_id.clone(),
                    kind,
                    reason: SkipReason::Invalid {
                        error: e.to_string(),
                    },
                });
            }
        }
    }
    valid
}

/// Raw objects whose decoded output is migratable, in their original order.
fn select_migratable<T: StardustOutput>(
    objects: &[ObjectData],
    outputs: Vec<T>,
    epoch_timestamp_ms: u64,
    address: &AccountAddress,
    skipped: &mut Vec<SkippedOutput>,
) -> Vec<ObjectData> {
    let grouped = group_by_migration_status(outputs, epoch_timestamp_ms, address);
    for (output, reason) in grouped.unmigratable {
        debug!(object_id = %output.id().to_hex_literal(), %reason, "output not migratable");
        skipped.push(SkippedOutput {
            object_id: output.id().to_hex_literal(),
            kind: T::KIND,
            reason: SkipReason::Unmigratable(reason),
        });
    }

    let ids: HashSet<ObjectID> = grouped.migratable.iter().map(|o| o.id()).collect();
    objects
        .iter()
        .filter(|o| o.object_id_as_address().is_some_and(|id| ids.contains(&id)))
        .cloned()
        .collect()
}
