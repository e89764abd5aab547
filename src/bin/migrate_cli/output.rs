//! Output formatting for stardust-migrate
//!
//! Human-readable rendering of plans; JSON output serialises the plan as is.

use chrono::{DateTime, Utc};

use stardust_migration::migration::{StardustOutput, UnlockCondition, UnmigratableReason};
use stardust_migration::planner::{MigrationPlan, SkipReason};

/// Render a Unix timestamp in seconds as RFC 3339, falling back to the raw value.
pub fn format_unix_secs(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

fn format_skip_reason(reason: &SkipReason) -> String {
    match reason {
        SkipReason::Unmigratable(UnmigratableReason::Timelocked { until }) => {
            format!("timelocked until {}", format_unix_secs(u64::from(*until)))
        }
        other => other.to_string(),
    }
}

fn format_unlock_condition(uc: &UnlockCondition) -> String {
    match uc {
        UnlockCondition::Expiration(e) => format!(
            "expiration: owner {}, returns to {} at {}",
            e.owner.to_hex_literal(),
            e.return_address.to_hex_literal(),
            format_unix_secs(u64::from(e.unix_time))
        ),
        UnlockCondition::StorageDepositReturn(sdr) => format!(
            "storage deposit return: {} to {}",
            sdr.return_amount,
            sdr.return_address.to_hex_literal()
        ),
        UnlockCondition::Timelock(t) => {
            format!("timelock: until {}", format_unix_secs(u64::from(t.unix_time)))
        }
    }
}

/// Summarise a decoded output: balance, token bag and unlock conditions.
pub fn format_output<T: StardustOutput>(output: &T) -> String {
    let bag = output.native_tokens();
    let mut out = format!(
        "  balance: {}\n  native tokens: bag {} ({} entries)\n",
        output.common().balance,
        bag.id.to_hex_literal(),
        bag.size
    );
    let conditions = output.unlock_conditions();
    if conditions.is_empty() {
        out.push_str("  unlock conditions: none\n");
    } else {
        for uc in conditions.iter() {
            out.push_str(&format!("  {}\n", format_unlock_condition(&uc)));
        }
    }
    out
}

/// Format a migration plan for display
pub fn format_plan(plan: &MigrationPlan, verbose: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\x1b[1mMigration plan for\x1b[0m {}\n",
        plan.address.to_hex_literal()
    ));
    out.push_str(&format!(
        "Epoch start: {}\n\n",
        format_unix_secs(plan.epoch_timestamp_ms / 1000)
    ));

    out.push_str(&format!(
        "Migrating {} basic and {} NFT output(s)\n",
        plan.basic_outputs.len(),
        plan.nft_outputs.len()
    ));
    if verbose {
        for id in plan.basic_outputs.iter().chain(&plan.nft_outputs) {
            out.push_str(&format!("  \x1b[36m{}\x1b[0m\n", id));
        }
    }

    if !plan.skipped.is_empty() {
        out.push_str(&format!(
            "\n\x1b[33mSkipped {} output(s):\x1b[0m\n",
            plan.skipped.len()
        ));
        for skipped in &plan.skipped {
            out.push_str(&format!(
                "  {} ({}): {}\n",
                skipped.object_id,
                skipped.kind,
                format_skip_reason(&skipped.reason)
            ));
        }
    }

    match &plan.graph {
        Some(graph) => {
            out.push_str(&format!(
                "\n\x1b[1mTransaction\x1b[0m ({} commands):\n",
                graph.len()
            ));
            out.push_str(&graph.to_string());
        }
        None => out.push_str("\nNothing to migrate.\n"),
    }
    out
}
