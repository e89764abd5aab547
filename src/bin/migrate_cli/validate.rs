//! Validate command - decode one output payload

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser};
use serde_json::Value;

use stardust_migration::migration::{ObjectSource, OutputValidator, StardustOutput};
use stardust_migration::types::ObjectData;

use super::output::format_output;
use super::{parse_address_arg, CliContext};

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["object_id", "file"])))]
pub struct ValidateCmd {
    /// Fetch the output with this object ID
    #[arg(long)]
    pub object_id: Option<String>,

    /// Read the object payload from a JSON file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Decode as an NFT output instead of a basic output
    #[arg(long)]
    pub nft: bool,
}

impl ValidateCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let object = match (&self.object_id, &self.file) {
            (_, Some(path)) => read_object_file(path)?,
            (Some(object_id), None) => fetch_output(&ctx.client, object_id).await?,
            (None, None) => return Err(anyhow!("either --object-id or --file is required")),
        };

        let validator = OutputValidator::new(&ctx.config);
        if self.nft {
            let output = validator
                .validate_nft(&object)
                .with_context(|| format!("NFT output {} is invalid", object.object_id))?;
            print_output(&output, ctx.json)
        } else {
            let output = validator
                .validate_basic(&object)
                .with_context(|| format!("basic output {} is invalid", object.object_id))?;
            print_output(&output, ctx.json)
        }
    }
}

fn print_output<T>(output: &T, json: bool) -> Result<()>
where
    T: StardustOutput + serde::Serialize,
{
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        println!(
            "\x1b[32m✓ Valid {}\x1b[0m {}",
            T::KIND,
            output.id().to_hex_literal()
        );
        print!("{}", format_output(output));
    }
    Ok(())
}

/// Fetch the payload of `raw_id` from `source`.
pub async fn fetch_output<S>(source: &S, raw_id: &str) -> Result<ObjectData>
where
    S: ObjectSource + ?Sized,
{
    let id = parse_address_arg(raw_id)?;
    source
        .fetch_object(&id)
        .await
        .with_context(|| format!("failed to fetch object {}", id.to_hex_literal()))?
        .ok_or_else(|| anyhow!("object {} not found", id.to_hex_literal()))
}

/// Read an object payload, accepting either the bare object or an
/// `iota_getObject` response with the object under `data`.
pub fn read_object_file(path: &Path) -> Result<ObjectData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not JSON", path.display()))?;
    let value = match value {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("objectId") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value)
        .with_context(|| format!("{} does not hold an object payload", path.display()))
}
