//! Stardust Migration
//!
//! Builds the single atomic programmable transaction that moves a user's
//! legacy Stardust basic and NFT outputs to one destination address:
//!
//! - **Validation**: Decode raw object payloads into typed outputs
//! - **Resolution**: List the native token types held in each output's bag
//! - **Graph construction**: Emit a causally ordered, linearly consumed PTB
//! - **Planning**: Split a user's outputs by unlock status before building
//!
//! See [`planner`] for the end-to-end flow and [`migration`] for the building blocks.

#![allow(clippy::result_large_err)]

pub mod planner;

pub use stardust_migration_core as migration;
pub use stardust_migration_types as types;
pub use stardust_transport as transport;

pub use planner::{plan_migration, MigrationPlan, SkippedOutput};
pub use stardust_migration_core::{
    build_migration, MigrationAssembler, MigrationConfig, MigrationError, MigrationGraph,
};
pub use stardust_migration_types::{ObjectData, ProgrammableTransaction};
pub use stardust_transport::JsonRpcClient;
