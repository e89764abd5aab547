//! Stardust output migration.
//!
//! Turns a user's legacy basic and NFT outputs into one atomic transaction
//! that extracts their balances, sends out their native tokens, merges the
//! coins and transfers everything to a single destination address.
//!
//! # Pipeline
//!
//! 1. [`validator`]: raw [`ObjectData`](stardust_migration_types::ObjectData)
//!    to typed [`BasicOutput`] / [`NftOutput`]
//! 2. [`resolver`]: token types held by each output's native-token bag
//! 3. [`graph`] + [`builder`]: the ordered operation graph with typed handles
//! 4. [`assembler`]: the batch entry point tying the three together
//!
//! [`status`] classifies outputs by their unlock conditions so callers can
//! filter a batch before building it.
//!
//! # Example
//!
//! ```ignore
//! use stardust_migration_core::{build_migration, MigrationConfig};
//! use stardust_transport::JsonRpcClient;
//!
//! let client = JsonRpcClient::from_env();
//! let config = MigrationConfig::from_env()?;
//! let graph = build_migration(&client, &config, destination, &basic, &nft).await?;
//! println!("{}", graph.to_programmable_transaction().to_json_pretty()?);
//! ```

pub mod assembler;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod resolver;
pub mod source;
pub mod status;
pub mod validator;

pub use assembler::{build_migration, MigrationAssembler};
pub use builder::MigrationGraphBuilder;
pub use config::MigrationConfig;
pub use error::{GraphError, GraphViolation, MigrationError, ValidationError, ViolationKind};
pub use graph::{Argument, GraphBuilder, GraphInput, MigrationGraph, Operation};
pub use output::{
    BasicOutput, CommonOutput, ExpirationUnlockCondition, NativeTokenBag, NftOutput, OutputKind,
    StardustOutput, StorageDepositReturnUnlockCondition, TimelockUnlockCondition, UnlockCondition,
    UnlockConditions,
};
pub use resolver::NativeTokenResolver;
pub use source::{DynamicFieldSource, ObjectSource};
pub use status::{
    classify, group_by_migration_status, GroupedOutputs, MigrationStatus, UnmigratableReason,
};
pub use validator::{validate_basic_output, validate_nft_output, OutputValidator};
