#![allow(dead_code, unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: Output payload builders in the JSON-RPC object shape
//! - `mocks`: In-memory dynamic-field source with call accounting

pub mod fixtures;
pub mod mocks;

pub use fixtures::{addr, basic_output, nft_output, OutputFixture};
pub use mocks::MockBagSource;
