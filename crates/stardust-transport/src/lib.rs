//! IOTA Transport Layer
//!
//! Blocking network access for the Stardust migration tooling.
//!
//! This crate provides:
//! - [`jsonrpc`]: JSON-RPC client for objects, dynamic fields and owned objects
//! - [`pagination`]: Cursor paginator shared by the list endpoints
//! - [`network`]: Endpoint resolution from flags, env and network names
//!
//! # Example
//!
//! ```ignore
//! use stardust_transport::JsonRpcClient;
//!
//! let client = JsonRpcClient::from_env();
//! let output = client.fetch_object("0x...")?;
//! let bag = client.dynamic_fields_page("0x...", None, 50)?;
//! ```

pub mod jsonrpc;
pub mod network;
pub mod pagination;

// Re-export main types for convenience
pub use jsonrpc::JsonRpcClient;
pub use network::resolve_rpc_endpoint;
pub use pagination::{PageInfo, Paginator};
