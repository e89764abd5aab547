//! Endpoint resolution for the public IOTA networks.

const MAINNET_RPC: &str = "https://api.mainnet.iota.cafe";
const TESTNET_RPC: &str = "https://api.testnet.iota.cafe";
const DEVNET_RPC: &str = "https://api.devnet.iota.cafe";

/// Env var overriding the JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "IOTA_RPC_URL";

pub fn infer_network_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("devnet") {
        Some("devnet")
    } else if lower.contains("mainnet") {
        Some("mainnet")
    } else {
        None
    }
}

pub fn default_rpc_endpoint(network: &str) -> String {
    match network {
        "testnet" => TESTNET_RPC.to_string(),
        "devnet" => DEVNET_RPC.to_string(),
        _ => MAINNET_RPC.to_string(),
    }
}

/// Resolve the JSON-RPC endpoint.
///
/// An explicit URL wins, then `IOTA_RPC_URL`, then a bare network name
/// (`mainnet`, `testnet`, `devnet`) passed as the explicit value, then mainnet.
pub fn resolve_rpc_endpoint(explicit: Option<&str>) -> String {
    if let Some(value) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        if value.contains("://") {
            return value.to_string();
        }
        return default_rpc_endpoint(value);
    }

    if let Some(value) = stardust_migration_types::env_utils::env_string(RPC_URL_ENV) {
        return value;
    }

    MAINNET_RPC.to_string()
}
