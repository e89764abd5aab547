//! Blocking JSON-RPC client for IOTA full nodes.
//!
//! Covers the four reads the migration needs:
//! - `iota_getObject` with content
//! - `iotax_getDynamicFields` (one page)
//! - `iotax_getOwnedObjects` filtered by struct type (one page or all pages)
//! - `iotax_getLatestIotaSystemState` for the current epoch start timestamp
//!
//! Transport failures (connection errors, timeouts, HTTP 429/5xx) are retried
//! according to the client's [`RetryConfig`]. JSON-RPC error objects are
//! returned as-is without retrying.
//!
//! ## Usage
//!
//! ```ignore
//! let client = JsonRpcClient::from_env();
//! let obj = client.fetch_object("0x...")?;
//! let page = client.dynamic_fields_page("0x...", None, 50)?;
//! ```

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use stardust_migration_types::env_utils::env_var_or;
use stardust_migration_types::{
    DynamicFieldPage, ObjectData, ObjectResponse, OwnedObjectsPage, RetryConfig,
};

use crate::network::resolve_rpc_endpoint;
use crate::pagination::{PageInfo, Paginator};

/// JSON-RPC client for IOTA network queries.
#[derive(Clone)]
pub struct JsonRpcClient {
    endpoint: String,
    agent: ureq::Agent,
    retry: RetryConfig,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("endpoint", &self.endpoint)
            .field("retry", &self.retry)
            .finish()
    }
}

impl JsonRpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        let timeout_secs = env_var_or("IOTA_RPC_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS);
        let connect_secs = env_var_or(
            "IOTA_RPC_CONNECT_TIMEOUT_SECS",
            Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        );
        (
            Duration::from_secs(timeout_secs),
            Duration::from_secs(connect_secs),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Create a client for the endpoint named by `IOTA_RPC_URL`, or mainnet.
    pub fn from_env() -> Self {
        Self::new(&resolve_rpc_endpoint(None))
    }

    /// Create a client with a custom endpoint.
    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
            retry: RetryConfig::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a JSON-RPC call and return its `result`.
    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut attempt = 0usize;
        let response: Value = loop {
            match self
                .agent
                .post(&self.endpoint)
                .set("Content-Type", "application/json")
                .send_json(&body)
            {
                Ok(resp) => {
                    break resp
                        .into_json()
                        .with_context(|| format!("Failed to parse {} response", method))?
                }
                Err(e) if attempt < self.retry.retries && is_retryable(&e) => {
                    let backoff = self.retry.backoff_for(attempt);
                    warn!(
                        method,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "JSON-RPC request failed, retrying"
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                Err(e) => return Err(anyhow!("{} request failed: {}", method, e)),
            }
        };

        if let Some(error) = response.get("error") {
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(anyhow!("{} failed with JSON-RPC error {}: {}", method, code, msg));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("No result in {} response", method))
    }

    fn call_typed<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let result = self.call(method, params)?;
        serde_json::from_value(result).with_context(|| format!("Malformed {} result", method))
    }

    /// Fetch an object with its parsed content.
    ///
    /// Returns `Ok(None)` if the node reports that the object does not exist
    /// or was deleted.
    pub fn fetch_object(&self, object_id: &str) -> Result<Option<ObjectData>> {
        let response: ObjectResponse = self.call_typed(
            "iota_getObject",
            json!([object_id, { "showType": true, "showOwner": true, "showContent": true }]),
        )?;

        if let Some(error) = response.error {
            let code = error.get("code").and_then(|c| c.as_str()).unwrap_or("");
            if matches!(code, "notExists" | "deleted") {
                debug!(object_id, code, "object not found");
                return Ok(None);
            }
            return Err(anyhow!("iota_getObject error for {}: {}", object_id, error));
        }

        Ok(response.data)
    }

    /// Fetch one page of the dynamic fields of `parent_id`.
    pub fn dynamic_fields_page(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<DynamicFieldPage> {
        let page: DynamicFieldPage = self.call_typed(
            "iotax_getDynamicFields",
            json!([parent_id, cursor, limit]),
        )?;
        debug!(
            parent_id,
            entries = page.data.len(),
            has_next_page = page.has_next_page,
            "fetched dynamic field page"
        );
        Ok(page)
    }

    /// Fetch one page of objects owned by `owner` whose type is `struct_type`.
    pub fn owned_objects_page(
        &self,
        owner: &str,
        struct_type: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<OwnedObjectsPage> {
        self.call_typed(
            "iotax_getOwnedObjects",
            json!([
                owner,
                {
                    "filter": { "StructType": struct_type },
                    "options": { "showType": true, "showOwner": true, "showContent": true }
                },
                cursor,
                limit
            ]),
        )
    }

    /// Fetch every object owned by `owner` of type `struct_type`, up to `limit`.
    pub fn owned_objects_of_type(
        &self,
        owner: &str,
        struct_type: &str,
        limit: usize,
    ) -> Result<Vec<ObjectData>> {
        let mut paginator = Paginator::new(limit, |cursor, page_size| {
            let page = self.owned_objects_page(owner, struct_type, cursor, page_size)?;
            let info = PageInfo::new(page.has_next_page, page.next_cursor);
            Ok((page.data, info))
        });
        let mut objects = Vec::new();
        while let Some(page) = paginator.next_page()? {
            objects.extend(page.into_iter().filter_map(|r| r.data));
        }
        debug!(
            owner,
            struct_type,
            count = objects.len(),
            pages = paginator.pages_fetched(),
            "fetched owned objects"
        );
        Ok(objects)
    }

    /// Start timestamp of the current epoch in milliseconds.
    pub fn current_epoch_start_ms(&self) -> Result<u64> {
        let state = self.call("iotax_getLatestIotaSystemState", json!([]))?;
        let raw = state
            .get("epochStartTimestampMs")
            .ok_or_else(|| anyhow!("system state has no epochStartTimestampMs"))?;
        match raw {
            Value::String(s) => s
                .parse::<u64>()
                .with_context(|| format!("invalid epochStartTimestampMs '{}'", s)),
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| anyhow!("invalid epochStartTimestampMs {}", n)),
            other => Err(anyhow!("invalid epochStartTimestampMs {}", other)),
        }
    }
}

/// Transport-level failures and throttling are worth another attempt;
/// other HTTP statuses are not.
fn is_retryable(error: &ureq::Error) -> bool {
    match error {
        ureq::Error::Status(code, _) => *code == 429 || *code >= 500,
        ureq::Error::Transport(_) => true,
    }
}
