//! Collaborator traits for reading chain state.
//!
//! The migration only needs two reads: an object by id and one page of a
//! parent's dynamic fields. Both are traits so the resolver and CLI can be
//! driven by the JSON-RPC client in production and by in-memory fakes in
//! tests.

use anyhow::{Context, Result};
use async_trait::async_trait;

use stardust_migration_types::{DynamicFieldPage, ObjectData, ObjectID};
use stardust_transport::JsonRpcClient;

/// Source of full objects with content.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch an object; `Ok(None)` if it does not exist.
    async fn fetch_object(&self, id: &ObjectID) -> Result<Option<ObjectData>>;
}

/// Source of dynamic-field pages.
#[async_trait]
pub trait DynamicFieldSource: Send + Sync {
    /// Fetch one page of `parent`'s dynamic fields starting at `cursor`.
    async fn dynamic_fields_page(
        &self,
        parent: &ObjectID,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<DynamicFieldPage>;
}

#[async_trait]
impl ObjectSource for JsonRpcClient {
    async fn fetch_object(&self, id: &ObjectID) -> Result<Option<ObjectData>> {
        let client = self.clone();
        let id = id.to_hex_literal();
        tokio::task::spawn_blocking(move || client.fetch_object(&id))
            .await
            .context("object fetch task panicked")?
    }
}

#[async_trait]
impl DynamicFieldSource for JsonRpcClient {
    async fn dynamic_fields_page(
        &self,
        parent: &ObjectID,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<DynamicFieldPage> {
        let client = self.clone();
        let parent = parent.to_hex_literal();
        tokio::task::spawn_blocking(move || {
            client.dynamic_fields_page(&parent, cursor.as_deref(), limit)
        })
        .await
        .context("dynamic field fetch task panicked")?
    }
}

#[async_trait]
impl<T: DynamicFieldSource + ?Sized> DynamicFieldSource for std::sync::Arc<T> {
    async fn dynamic_fields_page(
        &self,
        parent: &ObjectID,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<DynamicFieldPage> {
        (**self).dynamic_fields_page(parent, cursor, limit).await
    }
}

#[async_trait]
impl<T: ObjectSource + ?Sized> ObjectSource for std::sync::Arc<T> {
    async fn fetch_object(&self, id: &ObjectID) -> Result<Option<ObjectData>> {
        (**self).fetch_object(id).await
    }
}
