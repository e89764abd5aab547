//! In-memory dynamic-field source.
//!
//! Serves each registered bag's token types in pages of the requested size,
//! with the cursor being the index of the next entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stardust_migration::migration::DynamicFieldSource;
use stardust_migration::types::{DynamicFieldInfo, DynamicFieldPage, ObjectID};

#[derive(Default)]
pub struct MockBagSource {
    bags: HashMap<ObjectID, Vec<String>>,
    calls: AtomicUsize,
}

impl MockBagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bag(mut self, bag_id: &str, token_types: &[&str]) -> Self {
        let id = ObjectID::from_hex_literal(bag_id).unwrap();
        self.bags
            .insert(id, token_types.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Pages served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DynamicFieldSource for MockBagSource {
    async fn dynamic_fields_page(
        &self,
        parent: &ObjectID,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<DynamicFieldPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let entries = self
            .bags
            .get(parent)
            .ok_or_else(|| anyhow!("bag {} not found", parent.to_hex_literal()))?;

        let start = match cursor {
            Some(c) => c.parse::<usize>()?,
            None => 0,
        };
        let end = (start + limit.max(1)).min(entries.len());
        let has_next_page = end < entries.len();
        Ok(DynamicFieldPage {
            data: entries[start..end]
                .iter()
                .map(|t| DynamicFieldInfo::with_string_key("0x1::ascii::String", t.as_str(), "0xdf"))
                .collect(),
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }
}
