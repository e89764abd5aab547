//! Native token resolution.
//!
//! A native-token bag stores one dynamic field per token type, keyed by the
//! type string. [`NativeTokenResolver`] enumerates those keys page by page
//! and returns them in enumeration order.

use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use tracing::debug;

use stardust_migration_types::{DynamicFieldInfo, ObjectID};

use crate::config::MigrationConfig;
use crate::output::NativeTokenBag;
use crate::source::DynamicFieldSource;

/// Lists the token types held by native-token bags.
pub struct NativeTokenResolver<'a, S: ?Sized> {
    source: &'a S,
    page_size: usize,
    max_pages: usize,
}

impl<'a, S: DynamicFieldSource + ?Sized> NativeTokenResolver<'a, S> {
    pub fn new(source: &'a S, config: &MigrationConfig) -> Self {
        Self {
            source,
            page_size: config.dynamic_field_page_size.max(1),
            max_pages: config.max_pages.max(1),
        }
    }

    /// Token types of a bag, skipping the lookup when the bag is empty.
    ///
    /// Fails when the number of entries found differs from the bag's size.
    pub async fn resolve_bag(&self, bag: &NativeTokenBag) -> Result<Vec<String>> {
        if bag.is_empty() {
            return Ok(Vec::new());
        }
        let types = self.resolve_token_types(&bag.id).await?;
        if types.len() as u64 != bag.size {
            bail!(
                "native token bag {} declares {} entries but holds {}",
                bag.id.to_hex_literal(),
                bag.size,
                types.len()
            );
        }
        Ok(types)
    }

    /// Enumerate every token type stored in `bag_id`.
    ///
    /// Transport errors are returned unchanged. Fails if the source keeps
    /// reporting further pages beyond the configured page limit.
    pub async fn resolve_token_types(&self, bag_id: &ObjectID) -> Result<Vec<String>> {
        let mut token_types = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 0..self.max_pages {
            let page = self
                .source
                .dynamic_fields_page(bag_id, cursor.take(), self.page_size)
                .await?;
            debug!(
                bag = %bag_id.to_hex_literal(),
                page = page_number,
                entries = page.data.len(),
                "resolved native token page"
            );

            for entry in &page.data {
                token_types.push(token_type_of(entry)?);
            }

            if page.is_terminal() {
                return Ok(token_types);
            }
            cursor = page.next_cursor;
        }

        bail!(
            "native token bag {} still has pages after {} requests",
            bag_id.to_hex_literal(),
            self.max_pages
        )
    }
}

fn token_type_of(entry: &DynamicFieldInfo) -> Result<String> {
    match &entry.name.value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        other => Err(anyhow!(
            "native token entry {} has a non-string key {}",
            entry.object_id,
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stardust_migration_types::DynamicFieldPage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `pages` in order; cursor `n` points to page `n`.
    struct PagedSource {
        pages: Vec<Vec<&'static str>>,
        calls: AtomicUsize,
        endless: bool,
    }

    impl PagedSource {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
                endless: false,
            }
        }
    }

    #[async_trait]
    impl DynamicFieldSource for PagedSource {
        async fn dynamic_fields_page(
            &self,
            _parent: &ObjectID,
            cursor: Option<String>,
            _limit: usize,
        ) -> Result<DynamicFieldPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let data = self
                .pages
                .get(index)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|t| DynamicFieldInfo::with_string_key("0x1::ascii::String", t, "0xdf"))
                .collect();
            let has_next_page = self.endless || index + 1 < self.pages.len();
            Ok(DynamicFieldPage {
                data,
                next_cursor: has_next_page.then(|| (index + 1).to_string()),
                has_next_page,
            })
        }
    }

    fn bag(size: u64) -> NativeTokenBag {
        NativeTokenBag {
            id: ObjectID::from_hex_literal("0xb0b").unwrap(),
            size,
        }
    }

    #[tokio::test]
    async fn test_resolves_across_pages_in_order() {
        let source = PagedSource::new(vec![vec!["0xa::a::A", "0xb::b::B"], vec!["0xc::c::C"]]);
        let resolver = NativeTokenResolver::new(&source, &MigrationConfig::default());
        let types = resolver.resolve_bag(&bag(3)).await.unwrap();
        assert_eq!(types, vec!["0xa::a::A", "0xb::b::B", "0xc::c::C"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_bag_is_not_fetched() {
        let source = PagedSource::new(vec![vec!["0xa::a::A"]]);
        let resolver = NativeTokenResolver::new(&source, &MigrationConfig::default());
        assert!(resolver.resolve_bag(&bag(0)).await.unwrap().is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_size_mismatch_is_error() {
        let source = PagedSource::new(vec![vec!["0xa::a::A"]]);
        let resolver = NativeTokenResolver::new(&source, &MigrationConfig::default());
        let err = resolver.resolve_bag(&bag(2)).await.unwrap_err();
        assert!(err.to_string().contains("declares 2 entries but holds 1"));

        let source = PagedSource::new(vec![vec!["0xa::a::A", "0xb::b::B"]]);
        let resolver = NativeTokenResolver::new(&source, &MigrationConfig::default());
        assert!(resolver.resolve_bag(&bag(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_page_limit() {
        let mut source = PagedSource::new(vec![vec!["0xa::a::A"]]);
        source.endless = true;
        let config = MigrationConfig::default().with_max_pages(3);
        let resolver = NativeTokenResolver::new(&source, &config);
        let err = resolver.resolve_bag(&bag(1)).await.unwrap_err();
        assert!(err.to_string().contains("after 3 requests"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_string_key_is_error() {
        struct NumericKeys;

        #[async_trait]
        impl DynamicFieldSource for NumericKeys {
            async fn dynamic_fields_page(
                &self,
                _parent: &ObjectID,
                _cursor: Option<String>,
                _limit: usize,
            ) -> Result<DynamicFieldPage> {
                let mut entry = DynamicFieldInfo::with_string_key("u64", "x", "0xdf");
                entry.name.value = serde_json::json!(7);
                Ok(DynamicFieldPage {
                    data: vec![entry],
                    next_cursor: None,
                    has_next_page: false,
                })
            }
        }

        let resolver = NativeTokenResolver::new(&NumericKeys, &MigrationConfig::default());
        let err = resolver.resolve_bag(&bag(1)).await.unwrap_err();
        assert!(err.to_string().contains("non-string key"));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        struct Failing;

        #[async_trait]
        impl DynamicFieldSource for Failing {
            async fn dynamic_fields_page(
                &self,
                _parent: &ObjectID,
                _cursor: Option<String>,
                _limit: usize,
            ) -> Result<DynamicFieldPage> {
                bail!("503 Service Unavailable")
            }
        }

        let resolver = NativeTokenResolver::new(&Failing, &MigrationConfig::default());
        let err = resolver.resolve_bag(&bag(2)).await.unwrap_err();
        assert_eq!(err.to_string(), "503 Service Unavailable");
    }
}
