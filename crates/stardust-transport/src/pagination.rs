//! Cursor pagination for JSON-RPC list endpoints.
//!
//! `iotax_getDynamicFields` and `iotax_getOwnedObjects` both return
//! `{ data, nextCursor, hasNextPage }`. [`Paginator`] drives such an endpoint
//! until it reports the last page, returns an empty page, or a total limit
//! is reached.
//!
//! ```ignore
//! let paginator = Paginator::new(1_000, |cursor, page_size| {
//!     client.owned_objects_page(owner, struct_type, cursor, page_size)
//!         .map(|page| (page.data, PageInfo::new(page.has_next_page, page.next_cursor)))
//! });
//! let all = paginator.collect_all()?;
//! ```

use anyhow::Result;

/// Maximum items per JSON-RPC page (node-side limit).
pub const MAX_PAGE_SIZE: usize = 50;

/// Pagination state reported alongside a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

impl PageInfo {
    pub fn new(has_next_page: bool, next_cursor: Option<String>) -> Self {
        Self {
            has_next_page,
            next_cursor,
        }
    }

    /// Whether the endpoint has nothing after this page.
    pub fn is_last(&self) -> bool {
        !self.has_next_page || self.next_cursor.is_none()
    }
}

/// Generic forward paginator over a cursor-based fetch function.
pub struct Paginator<T, F>
where
    F: FnMut(Option<&str>, usize) -> Result<(Vec<T>, PageInfo)>,
{
    total_limit: usize,
    page_size: usize,
    fetch_fn: F,
    cursor: Option<String>,
    collected: usize,
    pages: usize,
    exhausted: bool,
    _marker: std::marker::PhantomData<T>,
}

impl<T, F> Paginator<T, F>
where
    F: FnMut(Option<&str>, usize) -> Result<(Vec<T>, PageInfo)>,
{
    /// Create a new paginator.
    ///
    /// - `total_limit`: Maximum total items to fetch across all pages
    /// - `fetch_fn`: Function that fetches a page given (cursor, page_size)
    pub fn new(total_limit: usize, fetch_fn: F) -> Self {
        Self {
            total_limit,
            page_size: MAX_PAGE_SIZE,
            fetch_fn,
            cursor: None,
            collected: 0,
            pages: 0,
            exhausted: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set a custom page size (clamped to `1..=MAX_PAGE_SIZE`).
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Fetch the next page of results.
    pub fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.exhausted || self.collected >= self.total_limit {
            return Ok(None);
        }

        let remaining = self.total_limit - self.collected;
        let page_size = remaining.min(self.page_size);

        let (items, page_info) = (self.fetch_fn)(self.cursor.as_deref(), page_size)?;
        self.pages += 1;

        // An empty page ends pagination even if the node offers a cursor.
        if items.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        if page_info.is_last() {
            self.exhausted = true;
        } else {
            self.cursor = page_info.next_cursor;
        }

        self.collected += items.len();
        Ok(Some(items))
    }

    /// Collect all pages into a single vector.
    pub fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all_items = Vec::new();

        while let Some(page) = self.next_page()? {
            all_items.extend(page);
        }

        all_items.truncate(self.total_limit);
        Ok(all_items)
    }
}
