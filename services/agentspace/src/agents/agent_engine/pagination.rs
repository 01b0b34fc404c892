//! Cursor pagination with a page ceiling
//!
//! Google list APIs return a `nextPageToken` until the listing is done. A
//! buggy or adversarial server can keep handing out tokens, so listing stops
//! after `max_pages` and marks the result as truncated.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Anything that can fetch a page given a continuation token
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, page_token: Option<&str>, page_size: u32) -> Result<Page<Self::Item>>;
}

#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// All items collected from a listing
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
    /// More pages existed past `max_pages`
    pub truncated: bool,
}

/// Follow page tokens until exhausted or the page ceiling is hit
pub async fn collect_pages<S: PageSource>(source: &S, limits: PageLimits) -> Result<Paged<S::Item>> {
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages_fetched = 0;

    loop {
        if pages_fetched >= limits.max_pages {
            warn!(
                max_pages = limits.max_pages,
                "Reached maximum page limit; there may be more items not shown"
            );
            return Ok(Paged {
                items,
                pages_fetched,
                truncated: true,
            });
        }

        pages_fetched += 1;
        debug!(page = pages_fetched, "Fetching page");

        let page = source.fetch_page(token.as_deref(), limits.page_size).await?;
        items.extend(page.items);

        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }

    debug!(pages = pages_fetched, items = items.len(), "Listing complete");
    Ok(Paged {
        items,
        pages_fetched,
        truncated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves `pages` pages of `per_page` numbers, or never ends
    struct CountingSource {
        pages: Option<u32>,
        per_page: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PageSource for CountingSource {
        type Item = u32;

        async fn fetch_page(&self, page_token: Option<&str>, _page_size: u32) -> Result<Page<u32>> {
            let index: u32 = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            self.calls.fetch_add(1, Ordering::SeqCst);

            let items = (0..self.per_page).map(|i| index * self.per_page + i).collect();
            let next = match self.pages {
                Some(total) if index + 1 >= total => Some(String::new()),
                _ => Some((index + 1).to_string()),
            };
            Ok(Page {
                items,
                next_page_token: next,
            })
        }
    }

    #[tokio::test]
    async fn test_collects_until_token_empty() {
        let source = CountingSource {
            pages: Some(3),
            per_page: 2,
            calls: AtomicU32::new(0),
        };

        let paged = collect_pages(&source, PageLimits::default()).await.unwrap();
        assert_eq!(paged.items, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(paged.pages_fetched, 3);
        assert!(!paged.truncated);
    }

    #[tokio::test]
    async fn test_stops_at_page_ceiling() {
        let source = CountingSource {
            pages: None,
            per_page: 1,
            calls: AtomicU32::new(0),
        };

        let limits = PageLimits {
            page_size: 1,
            max_pages: 4,
        };
        let paged = collect_pages(&source, limits).await.unwrap();

        assert!(paged.truncated);
        assert_eq!(paged.pages_fetched, 4);
        assert_eq!(paged.items.len(), 4);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_last_page_exactly_at_ceiling_not_truncated() {
        let source = CountingSource {
            pages: Some(2),
            per_page: 1,
            calls: AtomicU32::new(0),
        };
        let limits = PageLimits {
            page_size: 1,
            max_pages: 2,
        };

        let paged = collect_pages(&source, limits).await.unwrap();
        assert!(!paged.truncated);
        assert_eq!(paged.items, vec![0, 1]);
    }
}
