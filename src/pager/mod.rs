//! Generic cursor pagination.
//!
//! One pager drives every listing context; the contexts differ only in
//! the [`PageStrategy`] they plug in. A strategy consumes an immutable
//! [`PageContext`] and yields the page plus the context for the next
//! call. End of list is inferred heuristically: a page shorter than the
//! requested limit is taken as the last one.

pub mod strategies;

use async_trait::async_trait;

use crate::app::Result;

/// Immutable snapshot of cursor state. Consumed whole on every call;
/// offsets never move backwards within one browse session.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub endpoint: String,
    pub query: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl PageContext {
    pub fn first(endpoint: impl Into<String>, query: Option<String>, limit: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            query,
            limit,
            offset: 0,
        }
    }

    /// The context for the page after this one; the offset advances by
    /// exactly the configured limit.
    pub fn advance(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            ..self.clone()
        }
    }

    /// Move to a different logical endpoint, restarting its cursor.
    pub fn switch_to(&self, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            offset: 0,
            ..self.clone()
        }
    }
}

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

#[async_trait]
pub trait PageStrategy<T>: Send + Sync {
    /// Fetch one page: `(items, has_more, next context)`.
    async fn fetch_page(&self, ctx: &PageContext) -> Result<(Vec<T>, bool, PageContext)>;
}

pub struct Pager<T> {
    strategy: Box<dyn PageStrategy<T>>,
    ctx: PageContext,
    exhausted: bool,
}

impl<T> Pager<T> {
    pub fn new(strategy: Box<dyn PageStrategy<T>>, ctx: PageContext) -> Self {
        Self {
            strategy,
            ctx,
            exhausted: false,
        }
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Fetch the next page. Transport and shape failures degrade to an
    /// empty final page so browsing never aborts the host UI; anything
    /// else propagates.
    pub async fn next_page(&mut self) -> Result<Page<T>> {
        if self.exhausted {
            return Ok(Page::empty());
        }

        match self.strategy.fetch_page(&self.ctx).await {
            Ok((items, has_more, next)) => {
                debug_assert!(next.offset >= self.ctx.offset);
                self.ctx = next;
                self.exhausted = !has_more;
                Ok(Page { items, has_more })
            }
            Err(e) if e.is_listing_recoverable() => {
                tracing::warn!("listing degraded to an empty page: {e}");
                self.exhausted = true;
                Ok(Page::empty())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AuricleError;

    /// Serves `total` numbered items in `limit`-sized pages.
    struct Numbers {
        total: usize,
    }

    #[async_trait]
    impl PageStrategy<usize> for Numbers {
        async fn fetch_page(&self, ctx: &PageContext) -> Result<(Vec<usize>, bool, PageContext)> {
            let end = (ctx.offset + ctx.limit).min(self.total);
            let items: Vec<usize> = (ctx.offset..end).collect();
            let has_more = items.len() == ctx.limit;
            Ok((items, has_more, ctx.advance()))
        }
    }

    struct Failing;

    #[async_trait]
    impl PageStrategy<usize> for Failing {
        async fn fetch_page(&self, ctx: &PageContext) -> Result<(Vec<usize>, bool, PageContext)> {
            let _ = ctx;
            Err(AuricleError::Status(500, "https://example.org".into()))
        }
    }

    #[tokio::test]
    async fn test_offset_advances_by_limit_until_exhausted() {
        let mut pager = Pager::new(
            Box::new(Numbers { total: 7 }),
            PageContext::first("numbers", None, 3),
        );

        let first = pager.next_page().await.unwrap();
        assert_eq!(first.items, vec![0, 1, 2]);
        assert!(first.has_more);

        let second = pager.next_page().await.unwrap();
        assert_eq!(second.items, vec![3, 4, 5]);
        assert!(second.has_more);

        let third = pager.next_page().await.unwrap();
        assert_eq!(third.items, vec![6]);
        assert!(!third.has_more);
        assert!(!pager.has_more());
    }

    #[tokio::test]
    async fn test_exhausted_pager_stays_empty() {
        let mut pager = Pager::new(
            Box::new(Numbers { total: 2 }),
            PageContext::first("numbers", None, 3),
        );

        pager.next_page().await.unwrap();
        let after = pager.next_page().await.unwrap();
        assert!(after.items.is_empty());
        assert!(!after.has_more);
    }

    #[tokio::test]
    async fn test_exact_multiple_yields_trailing_empty_page() {
        let mut pager = Pager::new(
            Box::new(Numbers { total: 3 }),
            PageContext::first("numbers", None, 3),
        );

        let first = pager.next_page().await.unwrap();
        assert_eq!(first.items.len(), 3);
        assert!(first.has_more);

        let second = pager.next_page().await.unwrap();
        assert!(second.items.is_empty());
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_empty_page() {
        let mut pager = Pager::new(Box::new(Failing), PageContext::first("x", None, 3));

        let page = pager.next_page().await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert!(!pager.has_more());
    }
}
