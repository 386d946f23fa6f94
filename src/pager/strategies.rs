//! The four listing contexts, as strategy values for the generic pager.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{ApiBook, ApiClient, ApiPerson, ApiSection};
use crate::app::Result;
use crate::cache::CacheState;
use crate::domain::{Author, CatalogEntry};
use crate::normalizer::{BookRecord, Normalizer};
use crate::pager::{PageContext, PageStrategy};

pub const HOME_LATEST: &str = "latest";
pub const HOME_CATALOG: &str = "catalog";
pub const SEARCH_BOOKS: &str = "search-books";
pub const SEARCH_AUTHORS: &str = "search-authors";
pub const AUTHOR_BOOKS: &str = "author-books";
pub const READER_SECTIONS: &str = "reader-sections";

/// Home feed: the latest-releases endpoint once, recording every id in
/// the dedup set, then the general catalog filtered against that set so
/// nothing is shown twice.
pub struct HomeStrategy {
    client: Arc<ApiClient>,
    normalizer: Normalizer,
    state: Arc<Mutex<CacheState>>,
}

impl HomeStrategy {
    pub fn new(
        client: Arc<ApiClient>,
        normalizer: Normalizer,
        state: Arc<Mutex<CacheState>>,
    ) -> Self {
        Self {
            client,
            normalizer,
            state,
        }
    }
}

#[async_trait]
impl PageStrategy<CatalogEntry> for HomeStrategy {
    async fn fetch_page(
        &self,
        ctx: &PageContext,
    ) -> Result<(Vec<CatalogEntry>, bool, PageContext)> {
        if ctx.endpoint == HOME_LATEST {
            let url = self.client.endpoints.latest(ctx.limit);
            let raw: Vec<ApiBook> = self.client.list(&url).await?;
            let entries: Vec<CatalogEntry> = raw
                .into_iter()
                .map(|b| self.normalizer.normalize_book(BookRecord::Api(b)))
                .collect();

            let mut state = self.state.lock().expect("state mutex poisoned");
            for entry in &entries {
                state.mark_latest(&entry.id);
            }
            drop(state);

            return Ok((entries, true, ctx.switch_to(HOME_CATALOG)));
        }

        let url = self.client.endpoints.catalog(ctx.offset, ctx.limit);
        let raw: Vec<ApiBook> = self.client.list(&url).await?;
        let has_more = raw.len() == ctx.limit;

        let state = self.state.lock().expect("state mutex poisoned");
        let items = raw
            .into_iter()
            .map(|b| self.normalizer.normalize_book(BookRecord::Api(b)))
            .filter(|entry| !state.is_latest(&entry.id))
            .collect();
        drop(state);

        Ok((items, has_more, ctx.advance()))
    }
}

/// Free-text book search. Entries without a resolvable detail URL are
/// in-progress catalog stubs and are dropped before normalization.
pub struct SearchStrategy {
    client: Arc<ApiClient>,
    normalizer: Normalizer,
}

impl SearchStrategy {
    pub fn new(client: Arc<ApiClient>, normalizer: Normalizer) -> Self {
        Self { client, normalizer }
    }
}

#[async_trait]
impl PageStrategy<CatalogEntry> for SearchStrategy {
    async fn fetch_page(
        &self,
        ctx: &PageContext,
    ) -> Result<(Vec<CatalogEntry>, bool, PageContext)> {
        let query = ctx.query.as_deref().unwrap_or_default();
        let url = self
            .client
            .endpoints
            .search_books(query, ctx.offset, ctx.limit);

        let mut raw: Vec<ApiBook> = self.client.list(&url).await?;
        let has_more = raw.len() == ctx.limit;
        raw.retain(|book| book.url.is_some() || book.slug.is_some());

        let items = raw
            .into_iter()
            .map(|b| self.normalizer.normalize_book(BookRecord::Api(b)))
            .collect();

        Ok((items, has_more, ctx.advance()))
    }
}

/// An author's books. The endpoint does not guarantee order, so pages
/// are sorted client-side by descending numeric id.
pub struct AuthorBooksStrategy {
    client: Arc<ApiClient>,
    normalizer: Normalizer,
    author_id: u64,
}

impl AuthorBooksStrategy {
    pub fn new(client: Arc<ApiClient>, normalizer: Normalizer, author_id: u64) -> Self {
        Self {
            client,
            normalizer,
            author_id,
        }
    }
}

#[async_trait]
impl PageStrategy<CatalogEntry> for AuthorBooksStrategy {
    async fn fetch_page(
        &self,
        ctx: &PageContext,
    ) -> Result<(Vec<CatalogEntry>, bool, PageContext)> {
        let url = self
            .client
            .endpoints
            .author_books(self.author_id, ctx.offset, ctx.limit);

        let mut raw: Vec<ApiBook> = self.client.list(&url).await?;
        let has_more = raw.len() == ctx.limit;
        raw.sort_by_key(|book| std::cmp::Reverse(book.id.unwrap_or(0)));

        let items = raw
            .into_iter()
            .map(|b| self.normalizer.normalize_book(BookRecord::Api(b)))
            .collect();

        Ok((items, has_more, ctx.advance()))
    }
}

/// A reader's catalog. The endpoint ships either flat book records or
/// individual narrated sections tagged with their parent book id; the
/// section shape is grouped so each audiobook appears exactly once no
/// matter how many of its sections the reader narrated.
pub struct ReaderSectionsStrategy {
    client: Arc<ApiClient>,
    normalizer: Normalizer,
    reader_id: u64,
}

impl ReaderSectionsStrategy {
    pub fn new(client: Arc<ApiClient>, normalizer: Normalizer, reader_id: u64) -> Self {
        Self {
            client,
            normalizer,
            reader_id,
        }
    }
}

#[async_trait]
impl PageStrategy<CatalogEntry> for ReaderSectionsStrategy {
    async fn fetch_page(
        &self,
        ctx: &PageContext,
    ) -> Result<(Vec<CatalogEntry>, bool, PageContext)> {
        let url = self
            .client
            .endpoints
            .reader_sections(self.reader_id, ctx.offset, ctx.limit);

        let raw: Vec<serde_json::Value> = self.client.list(&url).await?;
        let has_more = raw.len() == ctx.limit;

        let shaped_as_sections = raw.iter().any(|v| v.get("audiobook_id").is_some());
        let books: Vec<ApiBook> = if shaped_as_sections {
            let sections: Vec<ApiSection> = raw
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect();
            group_sections(sections)
        } else {
            raw.into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect()
        };

        let items = books
            .into_iter()
            .map(|b| self.normalizer.normalize_book(BookRecord::Api(b)))
            .collect();

        Ok((items, has_more, ctx.advance()))
    }
}

/// Collapse narrated sections into one book entry per `audiobook_id`,
/// keeping first-appearance order.
fn group_sections(sections: Vec<ApiSection>) -> Vec<ApiBook> {
    let mut order: Vec<u64> = Vec::new();
    let mut grouped: HashMap<u64, ApiBook> = HashMap::new();

    for section in sections {
        let Some(book_id) = section.audiobook_id else {
            continue;
        };
        grouped.entry(book_id).or_insert_with(|| ApiBook {
            id: Some(book_id),
            title: section.audiobook_title.clone(),
            url: section.audiobook_url.clone(),
            image_thumb: section.audiobook_image.clone(),
            ..Default::default()
        });
        if !order.contains(&book_id) {
            order.push(book_id);
        }
    }

    order
        .into_iter()
        .filter_map(|id| grouped.remove(&id))
        .collect()
}

/// Author search, yielding author entities rather than books.
pub struct AuthorSearchStrategy {
    client: Arc<ApiClient>,
    normalizer: Normalizer,
}

impl AuthorSearchStrategy {
    pub fn new(client: Arc<ApiClient>, normalizer: Normalizer) -> Self {
        Self { client, normalizer }
    }
}

#[async_trait]
impl PageStrategy<Author> for AuthorSearchStrategy {
    async fn fetch_page(&self, ctx: &PageContext) -> Result<(Vec<Author>, bool, PageContext)> {
        let query = ctx.query.as_deref().unwrap_or_default();
        let url = self
            .client
            .endpoints
            .search_authors(query, ctx.offset, ctx.limit);

        let raw: Vec<ApiPerson> = self.client.list(&url).await?;
        let has_more = raw.len() == ctx.limit;

        let items = raw
            .into_iter()
            .map(|p| self.normalizer.normalize_author(p))
            .collect();

        Ok((items, has_more, ctx.advance()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoints;
    use crate::fetcher::mock::MockFetcher;
    use crate::pager::Pager;
    use url::Url;

    fn client(fetcher: MockFetcher) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(
            Arc::new(fetcher),
            Endpoints::new("https://example.org").unwrap(),
        ))
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(Url::parse("https://example.org").unwrap())
    }

    fn books_json(ids: &[u64]) -> String {
        let items: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"id": {id}, "title": "Book {id}", "url": "/book-{id}/"}}"#))
            .collect();
        format!(r#"{{"items": [{}]}}"#, items.join(","))
    }

    #[tokio::test]
    async fn test_home_feed_dedups_latest_releases() {
        let fetcher = MockFetcher::new()
            .route(
                "https://example.org/api/books/latest?limit=3",
                200,
                &books_json(&[1, 2]),
            )
            .route(
                "https://example.org/api/books?offset=0&limit=3",
                200,
                &books_json(&[2, 3, 4]),
            )
            .route(
                "https://example.org/api/books?offset=3&limit=3",
                200,
                &books_json(&[5]),
            );

        let state = Arc::new(Mutex::new(CacheState::default()));
        let strategy = HomeStrategy::new(client(fetcher), normalizer(), state.clone());
        let mut pager = Pager::new(Box::new(strategy), PageContext::first(HOME_LATEST, None, 3));

        let latest = pager.next_page().await.unwrap();
        let latest_ids: Vec<&str> = latest.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(latest_ids, vec!["1", "2"]);
        assert!(latest.has_more);

        let first_catalog = pager.next_page().await.unwrap();
        let catalog_ids: Vec<&str> = first_catalog.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(catalog_ids, vec!["3", "4"], "id 2 must not be shown twice");
        assert!(first_catalog.has_more);

        let second_catalog = pager.next_page().await.unwrap();
        assert_eq!(second_catalog.items.len(), 1);
        assert!(!second_catalog.has_more);

        assert_eq!(state.lock().unwrap().latest_release_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_search_drops_entries_without_detail_url() {
        let body = r#"{"items": [
            {"id": 1, "title": "Finished", "url": "/finished/"},
            {"id": 2, "title": "In progress"}
        ]}"#;
        let fetcher = MockFetcher::new().route(
            "https://example.org/api/books/search?q=whale&offset=0&limit=2",
            200,
            body,
        );

        let strategy = SearchStrategy::new(client(fetcher), normalizer());
        let mut pager = Pager::new(
            Box::new(strategy),
            PageContext::first(SEARCH_BOOKS, Some("whale".into()), 2),
        );

        let page = pager.next_page().await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Finished");
        // has_more reflects the upstream count, not the filtered one.
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_author_books_sorted_by_descending_id() {
        let fetcher = MockFetcher::new().route(
            "https://example.org/api/author/142/books?offset=0&limit=10",
            200,
            &books_json(&[3, 9, 5]),
        );

        let strategy = AuthorBooksStrategy::new(client(fetcher), normalizer(), 142);
        let mut pager = Pager::new(
            Box::new(strategy),
            PageContext::first(AUTHOR_BOOKS, None, 10),
        );

        let page = pager.next_page().await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "5", "3"]);
    }

    #[tokio::test]
    async fn test_reader_sections_grouped_per_audiobook() {
        let body = r#"{"items": [
            {"id": 10, "audiobook_id": 7, "audiobook_title": "Moby Dick", "audiobook_url": "/moby-dick/"},
            {"id": 11, "audiobook_id": 7, "audiobook_title": "Moby Dick", "audiobook_url": "/moby-dick/"},
            {"id": 12, "audiobook_id": 9, "audiobook_title": "Typee", "audiobook_url": "/typee/"}
        ]}"#;
        let fetcher = MockFetcher::new().route(
            "https://example.org/api/reader/88/sections?offset=0&limit=10",
            200,
            body,
        );

        let strategy = ReaderSectionsStrategy::new(client(fetcher), normalizer(), 88);
        let mut pager = Pager::new(
            Box::new(strategy),
            PageContext::first(READER_SECTIONS, None, 10),
        );

        let page = pager.next_page().await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "9"]);
        assert_eq!(page.items[0].title, "Moby Dick");
    }

    #[tokio::test]
    async fn test_reader_flat_book_shape_passes_through() {
        let fetcher = MockFetcher::new().route(
            "https://example.org/api/reader/88/sections?offset=0&limit=10",
            200,
            &books_json(&[4, 6]),
        );

        let strategy = ReaderSectionsStrategy::new(client(fetcher), normalizer(), 88);
        let mut pager = Pager::new(
            Box::new(strategy),
            PageContext::first(READER_SECTIONS, None, 10),
        );

        let page = pager.next_page().await.unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_listing_degrades_on_transport_failure() {
        // Nothing routed: the search endpoint answers 404.
        let strategy = SearchStrategy::new(client(MockFetcher::new()), normalizer());
        let mut pager = Pager::new(
            Box::new(strategy),
            PageContext::first(SEARCH_BOOKS, Some("x".into()), 5),
        );

        let page = pager.next_page().await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_author_search_yields_authors() {
        let body = r#"{"items": [
            {"id": 142, "name": "Herman Melville", "birth_year": 1819, "death_year": 1891}
        ]}"#;
        let fetcher = MockFetcher::new().route(
            "https://example.org/api/authors/search?q=melville&offset=0&limit=5",
            200,
            body,
        );

        let strategy = AuthorSearchStrategy::new(client(fetcher), normalizer());
        let mut pager = Pager::new(
            Box::new(strategy),
            PageContext::first(SEARCH_AUTHORS, Some("melville".into()), 5),
        );

        let page = pager.next_page().await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].lifespan().as_deref(), Some("1819\u{2013}1891"));
    }
}
