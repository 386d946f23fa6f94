use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use url::Url;

use crate::api::{ApiClient, Endpoints};
use crate::app::error::{AuricleError, Result};
use crate::audio;
use crate::cache::CacheState;
use crate::config::Config;
use crate::domain::{Author, BookDetail, CatalogEntry, Channel, ChapterDetail};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::pager::strategies::{
    AuthorBooksStrategy, AuthorSearchStrategy, HomeStrategy, ReaderSectionsStrategy,
    SearchStrategy, AUTHOR_BOOKS, HOME_LATEST, READER_SECTIONS, SEARCH_AUTHORS, SEARCH_BOOKS,
};
use crate::pager::{PageContext, Pager};
use crate::resolver::{self, CatalogUrl, Resolver};

/// One browsing session against the configured catalog. Owns the
/// transport, the normalizer and the mutable cache state; every boundary
/// operation is a method here, and state enters and leaves only through
/// [`Session::load_state`] and [`Session::persist_state`].
pub struct Session {
    config: Config,
    client: Arc<ApiClient>,
    normalizer: Normalizer,
    resolver: Resolver,
    state: Arc<Mutex<CacheState>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// Cache counts, for the `state` command.
#[derive(Debug, Clone, Copy)]
pub struct StateSummary {
    pub books: usize,
    pub readers: usize,
    pub authors: usize,
    pub latest_releases: usize,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config.timeout_secs));
        Self::with_fetcher(config, fetcher)
    }

    /// Build a session over an explicit transport.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(AuricleError::Config(
                "base_url is not set; edit the config file".to_string(),
            ));
        }

        let endpoints = Endpoints::new(&config.base_url)?;
        let normalizer = Normalizer::new(endpoints.site().clone());
        let client = Arc::new(ApiClient::new(fetcher, endpoints));
        let resolver = Resolver::new(client.clone(), normalizer.clone());

        Ok(Self {
            config,
            client,
            normalizer,
            resolver,
            state: Arc::new(Mutex::new(CacheState::default())),
        })
    }

    /// Build a session and load a previously persisted state blob.
    pub fn restore(config: Config, persisted: Option<&str>) -> Result<Self> {
        let session = Self::new(config)?;
        session.load_state(persisted);
        Ok(session)
    }

    /// Replace the cache state with a deserialized blob. Absent or
    /// corrupt input leaves an empty state.
    pub fn load_state(&self, persisted: Option<&str>) {
        *self.lock_state() = CacheState::load(persisted);
    }

    pub fn persist_state(&self) -> Result<String> {
        self.lock_state().save()
    }

    pub fn state_summary(&self) -> StateSummary {
        let state = self.lock_state();
        StateSummary {
            books: state.book_details.len(),
            readers: state.readers.len(),
            authors: state.authors.len(),
            latest_releases: state.latest_release_ids.len(),
        }
    }

    fn site(&self) -> &Url {
        self.client.endpoints.site()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().expect("state mutex poisoned")
    }

    pub fn is_book_url(&self, url: &str) -> bool {
        matches!(
            resolver::classify(self.site(), url),
            Ok(CatalogUrl::Book { .. })
        )
    }

    pub fn is_chapter_url(&self, url: &str) -> bool {
        matches!(
            resolver::classify(self.site(), url),
            Ok(CatalogUrl::Chapter { .. })
        )
    }

    pub fn is_channel_url(&self, url: &str) -> bool {
        matches!(
            resolver::classify(self.site(), url),
            Ok(CatalogUrl::AuthorChannel { .. } | CatalogUrl::ReaderChannel { .. })
        )
    }

    pub fn home(&self) -> Pager<CatalogEntry> {
        let strategy = HomeStrategy::new(
            self.client.clone(),
            self.normalizer.clone(),
            self.state.clone(),
        );
        Pager::new(
            Box::new(strategy),
            PageContext::first(HOME_LATEST, None, self.config.page_size),
        )
    }

    pub fn search(&self, query: &str) -> Pager<CatalogEntry> {
        let strategy = SearchStrategy::new(self.client.clone(), self.normalizer.clone());
        Pager::new(
            Box::new(strategy),
            PageContext::first(SEARCH_BOOKS, Some(query.to_string()), self.config.page_size),
        )
    }

    pub fn search_authors(&self, query: &str) -> Pager<Author> {
        let strategy = AuthorSearchStrategy::new(self.client.clone(), self.normalizer.clone());
        Pager::new(
            Box::new(strategy),
            PageContext::first(
                SEARCH_AUTHORS,
                Some(query.to_string()),
                self.config.page_size,
            ),
        )
    }

    /// Resolve a book page URL to its detail, through the cache.
    pub async fn book_detail(&self, url: &str) -> Result<BookDetail> {
        let target = match resolver::classify(self.site(), url)? {
            CatalogUrl::Book { url } => url,
            CatalogUrl::Chapter { book_url, .. } => book_url,
            _ => return Err(AuricleError::UnrecognizedUrl(url.to_string())),
        };

        let key = resolver::canonical_book_key(&target);
        if let Some(detail) = self.lock_state().book(&key) {
            tracing::debug!("detail cache hit for {key}");
            return Ok(detail.clone());
        }

        let resolved = self.resolver.resolve_book(&target).await?;
        self.lock_state().put_book(key, resolved.detail.clone());
        Ok(resolved.detail)
    }

    /// Resolve a chapter URL to the chapter plus its playable sources.
    pub async fn chapter_detail(&self, url: &str) -> Result<ChapterDetail> {
        let (book_url, index) = match resolver::classify(self.site(), url)? {
            CatalogUrl::Chapter { book_url, index } => (book_url, index),
            _ => return Err(AuricleError::UnrecognizedUrl(url.to_string())),
        };

        let detail = self.book_detail(&book_url).await?;
        let chapter = detail.chapter(index).cloned().ok_or_else(|| {
            AuricleError::NotFound(format!("chapter {index} of {}", detail.title))
        })?;

        let sources = audio::resolve_sources(
            &chapter,
            &self.client.endpoints,
            self.config.adaptive_streaming,
        )?;

        Ok(ChapterDetail {
            book_id: detail.id,
            book_title: detail.title,
            chapter,
            sources,
        })
    }

    /// Resolve a channel URL to its author or reader entity. Readers go
    /// through the persisted reader cache.
    pub async fn channel(&self, url: &str) -> Result<Channel> {
        match resolver::classify(self.site(), url)? {
            CatalogUrl::AuthorChannel { id } => {
                let author = self.resolver.resolve_author(id).await?;
                self.lock_state().remember_author(author.clone());
                Ok(Channel::Author(author))
            }
            CatalogUrl::ReaderChannel { id } => {
                let key = id.to_string();
                if let Some(reader) = self.lock_state().reader(&key) {
                    tracing::debug!("reader cache hit for {key}");
                    return Ok(Channel::Reader(reader.clone()));
                }

                let reader = self.resolver.resolve_reader(id).await?;
                self.lock_state().put_reader(reader.clone());
                Ok(Channel::Reader(reader))
            }
            _ => Err(AuricleError::UnrecognizedUrl(url.to_string())),
        }
    }

    /// A pager over a channel's books.
    pub fn channel_contents(&self, url: &str) -> Result<Pager<CatalogEntry>> {
        match resolver::classify(self.site(), url)? {
            CatalogUrl::AuthorChannel { id } => {
                let strategy =
                    AuthorBooksStrategy::new(self.client.clone(), self.normalizer.clone(), id);
                Ok(Pager::new(
                    Box::new(strategy),
                    PageContext::first(AUTHOR_BOOKS, None, self.config.page_size),
                ))
            }
            CatalogUrl::ReaderChannel { id } => {
                let strategy =
                    ReaderSectionsStrategy::new(self.client.clone(), self.normalizer.clone(), id);
                Ok(Pager::new(
                    Box::new(strategy),
                    PageContext::first(READER_SECTIONS, None, self.config.page_size),
                ))
            }
            _ => Err(AuricleError::UnrecognizedUrl(url.to_string())),
        }
    }
}

/// Default location of the persisted state blob:
/// `~/.local/share/auricle/state.json`.
pub fn default_state_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AuricleError::Config("Could not find data directory".into()))?;
    let auricle_dir = data_dir.join("auricle");
    std::fs::create_dir_all(&auricle_dir)?;
    Ok(auricle_dir.join("state.json"))
}

/// Write the state blob through a sibling temp file and rename, so an
/// interrupted write never leaves a truncated blob behind.
pub fn write_state(path: &Path, blob: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, blob)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_state(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::mock::MockFetcher;

    fn config() -> Config {
        Config {
            base_url: "https://example.org".into(),
            page_size: 3,
            adaptive_streaming: false,
            timeout_secs: 10,
        }
    }

    const DETAIL_JSON: &str = r#"{
        "book": {"id": 42, "title": "Moby Dick", "url": "/moby-dick/"},
        "sections": [{"id": 991, "title": "Loomings", "duration": 300}]
    }"#;

    fn session_with(fetcher: Arc<MockFetcher>) -> Session {
        Session::with_fetcher(config(), fetcher).unwrap()
    }

    #[test]
    fn test_base_url_is_required() {
        let err = Session::new(Config::default()).unwrap_err();
        assert!(matches!(err, AuricleError::Config(_)));
    }

    #[test]
    fn test_url_classifier_predicates() {
        let session = session_with(Arc::new(MockFetcher::new()));

        assert!(session.is_book_url("https://example.org/moby-dick/"));
        assert!(session.is_chapter_url("https://example.org/moby-dick/?chapter=3"));
        assert!(session.is_channel_url("https://example.org/author/142"));
        assert!(session.is_channel_url("https://example.org/reader/88"));
        assert!(!session.is_book_url("https://example.org/search"));
        assert!(!session.is_book_url("https://other.example.com/moby-dick/"));
    }

    #[tokio::test]
    async fn test_book_detail_fetched_once_then_cached() {
        let fetcher = Arc::new(
            MockFetcher::new().route("https://example.org/api/book/42", 200, DETAIL_JSON),
        );
        let session = session_with(fetcher.clone());

        let first = session
            .book_detail("https://example.org/moby-dick/?id=42")
            .await
            .unwrap();
        let second = session
            .book_detail("https://example.org/moby-dick/?id=42")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.requests().len(), 1, "second call must hit the cache");
    }

    #[tokio::test]
    async fn test_chapter_detail_includes_sources() {
        let fetcher = Arc::new(
            MockFetcher::new().route("https://example.org/api/book/42", 200, DETAIL_JSON),
        );
        let session = session_with(fetcher);

        let chapter = session
            .chapter_detail("https://example.org/moby-dick/?id=42&chapter=0")
            .await
            .unwrap();

        assert_eq!(chapter.book_title, "Moby Dick");
        assert_eq!(chapter.chapter.title, "Loomings");
        assert_eq!(chapter.sources.len(), 1);
        assert_eq!(chapter.sources[0].url, "https://example.org/stream/991.mp3");
    }

    #[tokio::test]
    async fn test_chapter_out_of_range_is_not_found() {
        let fetcher = Arc::new(
            MockFetcher::new().route("https://example.org/api/book/42", 200, DETAIL_JSON),
        );
        let session = session_with(fetcher);

        let err = session
            .chapter_detail("https://example.org/moby-dick/?id=42&chapter=5")
            .await
            .unwrap_err();

        assert!(matches!(err, AuricleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reader_channel_cached_by_id() {
        let fetcher = Arc::new(MockFetcher::new().route(
            "https://example.org/api/reader/88",
            200,
            r#"{"id": 88, "name": "Jane Doe"}"#,
        ));
        let session = session_with(fetcher.clone());

        let first = session
            .channel("https://example.org/reader/88")
            .await
            .unwrap();
        let second = session
            .channel("https://example.org/reader/88")
            .await
            .unwrap();

        assert_eq!(first.name(), "Jane Doe");
        assert_eq!(first, second);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_persisted_state_round_trip() {
        let fetcher = Arc::new(
            MockFetcher::new().route("https://example.org/api/book/42", 200, DETAIL_JSON),
        );
        let session = session_with(fetcher);
        session
            .book_detail("https://example.org/moby-dick/?id=42")
            .await
            .unwrap();

        let blob = session.persist_state().unwrap();

        let restored = session_with(Arc::new(MockFetcher::new()));
        restored.load_state(Some(&blob));

        // The restored session serves the detail without any network.
        let detail = restored
            .book_detail("https://example.org/moby-dick/?id=42")
            .await
            .unwrap();
        assert_eq!(detail.title, "Moby Dick");
    }

    #[test]
    fn test_write_state_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        write_state(&path, "{\"a\":1}").unwrap();
        write_state(&path, "{\"a\":2}").unwrap();

        assert_eq!(read_state(&path).unwrap(), "{\"a\":2}");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
