//! Raw contract with the upstream catalog: endpoint construction, the
//! JSON record shapes, and a thin typed client over the [`Fetcher`]
//! boundary.
//!
//! The upstream has changed paths and field names across its lifetime;
//! this module is the single place that knows the current schema.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::app::{AuricleError, Result};
use crate::fetcher::Fetcher;

/// Builds all upstream URLs from the configured site base.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AuricleError::Config(format!(
                "base URL is not usable as a site root: {base_url}"
            )));
        }
        Ok(Self { base })
    }

    /// The site root, for classifying page URLs and resolving relative links.
    pub fn site(&self) -> &Url {
        &self.base
    }

    fn path(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .expect("base URL validated in Endpoints::new");
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn paged(&self, segments: &[&str], offset: usize, limit: usize) -> String {
        let mut url = self.path(segments);
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url.to_string()
    }

    pub fn latest(&self, limit: usize) -> String {
        let mut url = self.path(&["api", "books", "latest"]);
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        url.to_string()
    }

    pub fn catalog(&self, offset: usize, limit: usize) -> String {
        self.paged(&["api", "books"], offset, limit)
    }

    pub fn search_books(&self, query: &str, offset: usize, limit: usize) -> String {
        let mut url = self.path(&["api", "books", "search"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url.to_string()
    }

    pub fn search_authors(&self, query: &str, offset: usize, limit: usize) -> String {
        let mut url = self.path(&["api", "authors", "search"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url.to_string()
    }

    pub fn book_by_id(&self, id: u64) -> String {
        self.path(&["api", "book", &id.to_string()]).to_string()
    }

    pub fn book_by_slug(&self, slug: &str) -> String {
        self.path(&["api", "book", "slug", slug]).to_string()
    }

    pub fn author(&self, id: u64) -> String {
        self.path(&["api", "author", &id.to_string()]).to_string()
    }

    pub fn author_books(&self, id: u64, offset: usize, limit: usize) -> String {
        self.paged(&["api", "author", &id.to_string(), "books"], offset, limit)
    }

    pub fn reader(&self, id: u64) -> String {
        self.path(&["api", "reader", &id.to_string()]).to_string()
    }

    pub fn reader_sections(&self, id: u64, offset: usize, limit: usize) -> String {
        self.paged(
            &["api", "reader", &id.to_string(), "sections"],
            offset,
            limit,
        )
    }

    /// Proxied stream for a section, derived deterministically from its id.
    pub fn stream_url(&self, section_id: &str) -> String {
        self.path(&["stream", &format!("{section_id}.mp3")])
            .to_string()
    }

    pub fn hls_url(&self, hls_id: &str) -> String {
        self.path(&["hls", hls_id, "master.m3u8"]).to_string()
    }
}

/// Book record as the structured API ships it. Field presence varies by
/// endpoint and catalog age, so everything is optional; the normalizer
/// applies the fallback chains.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiBook {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub image_big: Option<String>,
    pub image_thumb: Option<String>,
    pub sections_count: Option<i32>,
    pub views: Option<u64>,
    #[serde(default)]
    pub authors: Vec<ApiPerson>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiPerson {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// One audio section of a book. When returned from the reader-sections
/// endpoint the `audiobook_*` fields tag the parent book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSection {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub audio_url: Option<String>,
    pub hls_id: Option<String>,
    #[serde(default)]
    pub readers: Vec<ApiPerson>,
    pub audiobook_id: Option<u64>,
    pub audiobook_title: Option<String>,
    pub audiobook_url: Option<String>,
    pub audiobook_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

/// Detail payload: both keys are required; a response missing either is
/// treated as malformed and escalates to the next resolution strategy.
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub book: ApiBook,
    pub sections: Vec<ApiSection>,
}

/// Typed GET client. Non-success statuses and undecodable bodies surface
/// as errors; callers pick the recovery policy.
pub struct ApiClient {
    fetcher: Arc<dyn Fetcher>,
    pub endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {url}");
        let response = self.fetcher.get(url).await?;

        if !response.is_success() {
            return Err(AuricleError::Status(response.status, url.to_string()));
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    pub async fn list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        Ok(self.get_json::<ListResponse<T>>(url).await?.items)
    }
}
