//! Classifies catalog URLs and resolves book details.
//!
//! Detail resolution is an escalation chain, not a retry loop: the
//! structured endpoint is asked once (by numeric id when the URL carries
//! one, by slug otherwise) and the page itself is scraped only when that
//! fails. Every result is tagged with the strategy that produced it.

pub mod scrape;

use std::sync::Arc;

use url::Url;

use crate::api::{ApiClient, ApiPerson, DetailResponse};
use crate::app::{AuricleError, Result};
use crate::domain::{Author, BookDetail, Reader};
use crate::normalizer::{DetailRecord, Normalizer};

/// Path segments that can never be a book slug.
const RESERVED_SEGMENTS: &[&str] = &[
    "search", "category", "group", "collection", "api", "stream", "hls",
];

/// What a catalog URL points at.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogUrl {
    Book {
        url: String,
    },
    Chapter {
        /// The owning book page, with the chapter parameter removed.
        book_url: String,
        index: usize,
    },
    AuthorChannel {
        id: u64,
    },
    ReaderChannel {
        id: u64,
    },
}

/// Classify a URL against the configured site, in fixed priority order:
/// chapter, author channel, reader channel, book. URLs matching none of
/// the rules are rejected, never guessed at.
pub fn classify(site: &Url, url: &str) -> Result<CatalogUrl> {
    let parsed = Url::parse(url)?;

    if parsed.host_str() != site.host_str() {
        return Err(AuricleError::UnrecognizedUrl(url.to_string()));
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if book_shaped(&segments).is_some() {
        if let Some(index) = chapter_param(&parsed) {
            return Ok(CatalogUrl::Chapter {
                book_url: without_query_param(&parsed, "chapter"),
                index,
            });
        }
        return Ok(CatalogUrl::Book {
            url: parsed.to_string(),
        });
    }

    if let [kind, id] = segments.as_slice() {
        if let Ok(id) = id.parse::<u64>() {
            match *kind {
                "author" => return Ok(CatalogUrl::AuthorChannel { id }),
                "reader" => return Ok(CatalogUrl::ReaderChannel { id }),
                _ => {}
            }
        }
    }

    Err(AuricleError::UnrecognizedUrl(url.to_string()))
}

/// The slug of a book-shaped path: a single segment that is not a
/// reserved system path, a dated archive, or a collection-aggregation
/// page.
fn book_shaped<'a>(segments: &[&'a str]) -> Option<&'a str> {
    match segments {
        [slug]
            if !RESERVED_SEGMENTS.contains(slug)
                && !slug.bytes().all(|b| b.is_ascii_digit())
                && !slug.ends_with("-collection") =>
        {
            Some(*slug)
        }
        _ => None,
    }
}

fn chapter_param(url: &Url) -> Option<usize> {
    url.query_pairs()
        .find(|(key, _)| key == "chapter")
        .and_then(|(_, value)| value.parse().ok())
}

/// Numeric book id carried in the `id` query parameter, when present.
pub fn numeric_id_param(url: &Url) -> Option<u64> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| value.parse().ok())
}

fn book_slug(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|seg| !seg.is_empty())
        .next_back()
        .map(String::from)
}

fn without_query_param(url: &Url, param: &str) -> String {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    stripped.set_query(None);
    if !kept.is_empty() {
        stripped.query_pairs_mut().extend_pairs(kept);
    }
    stripped.to_string()
}

/// The stable cache/dedup key for a book URL, independent of which URL
/// form produced it: numeric id when present, slug otherwise, the full
/// URL as a last resort.
pub fn canonical_book_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => numeric_id_param(&parsed)
            .map(|id| id.to_string())
            .or_else(|| book_slug(&parsed))
            .unwrap_or_else(|| url.to_string()),
        Err(_) => url.to_string(),
    }
}

/// Which strategy of the escalation chain produced a detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    ById,
    BySlug,
    Scraped,
}

#[derive(Debug)]
pub struct ResolvedBook {
    pub detail: BookDetail,
    pub source: ResolutionSource,
}

pub struct Resolver {
    client: Arc<ApiClient>,
    normalizer: Normalizer,
}

impl Resolver {
    pub fn new(client: Arc<ApiClient>, normalizer: Normalizer) -> Self {
        Self { client, normalizer }
    }

    /// Run the escalation chain for a book page URL.
    pub async fn resolve_book(&self, url: &str) -> Result<ResolvedBook> {
        let parsed = Url::parse(url)?;

        let structured = match numeric_id_param(&parsed) {
            Some(id) => Some((
                self.client.endpoints.book_by_id(id),
                ResolutionSource::ById,
            )),
            None => book_slug(&parsed).map(|slug| {
                (
                    self.client.endpoints.book_by_slug(&slug),
                    ResolutionSource::BySlug,
                )
            }),
        };

        if let Some((endpoint, source)) = structured {
            match self.client.get_json::<DetailResponse>(&endpoint).await {
                Ok(payload) => {
                    let detail = self.normalizer.normalize_detail(DetailRecord::Api(payload));
                    return Ok(ResolvedBook { detail, source });
                }
                Err(e) if e.is_listing_recoverable() => {
                    tracing::debug!("structured lookup failed for {url}, scraping the page: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        let page = self.client.fetcher().get(url).await?;
        if !page.is_success() {
            return Err(AuricleError::Status(page.status, url.to_string()));
        }

        let scraped = scrape::extract_book(url, &page.body)?;
        let detail = self
            .normalizer
            .normalize_detail(DetailRecord::Scraped(scraped));

        Ok(ResolvedBook {
            detail,
            source: ResolutionSource::Scraped,
        })
    }

    pub async fn resolve_author(&self, id: u64) -> Result<Author> {
        let person: ApiPerson = self
            .client
            .get_json(&self.client.endpoints.author(id))
            .await?;
        Ok(self.normalizer.normalize_author(person))
    }

    pub async fn resolve_reader(&self, id: u64) -> Result<Reader> {
        let person: ApiPerson = self
            .client
            .get_json(&self.client.endpoints.reader(id))
            .await?;
        Ok(self.normalizer.normalize_reader(person))
    }
}
