//! # Auricle
//!
//! A catalog-browsing adapter for a public audiobook platform: it turns
//! the platform's REST feed (with its HTML pages as a fallback) into a
//! uniform, paged content model, with a persisted detail cache.
//!
//! ## Architecture
//!
//! ```text
//! Resolver → Normalizer → Pager → Host
//!     ↘      Cache      ↙
//! ```
//!
//! - [`resolver`]: URL classification and the id → slug → HTML-scrape
//!   escalation chain for book details
//! - [`normalizer`]: converts raw API/HTML records to canonical entities
//! - [`pager`]: generic cursor pagination over strategy values
//! - [`cache`]: the persisted detail/reader/dedup state blob
//! - [`audio`]: ranks the playable representations of a chapter
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the home feed
//! auricle home
//!
//! # Search the catalog
//! auricle search "moby dick"
//!
//! # Inspect a book and one of its chapters
//! auricle book "https://example.org/moby-dick-by-herman-melville/"
//! auricle chapter "https://example.org/moby-dick-by-herman-melville/?chapter=3"
//! ```

/// Session wiring and error types.
///
/// The [`Session`](app::Session) struct owns the transport, the
/// normalizer and the mutable cache state; every boundary operation is a
/// method on it.
pub mod app;

/// The raw upstream contract: endpoints, JSON record shapes, and a thin
/// typed client.
pub mod api;

/// Ranked audio source resolution for chapters.
pub mod audio;

/// The persisted state blob: detail cache, reader cache, dedup set.
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/auricle/config.toml`: catalog base URL, page
/// size, adaptive-streaming capability, HTTP timeout.
pub mod config;

/// Canonical catalog entities.
///
/// - [`CatalogEntry`](domain::CatalogEntry): one book row in a listing
/// - [`BookDetail`](domain::BookDetail): resolved and cached detail
/// - [`ChapterEntry`](domain::ChapterEntry) / [`AudioSource`](domain::AudioSource)
/// - [`Author`](domain::Author) / [`Reader`](domain::Reader)
pub mod domain;

/// HTTP transport boundary.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait the core consumes
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based
///   implementation
pub mod fetcher;

/// Normalization of heterogeneous upstream records into canonical
/// entities, with ordered fallback chains for missing fields.
pub mod normalizer;

/// Generic cursor pagination and the listing strategies built on it.
pub mod pager;

/// URL classification and the book-detail escalation chain.
pub mod resolver;
