use serde::{Deserialize, Serialize};

use crate::domain::chapter::ChapterEntry;
use crate::domain::person::PersonRef;

/// A single book (or playlist) row in a listing. Built once by the
/// normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    /// Primary author, for single-author consumers.
    pub author: PersonRef,
    pub thumbnail: String,
    /// Declared number of chapters; -1 when the listing doesn't say.
    pub chapter_count: i32,
    pub url: String,
}

/// Fully resolved book detail, cached across process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub author: PersonRef,
    pub authors: Vec<PersonRef>,
    pub chapters: Vec<ChapterEntry>,
    pub view_count: Option<u64>,
    pub url: String,
}

impl BookDetail {
    pub fn chapter(&self, index: usize) -> Option<&ChapterEntry> {
        self.chapters.get(index)
    }

    pub fn display_authors(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
