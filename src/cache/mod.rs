//! The serialized state blob: detail and reader caches plus the
//! latest-releases dedup set. Entries are never evicted; the blob lives
//! as long as the host keeps it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{Author, BookDetail, Reader};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheState {
    pub authors: Vec<Author>,
    pub readers: HashMap<String, Reader>,
    pub book_details: HashMap<String, BookDetail>,
    pub latest_release_ids: HashSet<String>,
}

impl CacheState {
    /// Deserialize a persisted blob. Absent or corrupt input initializes
    /// an empty state instead of failing startup.
    pub fn load(serialized: Option<&str>) -> Self {
        let Some(blob) = serialized.filter(|s| !s.trim().is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str(blob) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("discarding corrupt persisted state: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn book(&self, key: &str) -> Option<&BookDetail> {
        self.book_details.get(key)
    }

    pub fn put_book(&mut self, key: String, detail: BookDetail) {
        self.book_details.insert(key, detail);
    }

    pub fn reader(&self, id: &str) -> Option<&Reader> {
        self.readers.get(id)
    }

    pub fn put_reader(&mut self, reader: Reader) {
        self.readers.insert(reader.id.clone(), reader);
    }

    pub fn remember_author(&mut self, author: Author) {
        if !self.authors.iter().any(|a| a.id == author.id) {
            self.authors.push(author);
        }
    }

    /// Record an id surfaced as a latest release. The set only grows.
    pub fn mark_latest(&mut self, id: &str) {
        self.latest_release_ids.insert(id.to_string());
    }

    pub fn is_latest(&self, id: &str) -> bool {
        self.latest_release_ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PersonRef;

    fn detail(id: &str) -> BookDetail {
        BookDetail {
            id: id.to_string(),
            title: format!("Book {id}"),
            description: String::new(),
            cover: String::new(),
            author: PersonRef {
                id: None,
                name: "A".into(),
                url: None,
            },
            authors: vec![],
            chapters: vec![],
            view_count: Some(3),
            url: format!("https://example.org/book-{id}/"),
        }
    }

    #[test]
    fn test_round_trip_preserves_keys_and_values() {
        let mut state = CacheState::default();
        state.put_book("7".into(), detail("7"));
        state.put_book("slug-key".into(), detail("8"));
        state.put_reader(Reader {
            id: "88".into(),
            name: "Jane".into(),
            url: "https://example.org/reader/88".into(),
            thumbnail: None,
        });
        state.mark_latest("7");
        state.mark_latest("9");

        let blob = state.save().unwrap();
        let restored = CacheState::load(Some(&blob));

        assert_eq!(restored.book_details.len(), 2);
        assert_eq!(restored.book("7"), state.book("7"));
        assert_eq!(restored.book("slug-key"), state.book("slug-key"));
        assert_eq!(restored.readers.len(), 1);
        assert_eq!(restored.latest_release_ids, state.latest_release_ids);
    }

    #[test]
    fn test_load_tolerates_missing_and_corrupt_input() {
        assert!(CacheState::load(None).book_details.is_empty());
        assert!(CacheState::load(Some("")).book_details.is_empty());
        assert!(CacheState::load(Some("not json {")).book_details.is_empty());
        assert!(CacheState::load(Some("[1,2,3]")).book_details.is_empty());
    }

    #[test]
    fn test_load_tolerates_partial_schema() {
        let state = CacheState::load(Some(r#"{"latest_release_ids": ["7"]}"#));
        assert!(state.is_latest("7"));
        assert!(state.book_details.is_empty());
    }

    #[test]
    fn test_dedup_set_only_grows() {
        let mut state = CacheState::default();
        state.mark_latest("7");
        state.mark_latest("7");
        state.mark_latest("9");

        assert_eq!(state.latest_release_ids.len(), 2);
        assert!(state.is_latest("7"));
        assert!(state.is_latest("9"));
    }

    #[test]
    fn test_remember_author_dedupes_by_id() {
        let author = Author {
            id: "142".into(),
            name: "Herman Melville".into(),
            url: String::new(),
            thumbnail: None,
            links: vec![],
            birth_year: None,
            death_year: None,
        };
        let mut state = CacheState::default();
        state.remember_author(author.clone());
        state.remember_author(author);

        assert_eq!(state.authors.len(), 1);
    }
}
