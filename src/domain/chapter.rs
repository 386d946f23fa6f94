use serde::{Deserialize, Serialize};

use crate::domain::person::PersonRef;

/// One chapter of a book. The index is zero-based and stable only for a
/// given book detail snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub index: usize,
    pub title: String,
    pub duration_secs: u32,
    /// Direct remote audio file, when the upstream exposes one.
    pub audio_url: Option<String>,
    /// Opaque section identifier usable to build a proxied stream URL.
    pub section_id: Option<String>,
    /// Adaptive-streaming identifier.
    pub hls_id: Option<String>,
    pub readers: Vec<PersonRef>,
}

impl ChapterEntry {
    pub fn new(index: usize, title: String, duration_secs: u32) -> Self {
        Self {
            index,
            title,
            duration_secs,
            audio_url: None,
            section_id: None,
            hls_id: None,
            readers: Vec::new(),
        }
    }
}

/// A playable representation of a chapter, ranked by the audio resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    pub label: String,
    /// MIME container type, e.g. `audio/mpeg`.
    pub container: String,
    pub codec: String,
    pub url: String,
    pub duration_secs: u32,
}

/// A chapter together with its resolved audio sources, as returned to the
/// host for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterDetail {
    pub book_id: String,
    pub book_title: String,
    pub chapter: ChapterEntry,
    pub sources: Vec<AudioSource>,
}
