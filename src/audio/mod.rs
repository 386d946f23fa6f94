//! Ranks the playable representations of a chapter.

use crate::api::Endpoints;
use crate::app::{AuricleError, Result};
use crate::domain::{AudioSource, ChapterEntry};

const ADAPTIVE_LABEL: &str = "Adaptive stream";
const ADAPTIVE_CONTAINER: &str = "application/vnd.apple.mpegurl";
const ADAPTIVE_CODEC: &str = "mp4a.40.2";

const STREAM_LABEL: &str = "Stream";
const FILE_LABEL: &str = "Original file";
const MP3_CONTAINER: &str = "audio/mpeg";
const MP3_CODEC: &str = "mp3";

/// Build the ranked source list for a chapter: the adaptive source leads
/// only when the capability is enabled, then the proxied stream derived
/// from the section id, then the direct file. A chapter yielding no
/// source at all is an error, not an empty list.
pub fn resolve_sources(
    chapter: &ChapterEntry,
    endpoints: &Endpoints,
    adaptive_enabled: bool,
) -> Result<Vec<AudioSource>> {
    let mut sources = Vec::new();

    if adaptive_enabled {
        if let Some(hls_id) = &chapter.hls_id {
            sources.push(AudioSource {
                label: ADAPTIVE_LABEL.to_string(),
                container: ADAPTIVE_CONTAINER.to_string(),
                codec: ADAPTIVE_CODEC.to_string(),
                url: endpoints.hls_url(hls_id),
                duration_secs: chapter.duration_secs,
            });
        }
    }

    if let Some(section_id) = &chapter.section_id {
        sources.push(AudioSource {
            label: STREAM_LABEL.to_string(),
            container: MP3_CONTAINER.to_string(),
            codec: MP3_CODEC.to_string(),
            url: endpoints.stream_url(section_id),
            duration_secs: chapter.duration_secs,
        });
    }

    if let Some(audio_url) = &chapter.audio_url {
        sources.push(AudioSource {
            label: FILE_LABEL.to_string(),
            container: MP3_CONTAINER.to_string(),
            codec: MP3_CODEC.to_string(),
            url: audio_url.clone(),
            duration_secs: chapter.duration_secs,
        });
    }

    if sources.is_empty() {
        return Err(AuricleError::NoPlayableSource(chapter.title.clone()));
    }

    Ok(sources)
}
