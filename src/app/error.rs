use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuricleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0} for {1}")]
    Status(u16, String),

    #[error("Malformed response from {0}: {1}")]
    Malformed(String, String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unrecognized catalog URL: {0}")]
    UnrecognizedUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No playable source for chapter: {0}")]
    NoPlayableSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuricleError {
    /// Whether a listing operation may recover from this error by
    /// degrading to an empty page. Transport and shape problems qualify;
    /// anything else indicates a bug or a missing entity and propagates.
    pub fn is_listing_recoverable(&self) -> bool {
        matches!(
            self,
            AuricleError::Http(_)
                | AuricleError::Status(_, _)
                | AuricleError::Malformed(_, _)
                | AuricleError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuricleError>;
