pub mod http_fetcher;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::app::Result;

/// Raw response from the transport. Non-success statuses are returned,
/// not raised; callers decide whether a failed fetch is fatal.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}
