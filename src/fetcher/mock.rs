use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::Result;
use crate::fetcher::{Fetcher, HttpResponse};

/// Test fetcher mapping exact URLs to canned responses. Unrouted URLs
/// answer 404 with an empty body.
#[derive(Default)]
pub struct MockFetcher {
    routes: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        Ok(self
            .routes
            .get(url)
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                body: String::new(),
            }))
    }
}
