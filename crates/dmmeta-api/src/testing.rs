//! In-memory fetcher for provider tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::error::DmmError;
use crate::fetch::{FetchedPage, PageFetcher};

/// Serves canned pages by URL and records every request. Unknown URLs 404.
#[derive(Debug, Clone, Default)]
pub struct FakeFetcher {
    pages: Arc<HashMap<String, String>>,
    visited: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(canonical(url), body.to_string());
        self
    }

    /// URLs requested so far, in order.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

fn canonical(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, DmmError> {
        self.visited.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(body) => Ok(FetchedPage {
                url: url.clone(),
                body: body.clone(),
            }),
            None => Err(DmmError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
