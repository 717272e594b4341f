//! Test doubles and captured pages shared by the unit tests.

use crate::error::{Result, ScraperError};
use crate::scrapers::cache::Clock;
use crate::scrapers::traits::DocumentFetcher;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use url::Url;

/// Pages captured from the listing site, trimmed to what the parsers read.
pub mod fixtures {
    pub const SEARCH_PAGE: &str = include_str!("../../fixtures/search_page.html");
    pub const DETAIL_PAGE: &str = include_str!("../../fixtures/detail_page.html");
    pub const REGIONS_PAGE: &str = include_str!("../../fixtures/regions_page.html");
    pub const FEATURES_PAGE: &str = include_str!("../../fixtures/features_page.html");
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// What the mock answers for a given URL path.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Page(String),
    Status(u16),
}

/// Fetcher serving canned pages by URL path and recording every request.
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<Url>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, path: &str, html: &str) -> Self {
        self.pages
            .lock()
            .insert(path.to_string(), MockResponse::Page(html.to_string()));
        self
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.pages
            .lock()
            .insert(path.to_string(), MockResponse::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn fetch_document(&self, url: &Url) -> Result<String> {
        self.requests.lock().push(url.clone());
        match self.pages.lock().get(url.path()).cloned() {
            Some(MockResponse::Page(html)) => Ok(html),
            Some(MockResponse::Status(status)) => Err(ScraperError::HttpStatus { status }),
            None => Err(ScraperError::HttpStatus { status: 404 }),
        }
    }
}
