use crate::error::Result;
use crate::models::{Feature, ListingDetail, ListingSummary, Region};
use crate::scrapers::types::SearchCriteria;
use async_trait::async_trait;
use url::Url;

/// Anything that can turn a URL into an HTML document.
///
/// The production implementation talks HTTP; tests substitute canned pages.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch_document(&self, url: &Url) -> Result<String>;
}

/// The operations a vacation-rental source offers to callers
#[async_trait]
pub trait RentalSource: Send + Sync {
    async fn search_listings(&self, criteria: &SearchCriteria) -> Result<Vec<ListingSummary>>;

    async fn get_listing_details(&self, url: &str) -> Result<ListingDetail>;

    async fn list_regions(&self) -> Result<Vec<Region>>;

    async fn list_features(&self) -> Result<Vec<Feature>>;

    /// Get the name of the listing site
    fn source_name(&self) -> &'static str;
}
