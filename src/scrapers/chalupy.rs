use crate::config::ScoutConfig;
use crate::error::{Result, ScraperError};
use crate::models::{CatalogEntry, Feature, ListingDetail, ListingSummary, Region};
use crate::scrapers::cache::{Clock, SystemClock, TtlCache};
use crate::scrapers::catalog_parser::{parse_catalog, KNOWN_FEATURES, KNOWN_REGIONS};
use crate::scrapers::detail_parser::parse_listing_detail;
use crate::scrapers::http::HttpFetcher;
use crate::scrapers::schema::SiteSchema;
use crate::scrapers::search_parser::{filter_by_query, parse_search_results};
use crate::scrapers::traits::{DocumentFetcher, RentalSource};
use crate::scrapers::types::SearchCriteria;
use crate::scrapers::urls::{build_search_url, catalog_url, validate_target_url, CatalogKind};
use crate::scrapers::validation::validate_criteria;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

/// A catalog cache plus the lock that serializes its refresh.
struct CatalogSlot {
    cache: TtlCache<CatalogEntry>,
    refresh: Mutex<()>,
}

impl CatalogSlot {
    fn new(config: &ScoutConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: TtlCache::new(config.catalog_ttl(), clock),
            refresh: Mutex::new(()),
        }
    }
}

/// e-chalupy.cz scraper: validates input, fetches pages and extracts records
pub struct ChalupyScraper {
    base: Url,
    fetcher: Arc<dyn DocumentFetcher>,
    schema: SiteSchema,
    regions: CatalogSlot,
    features: CatalogSlot,
}

impl ChalupyScraper {
    /// Create a scraper that talks HTTP to the configured site
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config)?);
        Self::with_parts(config, fetcher, Arc::new(SystemClock), SiteSchema::default())
    }

    /// Create a scraper from explicit collaborators
    pub fn with_parts(
        config: &ScoutConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        clock: Arc<dyn Clock>,
        schema: SiteSchema,
    ) -> Result<Self> {
        let base = config
            .base()
            .map_err(|e| ScraperError::internal(e.to_string()))?;

        Ok(Self {
            base,
            fetcher,
            schema,
            regions: CatalogSlot::new(config, clock.clone()),
            features: CatalogSlot::new(config, clock),
        })
    }

    /// Drop both catalog caches
    pub fn clear_caches(&self) {
        self.regions.cache.clear();
        self.features.cache.clear();
    }

    async fn catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
        let (slot, schema, known) = match kind {
            CatalogKind::Regions => (&self.regions, &self.schema.regions, KNOWN_REGIONS),
            CatalogKind::Features => (&self.features, &self.schema.features, KNOWN_FEATURES),
        };

        if let Some(entries) = slot.cache.read() {
            debug!(catalog = kind.label(), count = entries.len(), "Catalog cache hit");
            return Ok(entries);
        }

        let _refresh = slot.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(entries) = slot.cache.read() {
            return Ok(entries);
        }

        let url = catalog_url(&self.base, kind)?;
        info!(catalog = kind.label(), %url, "Fetching catalog page");
        let html = self.fetcher.fetch_document(&url).await?;
        let entries = parse_catalog(&html, schema, known)?;

        if entries.is_empty() {
            info!(catalog = kind.label(), "Catalog page yielded no known entries");
        }
        slot.cache.write(entries.clone());
        Ok(entries)
    }
}

#[async_trait]
impl RentalSource for ChalupyScraper {
    async fn search_listings(&self, criteria: &SearchCriteria) -> Result<Vec<ListingSummary>> {
        validate_criteria(criteria)?;

        let url = build_search_url(&self.base, criteria)?;
        let cap = criteria.result_cap();
        info!(%url, cap, "Searching listings");

        let html = self.fetcher.fetch_document(&url).await?;
        let listings = parse_search_results(&html, &self.base, &self.schema.search, cap)?;
        debug!(count = listings.len(), "Parsed listing rows");

        let listings = match criteria.text_query() {
            Some(query) => {
                let filtered = filter_by_query(listings, query);
                debug!(query, count = filtered.len(), "Applied text filter");
                filtered
            }
            None => listings,
        };

        info!("✅ Found {} listings", listings.len());
        Ok(listings)
    }

    async fn get_listing_details(&self, url: &str) -> Result<ListingDetail> {
        let url = validate_target_url(url, &self.base)?;
        info!(%url, "Fetching listing details");

        let html = self.fetcher.fetch_document(&url).await?;
        parse_listing_detail(&html, &url, &self.schema.detail)
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        self.catalog(CatalogKind::Regions).await
    }

    async fn list_features(&self) -> Result<Vec<Feature>> {
        self.catalog(CatalogKind::Features).await
    }

    fn source_name(&self) -> &'static str {
        "e-chalupy.cz"
    }
}
