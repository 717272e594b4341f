//! CSS selectors and text patterns describing the listing site's markup.
//!
//! The parsers only know *what* to extract; *where* it lives on the page is
//! described here. When the site changes its layout, build a new schema
//! value instead of touching the parsers.

use crate::error::{Result, ScraperError};
use scraper::Selector;

/// Compile a selector from a schema, reporting which one is broken.
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::parse(format!("invalid selector '{css}': {e:?}")))
}

/// Search result page
#[derive(Debug, Clone)]
pub struct SearchPageSchema {
    /// One match per listing card
    pub row: String,
    pub title: String,
    /// Anchor carrying the detail link
    pub link: String,
    pub price: String,
    pub location: String,
    pub description: String,
    pub thumbnail: String,
    pub rating: String,
}

impl Default for SearchPageSchema {
    fn default() -> Self {
        Self {
            row: "div.object-list article.object-item".into(),
            title: "h2.object-title".into(),
            link: "a.object-link[href], h2.object-title a[href]".into(),
            price: ".object-price".into(),
            location: ".object-location".into(),
            description: ".object-perex".into(),
            thumbnail: "img.object-photo, .object-image img".into(),
            rating: ".object-rating .rating-value".into(),
        }
    }
}

/// Property detail page
#[derive(Debug, Clone)]
pub struct DetailPageSchema {
    pub title: String,
    /// Page metadata carrying "Lokalita: <place> ★ <rating> | <summary>"
    pub meta_description: String,
    /// Text preceding the location inside the metadata description
    pub location_prefix: String,
    /// Glyph that follows the location and precedes the rating
    pub rating_glyph: String,
    pub location: String,
    pub description_primary: String,
    pub description_secondary: String,
    pub price: String,
    pub rating: String,
    pub image: String,
    pub features: String,
    pub tags: String,
    pub equipment_group: String,
    pub equipment_heading: String,
    pub equipment_item: String,
}

impl Default for DetailPageSchema {
    fn default() -> Self {
        Self {
            title: "h1".into(),
            meta_description: r#"meta[name="description"]"#.into(),
            location_prefix: "Lokalita:".into(),
            rating_glyph: "★".into(),
            location: ".detail-location".into(),
            description_primary: "#popis .detail-description".into(),
            description_secondary: ".object-description".into(),
            price: ".detail-price".into(),
            rating: ".detail-rating .rating-value".into(),
            image: r#"meta[property="og:image"]"#.into(),
            features: "ul.detail-features li".into(),
            tags: "ul.detail-tags li".into(),
            equipment_group: "#vybaveni .equipment-group".into(),
            equipment_heading: "h3, h4".into(),
            equipment_item: "li".into(),
        }
    }
}

/// Region or amenity overview page
#[derive(Debug, Clone)]
pub struct CatalogPageSchema {
    /// Anchors that may name a catalog entry
    pub anchor: String,
    /// Regex over the href path; group 1 is the slug
    pub href_pattern: String,
    /// Child element holding the listing count
    pub count: String,
    /// Child element holding the display name
    pub name: String,
}

impl CatalogPageSchema {
    pub fn regions() -> Self {
        Self {
            anchor: "a[href]".into(),
            href_pattern: r"^/(?:chalupy/)?([a-z0-9-]+)/?$".into(),
            count: ".count".into(),
            name: ".name".into(),
        }
    }

    pub fn features() -> Self {
        Self {
            anchor: "a[href]".into(),
            href_pattern: r"^/(?:chalupy/)?vybaveni/([a-z0-9-]+)/?$".into(),
            count: ".count".into(),
            name: ".name".into(),
        }
    }
}

/// Schemas for every page type the scraper reads.
#[derive(Debug, Clone)]
pub struct SiteSchema {
    pub search: SearchPageSchema,
    pub detail: DetailPageSchema,
    pub regions: CatalogPageSchema,
    pub features: CatalogPageSchema,
}

impl Default for SiteSchema {
    fn default() -> Self {
        Self {
            search: SearchPageSchema::default(),
            detail: DetailPageSchema::default(),
            regions: CatalogPageSchema::regions(),
            features: CatalogPageSchema::features(),
        }
    }
}
