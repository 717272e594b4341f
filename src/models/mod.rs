use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shown when a listing row carries no price.
pub const PRICE_PLACEHOLDER: &str = "Cena na dotaz";
/// Shown when a listing row carries no location.
pub const LOCATION_PLACEHOLDER: &str = "Lokalita neuvedena";

/// One row of a search result page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub title: String,
    /// Price as displayed on the site, e.g. "od 3 500 Kč / noc"
    pub price: String,
    pub location: String,
    pub description: String,
    /// Canonical absolute URL of the property page
    pub url: String,
    pub thumbnail: Option<String>,
    pub rating: Option<String>,
}

/// Everything the property page tells us about a single listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub title: String,
    pub price: String,
    pub location: String,
    /// First 200 characters of `full_description`
    pub description: String,
    pub full_description: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub rating: Option<String>,
    pub features: Vec<String>,
    /// Maximum number of guests, parsed from an "N osob" tag
    pub capacity: Option<u32>,
    /// Parsed from an "N ložnice" tag
    pub bedrooms: Option<u32>,
    pub tags: Vec<String>,
    /// Equipment items keyed by the category heading they appear under
    pub equipment: BTreeMap<String, Vec<String>>,
}

/// Entry of a filter vocabulary (region or amenity)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub slug: String,
    pub name: String,
    pub count: u32,
}

pub type Region = CatalogEntry;
pub type Feature = CatalogEntry;
