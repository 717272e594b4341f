//! Shape and range checks for caller-supplied search parameters.
//!
//! Everything here runs before any network activity, so malformed input
//! never produces a request to the listing site.

use crate::error::{Result, ScraperError};
use crate::scrapers::types::{SearchCriteria, MAX_RESULTS_CEILING};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_SLUG_LEN: usize = 50;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid slug regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Region or amenity identifier: 1-50 chars of `[a-z0-9-]`.
pub fn validate_slug(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ScraperError::invalid_parameter(field, "must not be empty"));
    }
    if value.len() > MAX_SLUG_LEN {
        return Err(ScraperError::invalid_parameter(
            field,
            format!("must be at most {MAX_SLUG_LEN} characters"),
        ));
    }
    if !SLUG_RE.is_match(value) {
        return Err(ScraperError::invalid_parameter(
            field,
            "may only contain lowercase letters, digits and hyphens",
        ));
    }
    Ok(())
}

/// `YYYY-MM-DD` that also names a real calendar day.
pub fn validate_date(field: &str, value: &str) -> Result<NaiveDate> {
    if !DATE_RE.is_match(value) {
        return Err(ScraperError::invalid_parameter(
            field,
            "must be in YYYY-MM-DD format",
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ScraperError::invalid_parameter(field, "is not a valid calendar date"))
}

pub fn validate_number(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ScraperError::invalid_parameter(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ScraperError::invalid_parameter(field, "must not be negative"));
    }
    Ok(())
}

pub fn validate_max_results(value: f64) -> Result<()> {
    validate_number("maxResults", value)?;
    if value > MAX_RESULTS_CEILING as f64 {
        return Err(ScraperError::invalid_parameter(
            "maxResults",
            format!("must be at most {MAX_RESULTS_CEILING}"),
        ));
    }
    Ok(())
}

/// Check every populated field of a search request.
pub fn validate_criteria(criteria: &SearchCriteria) -> Result<()> {
    if let Some(region) = &criteria.region {
        validate_slug("region", region)?;
    }
    for feature in &criteria.features {
        validate_slug("features", feature)?;
    }
    if let Some(date) = &criteria.date_from {
        validate_date("dateFrom", date)?;
    }
    if let Some(date) = &criteria.date_to {
        validate_date("dateTo", date)?;
    }

    let numbers = [
        ("persons", criteria.persons),
        ("priceMin", criteria.price_min),
        ("priceMax", criteria.price_max),
    ];
    for (field, value) in numbers {
        if let Some(value) = value {
            validate_number(field, value)?;
        }
    }

    if let Some(max) = criteria.max_results {
        validate_max_results(max)?;
    }
    Ok(())
}
