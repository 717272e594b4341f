use serde::{Deserialize, Serialize};

/// Result cap used when the caller does not pass one.
pub const DEFAULT_MAX_RESULTS: usize = 10;
/// Largest result cap a caller may request.
pub const MAX_RESULTS_CEILING: usize = 100;

/// Search parameters for listing scraping
///
/// Numeric fields arrive as JSON numbers and are kept as `f64` until
/// validation has confirmed they are finite and non-negative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SearchCriteria {
    /// Free-text filter applied to the parsed results, never sent to the site
    pub query: Option<String>,
    /// Region slug, e.g. "krkonose"
    pub region: Option<String>,
    /// Amenity slugs, e.g. ["sauna", "bazen"]
    pub features: Vec<String>,
    /// Minimum number of guests
    pub persons: Option<f64>,
    /// Arrival date (YYYY-MM-DD)
    pub date_from: Option<String>,
    /// Departure date (YYYY-MM-DD)
    pub date_to: Option<String>,
    /// Minimum price (CZK)
    pub price_min: Option<f64>,
    /// Maximum price (CZK)
    pub price_max: Option<f64>,
    /// Result cap, defaults to 10, at most 100
    pub max_results: Option<f64>,
}

impl SearchCriteria {
    /// Effective result cap. Assumes the criteria passed validation.
    pub fn result_cap(&self) -> usize {
        match self.max_results {
            Some(n) if n.is_finite() && n >= 0.0 => (n as usize).min(MAX_RESULTS_CEILING),
            _ => DEFAULT_MAX_RESULTS,
        }
    }

    /// Trimmed free-text query, if one was given.
    pub fn text_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_cap_defaults_to_ten() {
        assert_eq!(SearchCriteria::default().result_cap(), DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn test_result_cap_uses_requested_value() {
        let criteria = SearchCriteria {
            max_results: Some(25.0),
            ..Default::default()
        };
        assert_eq!(criteria.result_cap(), 25);
    }

    #[test]
    fn test_deserializes_camel_case_arguments() {
        let criteria: SearchCriteria = serde_json::from_value(serde_json::json!({
            "region": "krkonose",
            "features": ["sauna"],
            "dateFrom": "2026-07-01",
            "priceMax": 5000,
            "maxResults": 5
        }))
        .unwrap();
        assert_eq!(criteria.region.as_deref(), Some("krkonose"));
        assert_eq!(criteria.features, vec!["sauna".to_string()]);
        assert_eq!(criteria.date_from.as_deref(), Some("2026-07-01"));
        assert_eq!(criteria.price_max, Some(5000.0));
        assert_eq!(criteria.result_cap(), 5);
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let criteria = SearchCriteria {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(criteria.text_query(), None);
    }
}
