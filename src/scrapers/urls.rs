//! Target URL construction and the host/scheme safety gate.

use crate::error::{Result, ScraperError};
use crate::scrapers::types::SearchCriteria;
use url::Url;

const SEARCH_PATH: &str = "chalupy";
const REGIONS_PATH: &str = "regiony";
const FEATURES_PATH: &str = "vybaveni";

/// Accept `candidate` only if it is an absolute https URL on the same host as `base`.
///
/// Every caller-supplied URL goes through here before it is fetched, so the
/// server can't be pointed at arbitrary hosts.
pub fn validate_target_url(candidate: &str, base: &Url) -> Result<Url> {
    let url = Url::parse(candidate.trim())
        .map_err(|e| ScraperError::invalid_url(format!("'{candidate}' is not an absolute URL ({e})")))?;

    if url.scheme() != "https" {
        return Err(ScraperError::invalid_url(format!(
            "scheme '{}' is not allowed, use https",
            url.scheme()
        )));
    }

    let allowed = base.host_str().unwrap_or_default();
    match url.host_str() {
        Some(host) if host == allowed => {}
        Some(host) => {
            return Err(ScraperError::invalid_url(format!(
                "host '{host}' is not allowed, only '{allowed}'"
            )))
        }
        None => return Err(ScraperError::invalid_url("URL has no host")),
    }

    if url.port().is_some() || !url.username().is_empty() || url.password().is_some() {
        return Err(ScraperError::invalid_url(
            "URLs with credentials or explicit ports are not allowed",
        ));
    }

    Ok(url)
}

/// Search page URL. Region becomes a path segment, the other filters query pairs.
///
/// The free-text query is deliberately absent: it filters parsed results.
pub fn build_search_url(base: &Url, criteria: &SearchCriteria) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ScraperError::internal("base URL cannot carry a path"))?;
        segments.clear().push(SEARCH_PATH);
        if let Some(region) = &criteria.region {
            segments.push(region);
        }
        segments.push("");
    }

    {
        let mut pairs = url.query_pairs_mut();
        if let Some(persons) = criteria.persons {
            pairs.append_pair("osob", &persons.to_string());
        }
        if let Some(from) = &criteria.date_from {
            pairs.append_pair("od", from);
        }
        if let Some(to) = &criteria.date_to {
            pairs.append_pair("do", to);
        }
        if let Some(min) = criteria.price_min {
            pairs.append_pair("cena_od", &min.to_string());
        }
        if let Some(max) = criteria.price_max {
            pairs.append_pair("cena_do", &max.to_string());
        }
        for feature in &criteria.features {
            pairs.append_pair("vybaveni", feature);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Which filter vocabulary a catalog page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Regions,
    Features,
}

impl CatalogKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Regions => "regions",
            Self::Features => "features",
        }
    }
}

pub fn catalog_url(base: &Url, kind: CatalogKind) -> Result<Url> {
    let path = match kind {
        CatalogKind::Regions => REGIONS_PATH,
        CatalogKind::Features => FEATURES_PATH,
    };
    base.join(&format!("/{path}/"))
        .map_err(|e| ScraperError::internal(format!("cannot build catalog URL: {e}")))
}

/// Turn an href found on a page into the canonical absolute listing URL.
///
/// Query and fragment are dropped; links leaving the site are rejected.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if url.host_str() != base.host_str() {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

/// Absolute form of an image reference; images may live on a CDN host.
pub fn resolve_asset(base: &Url, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    base.join(src).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.e-chalupy.cz").unwrap()
    }

    fn assert_invalid_url(result: Result<Url>) {
        match result {
            Err(ScraperError::InvalidUrl { .. }) => {}
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_listing_url_on_allowed_host() {
        let url = validate_target_url("https://www.e-chalupy.cz/chalupa/roubenka-pod-snezkou-1234/", &base())
            .unwrap();
        assert_eq!(url.path(), "/chalupa/roubenka-pod-snezkou-1234/");
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert_invalid_url(validate_target_url("https://evil.example.com/chalupa/1", &base()));
        assert_invalid_url(validate_target_url("https://e-chalupy.cz/chalupa/1", &base()));
        assert_invalid_url(validate_target_url(
            "https://www.e-chalupy.cz.evil.example/chalupa/1",
            &base(),
        ));
        assert_invalid_url(validate_target_url("https://169.254.169.254/latest/meta-data", &base()));
    }

    #[test]
    fn test_rejects_plain_http() {
        assert_invalid_url(validate_target_url("http://www.e-chalupy.cz/chalupa/1", &base()));
        assert_invalid_url(validate_target_url("ftp://www.e-chalupy.cz/chalupa/1", &base()));
    }

    #[test]
    fn test_rejects_relative_and_garbage() {
        assert_invalid_url(validate_target_url("/chalupa/1", &base()));
        assert_invalid_url(validate_target_url("not a url", &base()));
        assert_invalid_url(validate_target_url("", &base()));
    }

    #[test]
    fn test_rejects_credentials_and_ports() {
        assert_invalid_url(validate_target_url("https://user:pw@www.e-chalupy.cz/", &base()));
        assert_invalid_url(validate_target_url("https://www.e-chalupy.cz:8443/", &base()));
    }

    #[test]
    fn test_search_url_without_filters() {
        let url = build_search_url(&base(), &SearchCriteria::default()).unwrap();
        assert_eq!(url.as_str(), "https://www.e-chalupy.cz/chalupy/");
    }

    #[test]
    fn test_search_url_with_filters() {
        let criteria = SearchCriteria {
            query: Some("sauna".into()),
            region: Some("krkonose".into()),
            features: vec!["sauna".into(), "bazen".into()],
            persons: Some(6.0),
            date_from: Some("2026-07-01".into()),
            date_to: Some("2026-07-08".into()),
            price_min: Some(1000.0),
            price_max: Some(4500.0),
            max_results: Some(5.0),
        };
        let url = build_search_url(&base(), &criteria).unwrap();
        assert_eq!(url.path(), "/chalupy/krkonose/");
        assert_eq!(
            url.query(),
            Some("osob=6&od=2026-07-01&do=2026-07-08&cena_od=1000&cena_do=4500&vybaveni=sauna&vybaveni=bazen")
        );
        assert!(!url.as_str().contains("query"));
    }

    #[test]
    fn test_catalog_urls() {
        assert_eq!(
            catalog_url(&base(), CatalogKind::Regions).unwrap().as_str(),
            "https://www.e-chalupy.cz/regiony/"
        );
        assert_eq!(
            catalog_url(&base(), CatalogKind::Features).unwrap().as_str(),
            "https://www.e-chalupy.cz/vybaveni/"
        );
    }

    #[test]
    fn test_resolve_link() {
        let url = resolve_link(&base(), "/chalupa/pod-lesem-77/?utm_source=list#foto").unwrap();
        assert_eq!(url.as_str(), "https://www.e-chalupy.cz/chalupa/pod-lesem-77/");
        assert!(resolve_link(&base(), "https://booking.example.com/x").is_none());
        assert!(resolve_link(&base(), "#").is_none());
        assert!(resolve_link(&base(), "").is_none());
    }
}
