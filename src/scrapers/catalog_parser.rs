use crate::error::{Result, ScraperError};
use crate::models::CatalogEntry;
use crate::scrapers::dom::{collapse_whitespace, first_text, text_of};
use crate::scrapers::schema::{selector, CatalogPageSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use tracing::debug;

/// Region slugs we know how to filter by
pub const KNOWN_REGIONS: &[&str] = &[
    "krkonose",
    "sumava",
    "jeseniky",
    "beskydy",
    "jizerske-hory",
    "orlicke-hory",
    "krusne-hory",
    "ceske-svycarsko",
    "cesky-raj",
    "lipno",
    "novohradske-hory",
    "broumovsko",
    "vysocina",
    "moravsky-kras",
    "podyji",
    "palava",
    "bile-karpaty",
    "ceska-kanada",
    "brdy",
    "krivoklatsko",
];

/// Amenity slugs we know how to filter by
pub const KNOWN_FEATURES: &[&str] = &[
    "bazen",
    "sauna",
    "virivka",
    "wellness",
    "krb",
    "wifi",
    "parkovani",
    "domaci-mazlicci",
    "detske-hriste",
    "gril",
    "pingpong",
    "kulecnik",
    "zahrada",
    "terasa",
    "mycka",
    "bezbarierovy-pristup",
];

/// "(1 234)" at the end of an anchor text
static TRAILING_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*(\d[\d\s\u{a0}]*)\s*\)\s*$").expect("valid count regex")
});

/// Collect allow-listed catalog entries from an overview page.
///
/// Anchors whose slug is unknown or whose count is missing or zero are
/// ignored; when a slug appears more than once the first anchor wins.
pub fn parse_catalog(
    html: &str,
    schema: &CatalogPageSchema,
    known_slugs: &[&str],
) -> Result<Vec<CatalogEntry>> {
    let anchor_sel = selector(&schema.anchor)?;
    let count_sel = selector(&schema.count)?;
    let name_sel = selector(&schema.name)?;
    let href_re = Regex::new(&schema.href_pattern)
        .map_err(|e| ScraperError::parse(format!("invalid href pattern: {e}")))?;

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(slug) = slug_from_href(&href_re, href) else {
            continue;
        };
        if !known_slugs.contains(&slug.as_str()) || seen.contains(&slug) {
            continue;
        }

        let text = text_of(anchor);
        let count = first_text(anchor, &count_sel)
            .and_then(|c| parse_count(&c))
            .or_else(|| {
                TRAILING_COUNT_RE
                    .captures(&text)
                    .and_then(|caps| parse_count(&caps[1]))
            });
        let Some(count) = count.filter(|c| *c > 0) else {
            debug!(slug = %slug, "Skipping catalog entry without listings");
            continue;
        };

        let name = first_text(anchor, &name_sel)
            .unwrap_or_else(|| collapse_whitespace(&TRAILING_COUNT_RE.replace(&text, "")));
        if name.is_empty() {
            continue;
        }

        seen.insert(slug.clone());
        entries.push(CatalogEntry { slug, name, count });
    }

    Ok(entries)
}

/// Slug captured by the schema's href pattern. Absolute links are reduced
/// to their path first; query strings are ignored.
fn slug_from_href(href_re: &Regex, href: &str) -> Option<String> {
    let href = href.trim();
    let path = match href.find("://") {
        Some(scheme_end) => {
            let rest = &href[scheme_end + 3..];
            &rest[rest.find('/')?..]
        }
        None => href,
    };
    let path = path.split(['?', '#']).next().unwrap_or(path);
    href_re
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// "1 234" or "1 234" (non-breaking space) → 1234
fn parse_count(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn regions(html: &str) -> Vec<CatalogEntry> {
        parse_catalog(html, &CatalogPageSchema::regions(), KNOWN_REGIONS).unwrap()
    }

    fn features(html: &str) -> Vec<CatalogEntry> {
        parse_catalog(html, &CatalogPageSchema::features(), KNOWN_FEATURES).unwrap()
    }

    #[test]
    fn test_known_slugs_are_valid_slugs() {
        for slug in KNOWN_REGIONS.iter().chain(KNOWN_FEATURES) {
            assert!(
                crate::scrapers::validation::validate_slug("slug", slug).is_ok(),
                "{slug}"
            );
        }
    }

    #[test]
    fn test_regions_fixture() {
        let regions = regions(fixtures::REGIONS_PAGE);
        let slugs: Vec<_> = regions.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["krkonose", "sumava", "jizerske-hory", "lipno"]);

        assert_eq!(
            regions[0],
            CatalogEntry {
                slug: "krkonose".into(),
                name: "Krkonoše".into(),
                count: 1234,
            }
        );
    }

    #[test]
    fn test_count_from_anchor_text() {
        let regions = regions(fixtures::REGIONS_PAGE);
        let lipno = regions.iter().find(|r| r.slug == "lipno").unwrap();
        assert_eq!(lipno.name, "Lipno");
        assert_eq!(lipno.count, 87);
    }

    #[test]
    fn test_unknown_zero_and_duplicate_entries_are_dropped() {
        let regions = regions(fixtures::REGIONS_PAGE);
        assert!(regions.iter().all(|r| r.slug != "atlantida"));
        // jeseniky is listed with (0)
        assert!(regions.iter().all(|r| r.slug != "jeseniky"));
        // sumava appears twice; the first count is kept
        let sumava: Vec<_> = regions.iter().filter(|r| r.slug == "sumava").collect();
        assert_eq!(sumava.len(), 1);
        assert_eq!(sumava[0].count, 815);
    }

    #[test]
    fn test_features_fixture() {
        let features = features(fixtures::FEATURES_PAGE);
        let slugs: Vec<_> = features.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs, vec!["bazen", "sauna", "krb", "wifi"]);
        assert_eq!(features[1].name, "Sauna");
        assert_eq!(features[1].count, 642);
    }

    #[test]
    fn test_absolute_links_on_the_site_are_understood() {
        let html = r#"<a href="https://www.e-chalupy.cz/chalupy/vybaveni/sauna/?page=2"><span class="name">Sauna</span><span class="count">12</span></a>"#;
        let features = features(html);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].slug, "sauna");
    }

    #[test]
    fn test_empty_page_yields_empty_list() {
        assert!(regions("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1 234"), Some(1234));
        assert_eq!(parse_count("1\u{a0}234 chalup"), Some(1234));
        assert_eq!(parse_count("žádné"), None);
    }
}
