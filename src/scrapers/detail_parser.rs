use crate::error::{Result, ScraperError};
use crate::models::{ListingDetail, LOCATION_PLACEHOLDER, PRICE_PLACEHOLDER};
use crate::scrapers::dom::{first_attr, first_text, text_of};
use crate::scrapers::schema::{selector, DetailPageSchema};
use crate::scrapers::urls::resolve_asset;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::collections::BTreeMap;
use url::Url;

/// Length of the short description, in characters.
pub const SHORT_DESCRIPTION_LEN: usize = 200;

static CAPACITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*osob").expect("valid capacity regex"));
static BEDROOMS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*ložnic").expect("valid bedrooms regex"));

/// Patterns over the metadata description, built from the schema's prefix and glyph.
struct MetaPatterns {
    location: Regex,
    rating: Regex,
    summary: Regex,
}

impl MetaPatterns {
    fn new(schema: &DetailPageSchema) -> Result<Self> {
        let prefix = regex::escape(&schema.location_prefix);
        let glyph = regex::escape(&schema.rating_glyph);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| ScraperError::parse(format!("invalid metadata pattern: {e}")))
        };
        Ok(Self {
            location: compile(format!(r"{prefix}\s*(.+?)\s*{glyph}"))?,
            rating: compile(format!(r"{glyph}\s*(\d+(?:[.,]\d+)?)"))?,
            summary: compile(format!(r"{glyph}\s*[\d.,]*\s*[|·–-]\s*(.+)$"))?,
        })
    }

    fn capture(re: &Regex, text: &str) -> Option<String> {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Parse a property page into a [`ListingDetail`].
pub fn parse_listing_detail(html: &str, url: &Url, schema: &DetailPageSchema) -> Result<ListingDetail> {
    let patterns = MetaPatterns::new(schema)?;
    let document = Html::parse_document(html);
    let root = document.root_element();

    let location_sel = selector(&schema.location)?;
    let rating_sel = selector(&schema.rating)?;
    let primary_sel = selector(&schema.description_primary)?;
    let secondary_sel = selector(&schema.description_secondary)?;

    let meta = first_attr(root, &selector(&schema.meta_description)?, "content");
    let from_meta = |re: &Regex| meta.as_deref().and_then(|m| MetaPatterns::capture(re, m));

    let location = from_meta(&patterns.location)
        .or_else(|| first_text(root, &location_sel))
        .unwrap_or_else(|| LOCATION_PLACEHOLDER.to_string());

    let rating = from_meta(&patterns.rating).or_else(|| first_text(root, &rating_sel));

    // Metadata summary first, then the primary and secondary body selectors.
    let full_description = from_meta(&patterns.summary)
        .or_else(|| first_text(root, &primary_sel))
        .or_else(|| first_text(root, &secondary_sel))
        .unwrap_or_default();

    let tags: Vec<String> = all_texts(root, &schema.tags)?;
    let (capacity, bedrooms) = derive_counts(&tags);

    Ok(ListingDetail {
        title: first_text(root, &selector(&schema.title)?).unwrap_or_default(),
        price: first_text(root, &selector(&schema.price)?)
            .unwrap_or_else(|| PRICE_PLACEHOLDER.to_string()),
        location,
        description: short_description(&full_description),
        full_description,
        url: url.to_string(),
        thumbnail: first_attr(root, &selector(&schema.image)?, "content")
            .and_then(|src| resolve_asset(url, &src)),
        rating,
        features: all_texts(root, &schema.features)?,
        capacity,
        bedrooms,
        tags,
        equipment: parse_equipment(root, schema)?,
    })
}

fn all_texts(root: scraper::ElementRef<'_>, css: &str) -> Result<Vec<String>> {
    let sel = selector(css)?;
    Ok(root
        .select(&sel)
        .map(text_of)
        .filter(|text| !text.is_empty())
        .collect())
}

/// Guest capacity and bedroom count from tags like "chalupa 14 osob" or
/// "4 ložnice". The first tag matching each pattern wins.
pub fn derive_counts(tags: &[String]) -> (Option<u32>, Option<u32>) {
    let mut capacity = None;
    let mut bedrooms = None;
    for tag in tags {
        if capacity.is_none() {
            capacity = first_number(&CAPACITY_RE, tag);
        }
        if bedrooms.is_none() {
            bedrooms = first_number(&BEDROOMS_RE, tag);
        }
    }
    (capacity, bedrooms)
}

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Equipment items keyed by group heading; groups missing either are dropped.
fn parse_equipment(
    root: scraper::ElementRef<'_>,
    schema: &DetailPageSchema,
) -> Result<BTreeMap<String, Vec<String>>> {
    let group_sel = selector(&schema.equipment_group)?;
    let heading_sel = selector(&schema.equipment_heading)?;
    let item_sel = selector(&schema.equipment_item)?;

    let mut equipment: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for group in root.select(&group_sel) {
        let Some(heading) = first_text(group, &heading_sel) else {
            continue;
        };
        let items: Vec<String> = group
            .select(&item_sel)
            .map(text_of)
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            continue;
        }
        equipment.entry(heading).or_default().extend(items);
    }
    Ok(equipment)
}

/// First 200 characters, with "..." appended only when something was cut.
pub fn short_description(full: &str) -> String {
    match full.char_indices().nth(SHORT_DESCRIPTION_LEN) {
        Some((cut, _)) => format!("{}...", &full[..cut]),
        None => full.to_string(),
    }
}
