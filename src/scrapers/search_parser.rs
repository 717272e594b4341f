use crate::error::Result;
use crate::models::{ListingSummary, LOCATION_PLACEHOLDER, PRICE_PLACEHOLDER};
use crate::scrapers::dom::{first_attr, first_text};
use crate::scrapers::schema::{selector, SearchPageSchema};
use crate::scrapers::urls::{resolve_asset, resolve_link};
use scraper::Html;
use tracing::debug;
use url::Url;

/// Extract up to `cap` listings from a search result page, in document order.
///
/// Rows without a title or a detail link are skipped; missing price or
/// location fall back to placeholder text.
pub fn parse_search_results(
    html: &str,
    base: &Url,
    schema: &SearchPageSchema,
    cap: usize,
) -> Result<Vec<ListingSummary>> {
    let row_sel = selector(&schema.row)?;
    let title_sel = selector(&schema.title)?;
    let link_sel = selector(&schema.link)?;
    let price_sel = selector(&schema.price)?;
    let location_sel = selector(&schema.location)?;
    let description_sel = selector(&schema.description)?;
    let thumbnail_sel = selector(&schema.thumbnail)?;
    let rating_sel = selector(&schema.rating)?;

    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for (index, row) in document.select(&row_sel).enumerate() {
        if listings.len() >= cap {
            break;
        }

        let Some(title) = first_text(row, &title_sel) else {
            debug!(index, "Skipping listing row without title");
            continue;
        };
        let Some(url) = first_attr(row, &link_sel, "href").and_then(|href| resolve_link(base, &href)) else {
            debug!(index, title = %title, "Skipping listing row without detail link");
            continue;
        };

        let thumbnail = first_attr(row, &thumbnail_sel, "data-src")
            .or_else(|| first_attr(row, &thumbnail_sel, "src"))
            .and_then(|src| resolve_asset(base, &src));

        listings.push(ListingSummary {
            title,
            price: first_text(row, &price_sel).unwrap_or_else(|| PRICE_PLACEHOLDER.to_string()),
            location: first_text(row, &location_sel)
                .unwrap_or_else(|| LOCATION_PLACEHOLDER.to_string()),
            description: first_text(row, &description_sel).unwrap_or_default(),
            url: url.to_string(),
            thumbnail,
            rating: first_text(row, &rating_sel),
        });
    }

    Ok(listings)
}

/// Keep listings whose title, description or location contains `query`,
/// ignoring case.
pub fn filter_by_query(listings: Vec<ListingSummary>, query: &str) -> Vec<ListingSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return listings;
    }
    listings
        .into_iter()
        .filter(|listing| {
            [&listing.title, &listing.description, &listing.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
