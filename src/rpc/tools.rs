//! Tool declarations and dispatch into a [`RentalSource`].

use crate::error::{Result, ScraperError};
use crate::rpc::protocol::ToolResult;
use crate::scrapers::traits::RentalSource;
use crate::scrapers::types::{SearchCriteria, DEFAULT_MAX_RESULTS, MAX_RESULTS_CEILING};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

pub const SEARCH_TOOL: &str = "search_chalupy";
pub const DETAILS_TOOL: &str = "get_property_details";
pub const REGIONS_TOOL: &str = "list_regions";
pub const FEATURES_TOOL: &str = "list_features";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DetailsArgs {
    url: String,
}

/// Declarations returned by `tools/list`.
pub fn tool_definitions() -> Value {
    json!([
        {
            "name": SEARCH_TOOL,
            "description": "Search vacation cottages and chalets on e-chalupy.cz. \
                Returns title, price, location, short description, URL, thumbnail and rating.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Free text matched against title, description and location (case-insensitive)"
                    },
                    "region": {
                        "type": "string",
                        "description": "Region slug from list_regions, e.g. \"krkonose\""
                    },
                    "features": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Amenity slugs from list_features, e.g. [\"sauna\", \"bazen\"]"
                    },
                    "persons": { "type": "number", "minimum": 0, "description": "Minimum number of guests" },
                    "dateFrom": { "type": "string", "description": "Arrival date, YYYY-MM-DD" },
                    "dateTo": { "type": "string", "description": "Departure date, YYYY-MM-DD" },
                    "priceMin": { "type": "number", "minimum": 0, "description": "Minimum price per night in CZK" },
                    "priceMax": { "type": "number", "minimum": 0, "description": "Maximum price per night in CZK" },
                    "maxResults": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": MAX_RESULTS_CEILING,
                        "default": DEFAULT_MAX_RESULTS,
                        "description": "Maximum number of listings to return"
                    }
                }
            }
        },
        {
            "name": DETAILS_TOOL,
            "description": "Get full details of one property: description, capacity, bedrooms, tags and equipment.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Property URL on https://www.e-chalupy.cz as returned by search_chalupy"
                    }
                },
                "required": ["url"]
            }
        },
        {
            "name": REGIONS_TOOL,
            "description": "List region slugs usable as the region filter, with listing counts.",
            "inputSchema": { "type": "object", "properties": {} }
        },
        {
            "name": FEATURES_TOOL,
            "description": "List amenity slugs usable as the features filter, with listing counts.",
            "inputSchema": { "type": "object", "properties": {} }
        }
    ])
}

/// Run a tool and render its outcome. Never fails: errors become flagged results.
pub async fn call_tool(source: &dyn RentalSource, name: &str, arguments: Option<Value>) -> ToolResult {
    info!(tool = name, "Tool call");
    let outcome = match name {
        SEARCH_TOOL => match parse_args::<SearchCriteria>(arguments) {
            Ok(criteria) => render(source.search_listings(&criteria).await),
            Err(e) => Err(e),
        },
        DETAILS_TOOL => match parse_args::<DetailsArgs>(arguments) {
            Ok(args) => render(source.get_listing_details(&args.url).await),
            Err(e) => Err(e),
        },
        REGIONS_TOOL => render(source.list_regions().await),
        FEATURES_TOOL => render(source.list_features().await),
        other => {
            warn!(tool = other, "Unknown tool requested");
            return ToolResult::error(format!("Unknown tool: {other}"));
        }
    };

    match outcome {
        Ok(text) => ToolResult::text(text),
        Err(err) => {
            match &err {
                ScraperError::Parse { .. } | ScraperError::Internal { .. } => {
                    error!(tool = name, error = %err, "Tool failed")
                }
                _ => warn!(tool = name, error = %err, "Tool failed"),
            }
            ToolResult::error(err.public_message())
        }
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T> {
    let value = match arguments {
        None | Some(Value::Null) => json!({}),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|e| ScraperError::invalid_parameter("arguments", e.to_string()))
}

fn render<T: Serialize>(result: Result<T>) -> Result<String> {
    let value = result?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| ScraperError::internal(format!("failed to serialize result: {e}")))
}
