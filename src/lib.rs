//! Scraper and tool server for vacation-rental listings on e-chalupy.cz.
//!
//! The [`scrapers`] module holds the core: input validation, the polite
//! HTTP fetcher, the catalog caches and the HTML extractors, tied together
//! by [`ChalupyScraper`]. The [`rpc`] module exposes it as four tools over
//! line-delimited JSON-RPC on stdio.

pub mod config;
pub mod error;
pub mod models;
pub mod rpc;
pub mod scrapers;
#[cfg(test)]
mod testing;

pub use config::ScoutConfig;
pub use error::{Result, ScraperError};
pub use rpc::RpcServer;
pub use scrapers::{ChalupyScraper, RentalSource, SearchCriteria};
