pub mod cache;
pub mod catalog_parser;
pub mod chalupy;
pub mod detail_parser;
pub mod dom;
pub mod http;
pub mod retry;
pub mod schema;
pub mod search_parser;
pub mod traits;
pub mod types;
pub mod urls;
pub mod validation;

pub use chalupy::ChalupyScraper;
pub use traits::{DocumentFetcher, RentalSource};
pub use types::SearchCriteria;
