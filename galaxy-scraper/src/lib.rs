pub mod client;
pub mod detail;
pub mod error;
pub mod extract;
pub mod types;

pub use client::GalaxyClient;
pub use detail::{parse_detail, star_detail};
pub use error::ScrapeError;
pub use extract::{extract_star_listing, find_star_listing};
pub use types::StarListing;
