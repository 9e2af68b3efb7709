/// Errors that can occur while scraping the galaxy site.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Could not locate the star dataset in any page script")]
    DatasetNotFound,

    #[error("Star dataset has mismatched array lengths: {0}")]
    ListingShape(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
