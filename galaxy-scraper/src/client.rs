use std::time::Duration;

use reqwest::Url;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::ScrapeError;

const DEFAULT_BASE_URL: &str = "https://factorio.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// The galaxy page serves a stripped-down document to unknown agents, so
// present a plain desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client for the galaxy site.
pub struct GalaxyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GalaxyClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against an alternate base URL (local test servers).
    pub fn with_base_url(base: &str) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let base_url =
            Url::parse(base).map_err(|e| ScrapeError::InvalidUrl(format!("{base}: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the main galaxy page.
    pub fn galaxy_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("galaxy");
        }
        url
    }

    /// URL of a star's detail sub-page. The name is percent-encoded as a
    /// single path segment.
    pub fn star_url(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("galaxy").push(name);
        }
        url
    }

    /// Resolve a possibly-relative script URL against the base.
    pub fn resolve(&self, href: &str) -> Result<Url, ScrapeError> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Url::parse(href).map_err(|e| ScrapeError::InvalidUrl(format!("{href}: {e}")));
        }
        self.base_url
            .join(href)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{href}: {e}")))
    }

    /// Fetch a page body. Non-success statuses are errors.
    pub async fn fetch_page(&self, url: Url) -> Result<String, ScrapeError> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_url_encodes_name_as_one_segment() {
        let client = GalaxyClient::new().unwrap();
        let url = client.star_url("My Star/With?Odd Chars");
        assert_eq!(
            url.as_str(),
            "https://factorio.com/galaxy/My%20Star%2FWith%3FOdd%20Chars"
        );
    }

    #[test]
    fn resolve_handles_relative_and_absolute() {
        let client = GalaxyClient::new().unwrap();
        assert_eq!(
            client.resolve("/static/spacemap.js").unwrap().as_str(),
            "https://factorio.com/static/spacemap.js"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/app.js").unwrap().as_str(),
            "https://cdn.example.com/app.js"
        );
    }
}
