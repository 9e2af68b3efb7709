//! Locating the embedded star dataset inside the galaxy page's scripts.
//!
//! The site inlines the dataset into one of its script blocks (or ships it in
//! an external bundle), and the exact form has shifted between site updates.
//! This module is deliberately pattern-based glue: a keyword scan narrows the
//! candidate scripts, then an ordered list of extraction patterns is tried
//! until one yields JSON with the expected keys. Upstream markup changes land
//! here and nowhere else.

use regex::Regex;

use crate::client::GalaxyClient;
use crate::error::ScrapeError;
use crate::types::StarListing;

/// Keywords that mark a script as a dataset candidate.
const DATASET_KEYWORDS: &[&str] = &["star", "galaxy", "names", "colors", "creation"];

/// Extraction patterns, tried in order. Each must capture the dataset object
/// in group 1. The list mirrors the forms the site has actually served.
fn dataset_patterns() -> Vec<Regex> {
    [
        r"(?s)const\s+stars\s*=\s*(\{[^;]+\});",
        r"(?s)let\s+stars\s*=\s*(\{[^;]+\});",
        r"(?s)var\s+stars\s*=\s*(\{[^;]+\});",
        r"(?s)window\.stars\s*=\s*(\{[^;]+\});",
        r"(?s)export\s+const\s+stars\s*=\s*(\{[^;]+\});",
        r#"(?s)"stars"\s*:\s*(\{[^}]+\})"#,
        r"(?s)stars:\s*(\{[^}]+\})",
        r"(?s)const\s+data\s*=\s*(\{[^;]+\});",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("dataset pattern must compile"))
    .collect()
}

/// Whether a script's content looks like it might hold the dataset.
pub fn looks_promising(content: &str) -> bool {
    let lower = content.to_lowercase();
    DATASET_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Contents of all inline `<script>` blocks in a page.
pub fn inline_scripts(html: &str) -> Vec<&str> {
    let re = Regex::new(r"(?is)<script(?:\s[^>]*)?>(.*?)</script>").unwrap();
    re.captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// `src` attributes of all external `<script>` tags in a page.
pub fn script_srcs(html: &str) -> Vec<String> {
    let re = Regex::new(r#"(?i)<script[^>]*\ssrc\s*=\s*["']([^"']+)["']"#).unwrap();
    re.captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Try to pull the star dataset out of one script's content.
///
/// Returns the raw (un-normalized) listing from the first pattern whose
/// capture parses as JSON with the required keys.
pub fn extract_star_listing(js_content: &str) -> Option<StarListing> {
    for pattern in dataset_patterns() {
        let Some(captures) = pattern.captures(js_content) else {
            continue;
        };
        let mut json_str = captures.get(1)?.as_str().trim();
        json_str = json_str.strip_suffix(',').unwrap_or(json_str);

        let value: serde_json::Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("Dataset candidate failed to parse as JSON: {}", e);
                continue;
            }
        };

        let has_required = ["names", "colors", "creation_update"]
            .iter()
            .all(|k| value.get(k).is_some());
        if !has_required {
            log::debug!("Dataset candidate is missing required keys");
            continue;
        }

        match serde_json::from_value::<StarListing>(value) {
            Ok(listing) => return Some(listing),
            Err(e) => {
                log::debug!("Dataset candidate has unexpected field types: {}", e);
                continue;
            }
        }
    }
    None
}

/// Fetch the galaxy page and locate the current star listing.
///
/// Scans inline scripts first, then external script bundles. Any failure here
/// is fatal to the run: without the listing there is nothing to sync.
pub async fn find_star_listing(client: &GalaxyClient) -> Result<StarListing, ScrapeError> {
    let page = client.fetch_page(client.galaxy_url()).await?;

    let inline = inline_scripts(&page);
    log::debug!("Found {} inline script blocks", inline.len());

    for content in &inline {
        if !looks_promising(content) {
            continue;
        }
        if let Some(listing) = extract_star_listing(content) {
            log::info!("Extracted star dataset from inline script ({} stars)", listing.len());
            return listing.normalize();
        }
    }

    // No inline data; try the external bundles.
    for src in script_srcs(&page) {
        let url = client.resolve(&src)?;
        log::debug!("Fetching external script {}", url);
        let content = client.fetch_page(url).await?;
        if !looks_promising(&content) {
            continue;
        }
        if let Some(listing) = extract_star_listing(&content) {
            log::info!(
                "Extracted star dataset from external script {} ({} stars)",
                src,
                listing.len()
            );
            return listing.normalize();
        }
    }

    Err(ScrapeError::DatasetNotFound)
}
