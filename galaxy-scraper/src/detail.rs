//! Field extraction from a star's detail sub-page.
//!
//! Like the dataset discovery in [`crate::extract`], this is site-specific
//! pattern matching: the detail pages are server-rendered label/value markup
//! whose exact tags have varied. Each field is located independently; a page
//! where nothing matches yields no record at all.

use galaxy_catalog::DetailRecord;
use regex::Regex;

use crate::client::GalaxyClient;
use crate::error::ScrapeError;

/// Fetch and parse one star's detail page.
///
/// HTTP failures propagate as errors; a page that fetches fine but contains
/// no recognizable fields is `Ok(None)`.
pub async fn star_detail(
    client: &GalaxyClient,
    name: &str,
) -> Result<Option<DetailRecord>, ScrapeError> {
    let html = client.fetch_page(client.star_url(name)).await?;
    Ok(parse_detail(&html))
}

/// Parse the detail fields out of a star page's markup.
pub fn parse_detail(html: &str) -> Option<DetailRecord> {
    let record = DetailRecord {
        seed: labeled_field(html, "Seed"),
        time_played: labeled_field(html, "Time played"),
        comment: labeled_field(html, "Comment"),
        factorio_version: labeled_field(html, "Factorio version"),
        mods: mods_list(html),
        player_count: labeled_field(html, "Players").or_else(|| labeled_field(html, "Player count")),
        uploaded: labeled_field(html, "Uploaded"),
    };

    if record == DetailRecord::default() {
        return None;
    }
    Some(record)
}

/// Find the value for a labeled field, trying the markup forms the site has
/// used: definition lists first, then bare `Label: value` text.
fn labeled_field(html: &str, label: &str) -> Option<String> {
    let patterns = [
        format!(r"(?is)<dt[^>]*>\s*{label}\s*:?\s*</dt>\s*<dd[^>]*>(.*?)</dd>"),
        format!(r#"(?is)<[^>]*class\s*=\s*["'][^"']*label[^"']*["'][^>]*>\s*{label}\s*:?\s*</[^>]+>\s*<[^>]+>(.*?)</"#),
        format!(r"(?i){label}\s*:\s*([^<\r\n]+)"),
    ];

    for pattern in &patterns {
        let re = Regex::new(pattern).expect("field pattern must compile");
        if let Some(captures) = re.captures(html) {
            let value = clean_text(captures.get(1)?.as_str());
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Extract the mod list. List markup wins; otherwise a comma-separated value.
fn mods_list(html: &str) -> Vec<String> {
    let block = match labeled_block(html, "Mods") {
        Some(b) => b,
        None => return Vec::new(),
    };

    let li = Regex::new(r"(?is)<li[^>]*>(.*?)</li>").unwrap();
    let items: Vec<String> = li
        .captures_iter(&block)
        .filter_map(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        return items;
    }

    clean_text(&block)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The raw markup following a "Mods"-style label, before tag stripping.
fn labeled_block(html: &str, label: &str) -> Option<String> {
    let patterns = [
        format!(r"(?is)<dt[^>]*>\s*{label}[^<]*</dt>\s*<dd[^>]*>(.*?)</dd>"),
        format!(r"(?i){label}[^:<]*:\s*([^<\r\n]+)"),
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("block pattern must compile");
        if let Some(captures) = re.captures(html) {
            let raw = captures.get(1)?.as_str();
            if !clean_text(raw).is_empty() {
                return Some(raw.to_string());
            }
        }
    }
    None
}

/// Strip tags, decode the common entities, and collapse whitespace.
fn clean_text(raw: &str) -> String {
    let tags = Regex::new(r"<[^>]+>").unwrap();
    let no_tags = tags.replace_all(raw, " ");
    let decoded = no_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
        <html><body>
        <h1>Star: Gleba Prime</h1>
        <dl>
          <dt>Seed</dt><dd>3584217931</dd>
          <dt>Time played</dt><dd>142:30:11</dd>
          <dt>Factorio version</dt><dd>1.1.104</dd>
          <dt>Players</dt><dd>4</dd>
          <dt>Uploaded</dt><dd>2024-11-02 18:40</dd>
          <dt>Mods (2)</dt>
          <dd><ul><li>space-exploration</li><li>alien-biomes</li></ul></dd>
          <dt>Comment</dt><dd>Megabase &amp; rail world</dd>
        </dl>
        </body></html>
    "#;

    #[test]
    fn parses_definition_list_page() {
        let record = parse_detail(DETAIL_PAGE).unwrap();
        assert_eq!(record.seed.as_deref(), Some("3584217931"));
        assert_eq!(record.time_played.as_deref(), Some("142:30:11"));
        assert_eq!(record.factorio_version.as_deref(), Some("1.1.104"));
        assert_eq!(record.player_count.as_deref(), Some("4"));
        assert_eq!(record.uploaded.as_deref(), Some("2024-11-02 18:40"));
        assert_eq!(record.mods, vec!["space-exploration", "alien-biomes"]);
        assert_eq!(record.comment.as_deref(), Some("Megabase & rail world"));
    }

    #[test]
    fn parses_plain_text_labels() {
        let html = "Seed: 42\nFactorio version: 2.0.8\nMods: krastorio2, rampant";
        let record = parse_detail(html).unwrap();
        assert_eq!(record.seed.as_deref(), Some("42"));
        assert_eq!(record.factorio_version.as_deref(), Some("2.0.8"));
        assert_eq!(record.mods, vec!["krastorio2", "rampant"]);
        assert_eq!(record.comment, None);
    }

    #[test]
    fn unrecognizable_page_yields_none() {
        assert!(parse_detail("<html><body><p>404</p></body></html>").is_none());
    }

    #[test]
    fn empty_mods_block_yields_empty_vec() {
        let html = "<dl><dt>Seed</dt><dd>7</dd></dl>";
        let record = parse_detail(html).unwrap();
        assert!(record.mods.is_empty());
    }
}
