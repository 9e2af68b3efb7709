//! Data model types for the star catalog.
//!
//! The catalog mirrors the upstream site's parallel-array layout: five
//! index-aligned sequences, one slot per star. Downstream consumers (the
//! stats site) read the persisted file positionally, so the arrays must stay
//! the same length at every write.

use serde::{Deserialize, Serialize};

/// Enrichment data scraped from a star's detail sub-page.
///
/// Every field is optional: the detail pages are user-submitted and omit
/// fields freely. `mods` is the one exception: an absent mod list is an
/// empty vec, not null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub time_played: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub factorio_version: Option<String>,
    #[serde(default)]
    pub mods: Vec<String>,
    #[serde(default)]
    pub player_count: Option<String>,
    #[serde(default)]
    pub uploaded: Option<String>,
}

/// The full star catalog as parallel arrays.
///
/// Invariant: all five sequences have equal length. Stars are append-only;
/// existing entries are never reordered or removed, and a `details` slot
/// transitions from `None` to `Some` at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarCatalog {
    pub names: Vec<Option<String>>,
    pub colors: Vec<String>,
    pub creation_update: Vec<String>,
    pub users: Vec<String>,
    pub details: Vec<Option<DetailRecord>>,
}

impl StarCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stars in the catalog.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether all five parallel sequences have equal length.
    pub fn is_aligned(&self) -> bool {
        let n = self.names.len();
        self.colors.len() == n
            && self.creation_update.len() == n
            && self.users.len() == n
            && self.details.len() == n
    }

    /// Number of stars with a populated detail record.
    pub fn detailed_count(&self) -> usize {
        self.details.iter().filter(|d| d.is_some()).count()
    }

    /// Append a new star to the end of all sequences, with no details yet.
    ///
    /// Returns the slot index the star now occupies.
    pub fn append_star(
        &mut self,
        name: Option<String>,
        color: String,
        creation_update: String,
        user: String,
    ) -> usize {
        let slot = self.names.len();
        self.names.push(name);
        self.colors.push(color);
        self.creation_update.push(creation_update);
        self.users.push(user);
        self.details.push(None);
        debug_assert!(self.is_aligned());
        slot
    }

    /// Fill the detail slot for a star.
    ///
    /// An already-populated slot is left untouched: details are written once
    /// and never overwritten.
    pub fn set_detail(&mut self, slot: usize, detail: DetailRecord) {
        if let Some(existing) = self.details.get_mut(slot) {
            if existing.is_none() {
                *existing = Some(detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_sequences_aligned() {
        let mut catalog = StarCatalog::new();
        let slot = catalog.append_star(
            Some("Alpha".to_string()),
            "#ff0000".to_string(),
            "1.1.0".to_string(),
            "user1".to_string(),
        );
        assert_eq!(slot, 0);
        assert!(catalog.is_aligned());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.details[0], None);
    }

    #[test]
    fn set_detail_does_not_overwrite() {
        let mut catalog = StarCatalog::new();
        catalog.append_star(Some("Alpha".to_string()), String::new(), String::new(), String::new());

        let first = DetailRecord {
            seed: Some("123".to_string()),
            ..Default::default()
        };
        catalog.set_detail(0, first.clone());

        let second = DetailRecord {
            seed: Some("456".to_string()),
            ..Default::default()
        };
        catalog.set_detail(0, second);

        assert_eq!(catalog.details[0].as_ref().unwrap().seed.as_deref(), Some("123"));
    }

    #[test]
    fn set_detail_out_of_range_is_ignored() {
        let mut catalog = StarCatalog::new();
        catalog.set_detail(5, DetailRecord::default());
        assert!(catalog.is_empty());
    }
}
