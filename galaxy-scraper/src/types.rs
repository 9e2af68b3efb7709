//! Response types for the galaxy page's embedded star dataset.

use serde::Deserialize;

use crate::error::ScrapeError;

/// The freshly fetched star list, as embedded in the galaxy page's scripts.
///
/// Early revisions of the upstream dataset omitted the `users` array, so it
/// deserializes with a default; [`StarListing::normalize`] pads it back to
/// full length before the listing is handed to the sync pipeline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StarListing {
    pub names: Vec<Option<String>>,
    pub colors: Vec<String>,
    pub creation_update: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

impl StarListing {
    /// Number of stars in the listing.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Pad an absent `users` array, then require all sequences equal length.
    pub fn normalize(mut self) -> Result<Self, ScrapeError> {
        if self.users.is_empty() && !self.names.is_empty() {
            self.users = vec![String::new(); self.names.len()];
        }

        let n = self.names.len();
        if self.colors.len() != n || self.creation_update.len() != n || self.users.len() != n {
            return Err(ScrapeError::ListingShape(format!(
                "names: {}, colors: {}, creation_update: {}, users: {}",
                n,
                self.colors.len(),
                self.creation_update.len(),
                self.users.len()
            )));
        }
        Ok(self)
    }
}
