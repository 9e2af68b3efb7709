//! Durable JSON storage for the star catalog.
//!
//! The on-disk shape is the contract the stats frontend depends on:
//!
//! ```text
//! { "stars": { "names": [...], "colors": [...], "creation_update": [...],
//!              "users": [...], "details": [...] } }
//! ```
//!
//! Loads are forgiving (missing or corrupt file → empty catalog); writes go
//! through a temp file and rename so a concurrent reader never sees a
//! partially written file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::StarCatalog;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level document wrapper matching the frontend's expected shape.
#[derive(Debug, Serialize, Deserialize)]
struct DataFile {
    stars: StarCatalog,
}

/// Load the catalog from `path`.
///
/// A missing file yields an empty catalog. A file that exists but does not
/// parse as the expected shape also yields an empty catalog, with a warning;
/// re-fetching known stars is the safe fallback, losing the run is not.
pub fn load_catalog(path: &Path) -> StarCatalog {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No existing data file at {}, starting fresh", path.display());
            return StarCatalog::new();
        }
        Err(e) => {
            log::warn!(
                "Could not read data file {}: {}. Starting from an empty catalog.",
                path.display(),
                e
            );
            return StarCatalog::new();
        }
    };

    match serde_json::from_str::<DataFile>(&contents) {
        Ok(data) if data.stars.is_aligned() => data.stars,
        Ok(data) => {
            log::warn!(
                "Data file {} has misaligned star arrays ({} names). Starting from an empty catalog.",
                path.display(),
                data.stars.names.len()
            );
            StarCatalog::new()
        }
        Err(e) => {
            log::warn!(
                "Data file {} is not valid catalog JSON: {}. Starting from an empty catalog.",
                path.display(),
                e
            );
            StarCatalog::new()
        }
    }
}

/// Write the full catalog to `path`, replacing any prior content.
///
/// Writes to a `.tmp` sibling first, then renames over the target.
pub fn persist_catalog(path: &Path, catalog: &StarCatalog) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(&DataFile {
        stars: catalog.clone(),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| StoreError::Io {
        path: tmp.display().to_string(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
