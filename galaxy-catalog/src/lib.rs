//! Star catalog data model and durable JSON state store.
//!
//! This crate defines the persistent data model for the galaxy star catalog
//! without any network dependencies. Consumers use these types directly for
//! serialization, display, or passing to `galaxy-sync` for enrichment.

pub mod store;
pub mod types;

pub use store::{StoreError, load_catalog, persist_catalog};
pub use types::{DetailRecord, StarCatalog};
