//! Diffing a fresh star listing against the persisted catalog.

use std::collections::HashSet;

use galaxy_catalog::StarCatalog;
use galaxy_scraper::StarListing;

/// One star that needs a detail fetch, with the catalog slot its result
/// belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub name: String,
    pub slot: usize,
}

/// A star from the fresh listing that is not yet in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStar {
    pub name: Option<String>,
    pub color: String,
    pub creation_update: String,
    pub user: String,
}

/// The computed work for one sync run.
///
/// `work` is ordered: new stars first (in fetch order, with the slots they
/// will occupy once appended), then already-known stars still missing details
/// (in persisted order).
#[derive(Debug, Default)]
pub struct SyncPlan {
    pub new_stars: Vec<NewStar>,
    pub work: Vec<WorkItem>,
    /// How many of the `work` items are previously-persisted stars.
    pub pending: usize,
}

impl SyncPlan {
    /// Nothing to append and nothing to fetch: the caller must leave
    /// storage untouched.
    pub fn is_empty(&self) -> bool {
        self.new_stars.is_empty() && self.work.is_empty()
    }
}

/// Compare the persisted catalog against a fresh listing.
///
/// Name comparison is exact equality, `None` included: an unnamed listing
/// entry is "new" only while the catalog has no unnamed entry yet. Duplicate
/// names within one listing are intentionally kept per-occurrence; the
/// upstream page has shown duplicates and we mirror it rather than guess.
/// Unnamed stars are appended but never enrolled for detail fetching.
pub fn plan_sync(catalog: &StarCatalog, listing: &StarListing) -> SyncPlan {
    let known: HashSet<&Option<String>> = catalog.names.iter().collect();

    let mut plan = SyncPlan::default();
    let mut next_slot = catalog.len();

    for i in 0..listing.len() {
        let name = &listing.names[i];
        if known.contains(name) {
            continue;
        }
        if let Some(n) = name {
            plan.work.push(WorkItem {
                name: n.clone(),
                slot: next_slot,
            });
        }
        plan.new_stars.push(NewStar {
            name: name.clone(),
            color: listing.colors[i].clone(),
            creation_update: listing.creation_update[i].clone(),
            user: listing.users[i].clone(),
        });
        next_slot += 1;
    }

    for (slot, (name, detail)) in catalog.names.iter().zip(&catalog.details).enumerate() {
        if detail.is_some() {
            continue;
        }
        let Some(name) = name else { continue };
        plan.work.push(WorkItem {
            name: name.clone(),
            slot,
        });
        plan.pending += 1;
    }

    plan
}
