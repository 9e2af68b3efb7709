//! The bounded-concurrency enrichment scheduler.
//!
//! Work items are processed in fixed-size batches, strictly in sequence.
//! Within a batch every fetch is spawned as its own tokio task and gated by a
//! semaphore permit pool, so at most [`MAX_CONCURRENT_FETCHES`] detail fetches
//! are in flight at any instant. Results are written back by slot index, so
//! the final catalog is deterministic regardless of completion order.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use galaxy_catalog::{DetailRecord, StarCatalog};
use galaxy_scraper::{GalaxyClient, StarListing};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Duration;

use crate::checkpoint::CheckpointWriter;
use crate::diff;

/// Hard ceiling on simultaneous in-flight detail fetches.
pub const MAX_CONCURRENT_FETCHES: usize = 10;

/// Work items per batch. Batches run strictly one after another.
pub const BATCH_SIZE: usize = 50;

/// Pause between batches, a courtesy to the remote site. Independent of how
/// long the batch itself took.
pub const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Checkpoint after this many successful fetches within one batch.
const CHECKPOINT_EVERY: usize = 10;

/// Source of per-star detail records.
///
/// The production implementation scrapes the star's detail sub-page.
/// Unavailability for any reason resolves to `None`: the slot stays empty and
/// the star remains eligible on a future run.
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_detail(&self, name: &str) -> Option<DetailRecord>;
}

#[async_trait]
impl DetailSource for GalaxyClient {
    async fn fetch_detail(&self, name: &str) -> Option<DetailRecord> {
        match galaxy_scraper::star_detail(self, name).await {
            Ok(detail) => detail,
            Err(e) => {
                log::warn!("Detail fetch for '{}' failed: {}", name, e);
                None
            }
        }
    }
}

/// Options for one sync run.
pub struct SyncOptions {
    /// Concurrency cap for in-flight detail fetches.
    pub max_concurrent: usize,
    /// Work items per batch.
    pub batch_size: usize,
    /// Delay between batches.
    pub batch_pause: Duration,
    /// Cap on how many work items are fetched this run (appends still happen).
    pub limit: Option<usize>,
    /// Update the listing only; skip all detail fetches.
    pub skip_details: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_concurrent: MAX_CONCURRENT_FETCHES,
            batch_size: BATCH_SIZE,
            batch_pause: BATCH_PAUSE,
            limit: None,
            skip_details: false,
        }
    }
}

/// Statistics from a sync run.
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Stars in the catalog after the run.
    pub stars_total: usize,
    /// Stars with a detail record after the run.
    pub stars_detailed: usize,
    /// Stars appended this run.
    pub stars_added: usize,
    /// Work items whose fetch completed (either way) this run.
    pub stars_processed: usize,
    /// Detail records successfully fetched this run.
    pub details_fetched: usize,
    /// Work items that resolved without a record this run.
    pub details_unavailable: usize,
    /// Checkpoint writes that actually hit disk, final write included.
    pub checkpoints_written: usize,
}

/// Events emitted during a sync run for progress reporting.
#[derive(Debug)]
pub enum SyncEvent {
    /// Diff complete: how much work this run holds.
    ListingDiffed {
        listing_total: usize,
        new: usize,
        pending: usize,
        to_fetch: usize,
    },
    /// Fresh listing matches persisted state; storage is left untouched.
    NothingToDo,
    BatchStarted {
        batch: usize,
        batches: usize,
        size: usize,
    },
    StarResolved {
        slot: usize,
        name: String,
    },
    StarUnavailable {
        slot: usize,
        name: String,
    },
    CheckpointWritten,
    Done {
        stats: SyncStats,
    },
}

/// Run one full sync: diff, append, enrich in batches, checkpoint, final
/// write.
///
/// Individual fetch failures never abort the run. The returned catalog is the
/// authoritative post-run state; it has also been written to the checkpoint
/// path unless the diff found nothing to do.
pub async fn sync_stars<S: DetailSource + 'static>(
    source: Arc<S>,
    mut catalog: StarCatalog,
    listing: &StarListing,
    checkpoint: &CheckpointWriter,
    options: &SyncOptions,
    events: UnboundedSender<SyncEvent>,
) -> (StarCatalog, SyncStats) {
    let mut stats = SyncStats::default();

    let plan = diff::plan_sync(&catalog, listing);
    let _ = events.send(SyncEvent::ListingDiffed {
        listing_total: listing.len(),
        new: plan.new_stars.len(),
        pending: plan.pending,
        to_fetch: plan.work.len(),
    });

    if plan.is_empty() {
        log::info!("Catalog is up to date ({} stars)", catalog.len());
        stats.stars_total = catalog.len();
        stats.stars_detailed = catalog.detailed_count();
        let _ = events.send(SyncEvent::NothingToDo);
        let _ = events.send(SyncEvent::Done {
            stats: stats.clone(),
        });
        return (catalog, stats);
    }

    stats.stars_added = plan.new_stars.len();
    for star in plan.new_stars {
        catalog.append_star(star.name, star.color, star.creation_update, star.user);
    }

    let mut work = plan.work;
    if options.skip_details {
        work.clear();
    } else if let Some(limit) = options.limit {
        if work.len() > limit {
            log::info!("Limiting detail fetches to {} of {}", limit, work.len());
            work.truncate(limit);
        }
    }

    let batch_size = options.batch_size.max(1);
    let batches = work.len().div_ceil(batch_size);
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));

    for (batch_index, batch) in work.chunks(batch_size).enumerate() {
        let _ = events.send(SyncEvent::BatchStarted {
            batch: batch_index + 1,
            batches,
            size: batch.len(),
        });

        // Spawn the whole batch; the permit pool enforces the ceiling.
        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .map(|item| {
                let source = source.clone();
                let semaphore = semaphore.clone();
                let name = item.name.clone();
                let slot = item.slot;
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_closed) => return (slot, name, None),
                    };
                    let detail = source.fetch_detail(&name).await;
                    (slot, name, detail)
                })
            })
            .collect();

        let mut batch_successes = 0usize;
        while let Some(joined) = in_flight.next().await {
            stats.stars_processed += 1;
            match joined {
                Ok((slot, name, Some(detail))) => {
                    catalog.set_detail(slot, detail);
                    stats.details_fetched += 1;
                    batch_successes += 1;
                    let _ = events.send(SyncEvent::StarResolved { slot, name });

                    if batch_successes % CHECKPOINT_EVERY == 0 && checkpoint.save(&catalog) {
                        stats.checkpoints_written += 1;
                        let _ = events.send(SyncEvent::CheckpointWritten);
                    }
                }
                Ok((slot, name, None)) => {
                    stats.details_unavailable += 1;
                    log::debug!("No details for '{}' (slot {})", name, slot);
                    let _ = events.send(SyncEvent::StarUnavailable { slot, name });
                }
                Err(join_err) => {
                    // The slot was never written, so the star stays pending.
                    log::debug!("Detail fetch task panicked: {}", join_err);
                    stats.details_unavailable += 1;
                }
            }
        }

        if checkpoint.save(&catalog) {
            stats.checkpoints_written += 1;
            let _ = events.send(SyncEvent::CheckpointWritten);
        }

        if batch_index + 1 < batches && !options.batch_pause.is_zero() {
            tokio::time::sleep(options.batch_pause).await;
        }
    }

    if checkpoint.save_final(&catalog) {
        stats.checkpoints_written += 1;
        let _ = events.send(SyncEvent::CheckpointWritten);
    }

    stats.stars_total = catalog.len();
    stats.stars_detailed = catalog.detailed_count();
    log::info!(
        "Sync complete: {} stars, {} detailed, {} added, {} processed",
        stats.stars_total,
        stats.stars_detailed,
        stats.stars_added,
        stats.stars_processed
    );

    let _ = events.send(SyncEvent::Done {
        stats: stats.clone(),
    });

    (catalog, stats)
}
