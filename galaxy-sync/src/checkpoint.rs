//! Rate-limited durable snapshots of in-progress sync state.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use galaxy_catalog::{StarCatalog, persist_catalog};

/// Minimum wall-clock gap between two checkpoint writes.
pub const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

/// Writes full catalog snapshots to the data file, at most once per interval.
///
/// Owns its own last-write timestamp and lock, so a run constructs exactly
/// one writer and threads it through the scheduler; no process-wide state.
/// The lock is a real mutex: saves can race between the driving task and
/// another scheduling context, and only one writer may be mid-write at a
/// time. A failed write is logged and swallowed; the in-memory catalog is
/// untouched and the next save (or the final one) retries.
pub struct CheckpointWriter {
    path: PathBuf,
    min_interval: Duration,
    last_write: Mutex<Option<Instant>>,
}

impl CheckpointWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_interval(path, CHECKPOINT_INTERVAL)
    }

    pub fn with_interval(path: impl Into<PathBuf>, min_interval: Duration) -> Self {
        Self {
            path: path.into(),
            min_interval,
            last_write: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rate-limited save. Returns whether a write actually happened.
    pub fn save(&self, catalog: &StarCatalog) -> bool {
        let mut last = self.lock_last_write();
        if let Some(written) = *last {
            if written.elapsed() < self.min_interval {
                return false;
            }
        }
        self.write(catalog, &mut last)
    }

    /// Unconditional save, bypassing the rate limit. Used for the final
    /// write of a run so the last state is always captured.
    pub fn save_final(&self, catalog: &StarCatalog) -> bool {
        let mut last = self.lock_last_write();
        self.write(catalog, &mut last)
    }

    fn write(&self, catalog: &StarCatalog, last: &mut Option<Instant>) -> bool {
        match persist_catalog(&self.path, catalog) {
            Ok(()) => {
                *last = Some(Instant::now());
                log::debug!(
                    "Checkpoint written to {} ({} stars, {} detailed)",
                    self.path.display(),
                    catalog.len(),
                    catalog.detailed_count()
                );
                true
            }
            Err(e) => {
                log::warn!(
                    "Checkpoint write to {} failed: {}. Progress is kept in memory.",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }

    fn lock_last_write(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        match self.last_write.lock() {
            Ok(guard) => guard,
            // A panic mid-write cannot leave the timestamp in a bad state.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
