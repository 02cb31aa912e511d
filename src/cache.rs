//! Dataset Cache
//!
//! Keeps loaded measurement tables in memory so repeated report runs do not
//! re-read the spreadsheet export. Entries expire after a configurable TTL
//! and can be invalidated explicitly when the source file changes.
//!
//! The cache is an ordinary value passed by reference; there is no global
//! instance.

use crate::data::MeasurementTable;
use anyhow::Result;
use moka::sync::Cache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
const DEFAULT_CAPACITY: u64 = 16;

/// TTL cache of measurement tables keyed by source path
#[derive(Clone)]
pub struct DatasetCache {
    inner: Cache<PathBuf, Arc<MeasurementTable>>,
    ttl: Duration,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached table for `path`, or run `loader` and cache its result
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub fn get_or_load<F>(&self, path: &Path, loader: F) -> Result<Arc<MeasurementTable>>
    where
        F: FnOnce(&Path) -> Result<MeasurementTable>,
    {
        let key = path.to_path_buf();
        if let Some(table) = self.inner.get(&key) {
            tracing::debug!("Dataset cache hit: {:?}", path);
            return Ok(table);
        }

        tracing::debug!("Dataset cache miss: {:?}", path);
        let table = Arc::new(loader(path)?);
        self.inner.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Cached table for a CSV export, loading it on a miss
    pub fn load_csv(&self, path: &Path) -> Result<Arc<MeasurementTable>> {
        self.get_or_load(path, MeasurementTable::from_csv)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.contains_key(&path.to_path_buf())
    }

    /// Drop the entry for one source
    pub fn invalidate(&self, path: &Path) {
        self.inner.invalidate(&path.to_path_buf());
    }

    /// Drop every entry (e.g. after a bulk re-export)
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
