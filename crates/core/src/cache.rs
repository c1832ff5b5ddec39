//! Memoization of pipeline results per input file version.

use crate::config::PipelineOptions;
use crate::error::PipelineResult;
use crate::pipeline::load_tidy;
use crate::tidy::TidyTable;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Identity and version of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// Read the fingerprint of a file from its metadata.
    pub fn of(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: SourceFingerprint,
    table: Arc<TidyTable>,
}

/// Holds the tidy table of the most recent run.
///
/// A lookup with an unchanged fingerprint returns the shared table; a
/// changed fingerprint runs the pipeline again and replaces it. Each
/// session owns its own cache.
#[derive(Debug, Default)]
pub struct PipelineCache {
    entry: Option<CacheEntry>,
    runs: usize,
}

impl PipelineCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `fingerprint`, or build it with `load`.
    ///
    /// A failed load leaves any previous entry in place.
    pub fn get_or_insert_with<F>(
        &mut self,
        fingerprint: SourceFingerprint,
        load: F,
    ) -> PipelineResult<Arc<TidyTable>>
    where
        F: FnOnce() -> PipelineResult<TidyTable>,
    {
        if let Some(entry) = &self.entry {
            if entry.fingerprint == fingerprint {
                tracing::debug!("Pipeline cache hit for {}", fingerprint.path.display());
                return Ok(Arc::clone(&entry.table));
            }
            tracing::info!(
                "Input {} changed, rebuilding tidy table",
                fingerprint.path.display()
            );
        }

        let table = Arc::new(load()?);
        self.runs += 1;
        self.entry = Some(CacheEntry {
            fingerprint,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// Load `path` through the pipeline unless the cached run used the same
    /// file version.
    pub fn get_or_load(
        &mut self,
        path: impl AsRef<Path>,
        options: &PipelineOptions,
    ) -> PipelineResult<Arc<TidyTable>> {
        let path = path.as_ref();
        let fingerprint = SourceFingerprint::of(path)?;
        self.get_or_insert_with(fingerprint, || load_tidy(path, options))
    }

    /// Drop the cached entry if it was built from `path`.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if self
            .entry
            .as_ref()
            .is_some_and(|entry| entry.fingerprint.path == path)
        {
            self.entry = None;
        }
    }

    /// Drop any cached entry.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Number of pipeline runs performed through this cache.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Whether a table is currently cached.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }
}
