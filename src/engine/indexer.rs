//! Indexing orchestrator
//!
//! Drives the walker over configured roots, dispatches extraction, and
//! maintains the directory completion ledger. Per-directory state machine
//! is two-valued: a root is either absent from the ledger or completed —
//! no partial-progress checkpoint is persisted, so an interrupted walk is
//! retried from scratch (upsert makes the retry idempotent).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{MetaError, Result};
use crate::extract::ExtractorRegistry;
use crate::meta::normalize_path;
use crate::scanner;
use crate::storage::{DirectoryStatus, Store};

pub struct Indexer {
    store: Arc<Store>,
    registry: Arc<ExtractorRegistry>,
    roots: Vec<PathBuf>,
}

impl Indexer {
    pub fn new(store: Arc<Store>, registry: Arc<ExtractorRegistry>, roots: Vec<PathBuf>) -> Self {
        Self { store, registry, roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Extract and upsert a single file. Per-file failures are logged and
    /// swallowed here; a failed file is simply absent from the index.
    pub fn index_file(&self, path: &Path) {
        index_one(&self.store, &self.registry, path);
    }

    /// Walk every file under `path` and index it. Walker errors propagate:
    /// a walk that fails partway leaves no ledger entry and is retried in
    /// full on the next trigger.
    pub fn index_directory(&self, path: &Path) -> Result<()> {
        tracing::info!("Indexing directory: {}", path.display());
        self.index_entries(scanner::scan_directory(path))
    }

    fn index_entries(&self, entries: impl Iterator<Item = io::Result<PathBuf>>) -> Result<()> {
        for entry in entries {
            let path = entry.map_err(MetaError::Io)?;
            self.index_file(&path);
        }
        Ok(())
    }

    /// Walk every configured root missing from the completion ledger, then
    /// mark it completed. Roots already in the ledger are never re-walked
    /// here, whatever the filesystem has done since.
    pub fn reindex_stale(&self) -> Result<()> {
        let completed = self.store.completed_directories()?;
        for root in &self.roots {
            let key = normalize_path(root);
            if completed.contains(&key) {
                continue;
            }
            self.index_directory(root)?;
            self.store.upsert_directory(&key, DirectoryStatus::Completed)?;
        }
        Ok(())
    }

    /// If the store holds no records at all, index every configured root
    /// unconditionally, ignoring prior ledger contents. Covers a store
    /// wiped externally while the ledger was not.
    pub fn bootstrap_if_empty(&self) -> Result<()> {
        if self.store.file_count()? > 0 {
            return Ok(());
        }
        tracing::info!("Metadata store is empty, triggering full index");
        for root in &self.roots {
            let key = normalize_path(root);
            self.index_directory(root)?;
            self.store.upsert_directory(&key, DirectoryStatus::Completed)?;
        }
        Ok(())
    }
}

/// The single-file index path, shared by foreground walks and the
/// filesystem watcher callbacks.
pub(crate) fn index_one(store: &Store, registry: &ExtractorRegistry, path: &Path) {
    let extractor = registry.resolve(path);
    let meta = match extractor.extract(path) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!("Extraction failed for {}: {}", path.display(), e);
            return;
        }
    };
    if let Err(e) = store.upsert(&meta) {
        tracing::warn!("Failed to store record for {}: {}", path.display(), e);
    } else {
        tracing::debug!("Indexed: {}", path.display());
    }
}
