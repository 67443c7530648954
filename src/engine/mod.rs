//! Engine facade
//!
//! Owns the store, the extractor registry and (optionally) the filesystem
//! watcher, and exposes the indexing and query entry points.

pub mod indexer;
pub mod searcher;

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::Result;
use crate::extract::ExtractorRegistry;
use crate::meta::{normalize_path, FileMetadata};
use crate::storage::{FileRecord, Store};
use crate::watcher::FsWatcher;

use indexer::Indexer;
use searcher::Searcher;

pub struct Engine {
    config: Config,
    store: Arc<Store>,
    registry: Arc<ExtractorRegistry>,
    watcher: Option<FsWatcher>,
}

impl Engine {
    /// Engine with the standard extractor table.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, ExtractorRegistry::with_defaults())
    }

    /// Engine with a caller-built registry. The registry is consumed here;
    /// capability registration is configuration-time only.
    pub fn with_registry(config: Config, registry: ExtractorRegistry) -> Result<Self> {
        let store = Arc::new(Store::open(&config.db_path)?);
        Self::assemble(config, registry, store)
    }

    fn assemble(config: Config, registry: ExtractorRegistry, store: Arc<Store>) -> Result<Self> {
        let registry = Arc::new(registry);
        let watcher = if config.enable_watcher {
            Some(FsWatcher::start(
                config.scan_paths.clone(),
                Arc::clone(&store),
                Arc::clone(&registry),
            )?)
        } else {
            None
        };

        Ok(Self { config, store, registry, watcher })
    }

    fn indexer(&self) -> Indexer {
        Indexer::new(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            self.config.scan_paths.clone(),
        )
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Bulk query; triggers owed indexing first (see Searcher).
    pub fn search(&self, query: &str) -> Result<Vec<FileRecord>> {
        Searcher::new(self.indexer(), self.config.lazy_indexing).search(query)
    }

    /// Early-exit query; may leave a partially-walked root un-completed.
    pub fn search_first_match(&self, query: &str) -> Result<Option<FileRecord>> {
        Searcher::new(self.indexer(), self.config.lazy_indexing).first_match(query)
    }

    /// Manual re-walk of one directory (need not be a configured root).
    pub fn update_index(&self, directory: &Path) -> Result<()> {
        self.indexer().index_directory(directory)
    }

    /// Index a single file through the same path the watcher uses.
    pub fn process_file(&self, path: &Path) {
        indexer::index_one(&self.store, &self.registry, path);
    }

    /// One-shot live extraction; nothing is written to the store.
    pub fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        self.registry.resolve(path).extract(path)
    }

    /// Attach caller attributes to a path. The file is extracted fresh when
    /// it exists; otherwise a placeholder record is synthesized, so
    /// metadata can precede the file itself.
    pub fn annotate(&self, path: &Path, attributes: Map<String, Value>) -> Result<()> {
        let mut meta = if path.exists() {
            self.registry.resolve(path).extract(path)?
        } else {
            FileMetadata::placeholder(path)
        };
        meta.extra.extend(attributes);
        self.store.upsert(&meta)?;
        tracing::info!("Annotated: {}", meta.path);
        Ok(())
    }

    /// Drop a path from the index. Failures are logged, never raised:
    /// removal must not disturb a walk or query in progress.
    pub fn remove_file(&self, path: &Path) {
        let key = normalize_path(path);
        if let Err(e) = self.store.delete(&key) {
            tracing::warn!("Failed to remove {} from index: {}", key, e);
        }
    }

    /// Stop the watcher thread, if one is running.
    pub fn shutdown(mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
    }
}
