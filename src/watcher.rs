//! Filesystem watcher
//!
//! Background thread that mirrors filesystem churn into the store through
//! the same operations foreground indexing uses: create/modify events go
//! through the single-file index path, removals through delete. Events are
//! debounced per path so editors that write in bursts index once. All
//! failures here are logged and swallowed; the watcher must never disturb
//! a walk or query running on another thread.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::engine::indexer::index_one;
use crate::error::{MetaError, Result};
use crate::extract::ExtractorRegistry;
use crate::meta::normalize_path;
use crate::storage::Store;

const DEBOUNCE: Duration = Duration::from_millis(500);
const POLL: Duration = Duration::from_millis(50);

pub struct FsWatcher {
    stop: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl FsWatcher {
    pub fn start(
        paths: Vec<PathBuf>,
        store: Arc<Store>,
        registry: Arc<ExtractorRegistry>,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let thread_handle = thread::Builder::new()
            .name("metaseek-watcher".into())
            .spawn(move || watcher_loop(paths, store, registry, stop_flag))
            .map_err(MetaError::Io)?;

        Ok(Self {
            stop,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FsWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watcher_loop(
    paths: Vec<PathBuf>,
    store: Arc<Store>,
    registry: Arc<ExtractorRegistry>,
    stop: Arc<AtomicBool>,
) {
    let (tx, rx) = mpsc::channel();
    let mut watcher = match RecommendedWatcher::new(tx, notify::Config::default()) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!("Failed to create filesystem watcher: {}", e);
            return;
        }
    };

    for path in &paths {
        if let Err(e) = watcher.watch(path, RecursiveMode::Recursive) {
            tracing::warn!("Cannot watch {}: {}", path.display(), e);
        }
    }
    tracing::info!("Watching {} root(s)", paths.len());

    let mut event_queue: HashMap<PathBuf, Event> = HashMap::new();
    let mut last_activity = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        match rx.recv_timeout(POLL) {
            Ok(Ok(event)) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    for path in &event.paths {
                        event_queue.insert(path.clone(), event.clone());
                    }
                    last_activity = Instant::now();
                }
            }
            Ok(Err(e)) => tracing::warn!("Watch error: {}", e),
            Err(_) => {
                if !event_queue.is_empty() && last_activity.elapsed() >= DEBOUNCE {
                    let events = std::mem::take(&mut event_queue);
                    for (_path, event) in events {
                        route_event(&event, &store, &registry);
                    }
                }
            }
        }
    }
}

/// Apply one filesystem event to the store.
pub(crate) fn route_event(event: &Event, store: &Store, registry: &ExtractorRegistry) {
    for path in &event.paths {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                if path.is_file() {
                    tracing::debug!("Watch event, indexing: {}", path.display());
                    index_one(store, registry, path);
                }
            }
            EventKind::Remove(_) => {
                let key = normalize_path(path);
                tracing::debug!("Watch event, removing: {}", key);
                if let Err(e) = store.delete(&key) {
                    tracing::warn!("Failed to remove {} after watch event: {}", key, e);
                }
            }
            _ => {}
        }
    }
}
