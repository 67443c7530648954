//! Search orchestrator
//!
//! Two strategies over the same store. `search` is consistency-first: it
//! triggers whatever indexing the ledger says is owed, then scans, so a
//! query never comes back empty just because roots were un-indexed.
//! `first_match` is latency-first: it interleaves per-file indexing with
//! predicate probes and returns on the first hit.

use crate::error::{MetaError, Result};
use crate::meta::{file_name, normalize_path};
use crate::query::{self, Predicate};
use crate::scanner;
use crate::storage::{DirectoryStatus, FileRecord, RESULT_CAP};

use super::indexer::Indexer;

pub struct Searcher {
    indexer: Indexer,
    lazy: bool,
}

impl Searcher {
    pub fn new(indexer: Indexer, lazy: bool) -> Self {
        Self { indexer, lazy }
    }

    /// Bulk query. Indexing owed by the ledger (or by an empty store, in
    /// lazy mode) runs first, so the result reflects the store state after
    /// that pass. Capped at RESULT_CAP, insertion order.
    pub fn search(&self, query_str: &str) -> Result<Vec<FileRecord>> {
        if self.lazy {
            self.indexer.bootstrap_if_empty()?;
        } else {
            self.indexer.reindex_stale()?;
        }

        let predicates = query::compile(query_str);
        self.indexer.store().scan(&predicates, RESULT_CAP)
    }

    /// Early-exit query: probe the store as-is, then walk roots file by
    /// file, indexing and re-probing each with the query narrowed to that
    /// file's basename. Returns on the first hit without finishing the
    /// walk — the partially-walked root stays out of the ledger, so a later
    /// bulk search will re-walk it. A root walked to the end with no hit is
    /// marked completed.
    pub fn first_match(&self, query_str: &str) -> Result<Option<FileRecord>> {
        let predicates = query::compile(query_str);

        if let Some(hit) = self.indexer.store().scan(&predicates, 1)?.into_iter().next() {
            return Ok(Some(hit));
        }

        for root in self.indexer.roots() {
            let root_key = normalize_path(root);
            for entry in scanner::scan_directory(root) {
                let path = entry.map_err(MetaError::Io)?;
                self.indexer.index_file(&path);

                let mut probe = predicates.clone();
                probe.push(Predicate::FieldMatch {
                    field: "name".to_string(),
                    value: file_name(&path),
                    direct: true,
                });
                if let Some(hit) = self.indexer.store().scan(&probe, 1)?.into_iter().next() {
                    tracing::debug!("First match at {} before completing {}", hit.path, root_key);
                    return Ok(Some(hit));
                }
            }
            self.indexer
                .store()
                .upsert_directory(&root_key, DirectoryStatus::Completed)?;
        }

        Ok(None)
    }
}
