//! metaseek: lazy file-metadata indexing and structured query engine
//!
//! Files get indexed into a SQLite-backed metadata store by pluggable
//! per-format extractors, lazily and incrementally rather than via an
//! upfront full scan. A small boolean-AND query DSL (field matches, ranges,
//! free text) compiles to store predicates, with two search strategies:
//! bulk consistency-first `search` and early-exit `search_first_match`.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod meta;
pub mod query;
pub mod scanner;
pub mod storage;
pub mod watcher;

pub use config::Config;
pub use engine::Engine;
pub use error::{MetaError, Result};
pub use extract::{Extractor, ExtractorRegistry};
pub use meta::FileMetadata;
pub use query::{compile, Predicate};
pub use storage::{DirectoryStatus, FileRecord, Store, RESULT_CAP};
