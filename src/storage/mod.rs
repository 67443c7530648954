pub mod connection;
pub mod store;

pub use store::{Store, RESULT_CAP};

use crate::error::Result;
use crate::meta::FileMetadata;

/// One row of the files table.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    pub size_bytes: u64,
    pub created: String,
    pub modified: String,
    pub extension: String,
    pub composite_text: String,
    /// Full serialized attribute set, superset of the typed columns.
    pub attributes: String,
}

impl FileRecord {
    /// Deserialize the persisted attribute set back into metadata.
    pub fn metadata(&self) -> Result<FileMetadata> {
        serde_json::from_str(&self.attributes)
            .map_err(|e| crate::error::MetaError::State(format!("Corrupt attributes row: {}", e)))
    }
}

impl std::fmt::Display for FileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes, .{})", self.path, self.size_bytes, self.extension)
    }
}

/// Ledger state of a configured root. No intermediate state is persisted:
/// a walk either completes and writes `Completed`, or leaves nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStatus {
    Incomplete,
    Completed,
}

impl DirectoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryStatus::Incomplete => "incomplete",
            DirectoryStatus::Completed => "completed",
        }
    }
}
