//! File metadata attribute sets
//!
//! `FileMetadata` is the unit of exchange between extractors and the store.
//! The schema columns (path, name, size, timestamps, extension) are typed
//! fields; everything format-specific lands in the flattened `extra` map and
//! is persisted verbatim in the `attributes` column.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MetaError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub created: String,
    pub modified: String,
    #[serde(default)]
    pub extension: String,

    /// Extracted textual content, empty when the format carries none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    /// Format-specific attributes (file_type, exif, author, annotations...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileMetadata {
    /// Filesystem-inherent attributes for a path, from `stat` alone.
    pub fn inherent(path: &Path) -> Result<Self> {
        let stat = std::fs::metadata(path).map_err(MetaError::Io)?;
        let modified = stat.modified().map_err(MetaError::Io)?;
        let created = stat.created().unwrap_or(modified);

        Ok(Self {
            path: normalize_path(path),
            name: file_name(path),
            size_bytes: stat.len(),
            created: format_timestamp(created),
            modified: format_timestamp(modified),
            extension: extension_of(path),
            content: String::new(),
            extra: Map::new(),
        })
    }

    /// A placeholder record for a path that does not exist on disk.
    /// Used by annotation so metadata can be attached ahead of the file.
    pub fn placeholder(path: &Path) -> Self {
        let now = format_timestamp(SystemTime::now());
        Self {
            path: normalize_path(path),
            name: file_name(path),
            size_bytes: 0,
            created: now.clone(),
            modified: now,
            extension: extension_of(path),
            content: String::new(),
            extra: Map::new(),
        }
    }

    pub fn set_file_type(&mut self, file_type: &str) {
        self.extra
            .insert("file_type".to_string(), Value::String(file_type.to_string()));
    }

    /// The derived search blob: extracted content followed by every
    /// non-schema attribute rendered as `key:value`. Rebuilt in full on
    /// every upsert, never patched incrementally.
    pub fn composite_text(&self) -> String {
        let mut text = self.content.clone();
        for (key, value) in &self.extra {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(key);
            text.push(':');
            match value {
                Value::String(s) => text.push_str(s),
                other => text.push_str(&other.to_string()),
            }
        }
        text
    }
}

/// Absolute, normalized form of a path; the store's unique key.
/// Falls back to cwd-joining when the path does not resolve (absent files).
pub fn normalize_path(path: &Path) -> String {
    match std::fs::canonicalize(path) {
        Ok(p) => p.to_string_lossy().to_string(),
        Err(_) => {
            let abs: PathBuf = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            };
            abs.to_string_lossy().to_string()
        }
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// ISO-8601 local timestamp. Lexicographic order on these strings is
/// chronological order, which the range predicates rely on.
pub fn format_timestamp(time: SystemTime) -> String {
    let dt: DateTime<Local> = time.into();
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_text_renders_extra_attributes() {
        let mut meta = FileMetadata::placeholder(Path::new("/tmp/report.pdf"));
        meta.content = "quarterly results".to_string();
        meta.extra
            .insert("author".to_string(), Value::String("Kunal Wagh".to_string()));
        meta.extra.insert("page_count".to_string(), Value::from(12));

        let text = meta.composite_text();
        assert!(text.starts_with("quarterly results"));
        assert!(text.contains("author:Kunal Wagh"));
        assert!(text.contains("page_count:12"));
    }

    #[test]
    fn test_composite_text_empty_content() {
        let mut meta = FileMetadata::placeholder(Path::new("/tmp/a.bin"));
        meta.set_file_type("binary");
        assert_eq!(meta.composite_text(), "file_type:binary");
    }

    #[test]
    fn test_inherent_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Notes.TXT");
        std::fs::write(&path, "hello").unwrap();

        let meta = FileMetadata::inherent(&path).unwrap();
        assert_eq!(meta.name, "Notes.TXT");
        assert_eq!(meta.extension, "txt");
        assert_eq!(meta.size_bytes, 5);
        assert!(!meta.created.is_empty());
        assert!(!meta.modified.is_empty());
        assert!(Path::new(&meta.path).is_absolute());
    }

    #[test]
    fn test_attributes_round_trip() {
        let mut meta = FileMetadata::placeholder(Path::new("/tmp/x.txt"));
        meta.extra
            .insert("actor".to_string(), Value::String("abc".to_string()));

        let json = serde_json::to_string(&meta).unwrap();
        let back: FileMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path, meta.path);
        assert_eq!(back.extra.get("actor"), meta.extra.get("actor"));
    }

    #[test]
    fn test_timestamp_lexicographic_order() {
        let earlier = format_timestamp(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000));
        let later = format_timestamp(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000));
        assert!(earlier < later);
    }
}
