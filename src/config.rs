//! Engine configuration
//!
//! A `Config` can be built in code (embedded use) or loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MetaError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path of the SQLite index database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Root directories subject to indexing.
    #[serde(default)]
    pub scan_paths: Vec<PathBuf>,

    /// Defer indexing until the first query finds an empty store.
    /// When false, every search re-checks the completion ledger instead.
    #[serde(default = "default_true")]
    pub lazy_indexing: bool,

    /// Start the filesystem watcher thread alongside the engine.
    #[serde(default)]
    pub enable_watcher: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("metaseek.db")
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            scan_paths: Vec::new(),
            lazy_indexing: true,
            enable_watcher: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(MetaError::Io)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MetaError::State(format!("Bad config {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.lazy_indexing);
        assert!(!config.enable_watcher);
        assert!(config.scan_paths.is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metaseek.toml");
        std::fs::write(
            &path,
            r#"
db_path = "/tmp/idx.db"
scan_paths = ["/data/docs", "/data/media"]
lazy_indexing = false
enable_watcher = true
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/idx.db"));
        assert_eq!(config.scan_paths.len(), 2);
        assert!(!config.lazy_indexing);
        assert!(config.enable_watcher);
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metaseek.toml");
        std::fs::write(&path, "scan_paths = [\"/data\"]\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("metaseek.db"));
        assert!(config.lazy_indexing);
    }
}
