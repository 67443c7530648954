//! Directory walker
//!
//! Thin adapter over walkdir: yields every regular file under a root as an
//! absolute-ish path, surfacing walk errors so an interrupted enumeration
//! can abort the caller's pass. Symlinks are not followed. A fresh call
//! re-enumerates from the root; walks are not restartable mid-sequence.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub fn scan_directory(root: &Path) -> impl Iterator<Item = io::Result<PathBuf>> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    Some(Ok(entry.into_path()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
}
