//! Text-family extraction

use std::path::Path;

use crate::error::{MetaError, Result};
use crate::extract::Extractor;
use crate::meta::FileMetadata;

/// Plain-text and source files: the whole (lossily decoded) content becomes
/// the searchable text.
pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let mut meta = FileMetadata::inherent(path)?;
        meta.set_file_type("text");

        let raw = std::fs::read(path).map_err(MetaError::Io)?;
        meta.content = String::from_utf8_lossy(&raw).into_owned();
        Ok(meta)
    }
}
