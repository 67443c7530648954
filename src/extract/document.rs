//! Document-family extraction

use std::path::Path;

use crate::error::{MetaError, Result};
use crate::extract::Extractor;
use crate::meta::FileMetadata;

/// PDFs: extracted text becomes the searchable content.
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let mut meta = FileMetadata::inherent(path)?;
        meta.set_file_type("pdf");

        let text = pdf_extract::extract_text(path)
            .map_err(|e| MetaError::Extraction(format!("{}: {}", path.display(), e)))?;
        meta.content = text;
        Ok(meta)
    }
}
