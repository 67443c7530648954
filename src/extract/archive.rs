//! Archive-family extraction

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::error::{MetaError, Result};
use crate::extract::Extractor;
use crate::meta::FileMetadata;

/// Archives: the member listing becomes a searchable attribute. Only zip
/// containers are opened; other archive extensions get the family tag with
/// no listing.
pub struct ArchiveExtractor;

impl Extractor for ArchiveExtractor {
    fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let mut meta = FileMetadata::inherent(path)?;
        meta.set_file_type("archive");

        if meta.extension == "zip" {
            let file = File::open(path).map_err(MetaError::Io)?;
            let archive = zip::ZipArchive::new(file)
                .map_err(|e| MetaError::Extraction(format!("{}: {}", path.display(), e)))?;
            let names: Vec<Value> = archive
                .file_names()
                .map(|n| Value::String(n.to_string()))
                .collect();
            meta.extra.insert("contained_files".to_string(), Value::Array(names));
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_zip_member_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");

        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("inner/readme.md", options).unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();

        let meta = ArchiveExtractor.extract(&path).unwrap();
        let listing = meta.extra.get("contained_files").unwrap();
        assert_eq!(listing[0], Value::String("inner/readme.md".into()));
        assert!(meta.composite_text().contains("inner/readme.md"));
    }

    #[test]
    fn test_corrupt_zip_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, "zip? no").unwrap();

        let err = ArchiveExtractor.extract(&path).unwrap_err();
        assert!(matches!(err, MetaError::Extraction(_)));
    }

    #[test]
    fn test_non_zip_archive_gets_family_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.tar");
        std::fs::write(&path, "x").unwrap();

        let meta = ArchiveExtractor.extract(&path).unwrap();
        assert_eq!(meta.extra.get("file_type"), Some(&Value::String("archive".into())));
        assert!(meta.extra.get("contained_files").is_none());
    }
}
