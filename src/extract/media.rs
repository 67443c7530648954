//! Media-family extraction
//!
//! Image, audio and video files get filesystem-inherent attributes plus the
//! family tag. Deep parsing (EXIF, tags, stream probing) is a pluggable
//! capability: callers with a parser register their own `Extractor` for the
//! relevant extensions and it replaces these.

use std::path::Path;

use crate::error::Result;
use crate::extract::Extractor;
use crate::meta::FileMetadata;

pub struct MediaExtractor {
    family: &'static str,
}

impl MediaExtractor {
    pub fn image() -> Self {
        Self { family: "image" }
    }

    pub fn audio() -> Self {
        Self { family: "audio" }
    }

    pub fn video() -> Self {
        Self { family: "video" }
    }
}

impl Extractor for MediaExtractor {
    fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let mut meta = FileMetadata::inherent(path)?;
        meta.set_file_type(self.family);
        Ok(meta)
    }
}
