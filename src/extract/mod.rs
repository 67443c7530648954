//! Extractor dispatch
//!
//! Maps a file's lower-cased extension to a registered extraction
//! capability. The registry is an explicit object built at startup and
//! handed to the engine; there is no ambient global table, so tests can
//! construct isolated registries. Registration overwrites (last writer
//! wins) and there is no removal operation — mutation is configuration-time
//! only, which `register(&mut self)` enforces.

pub mod archive;
pub mod document;
pub mod media;
pub mod text;

pub use archive::ArchiveExtractor;
pub use document::PdfExtractor;
pub use media::MediaExtractor;
pub use text::TextExtractor;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::meta::{extension_of, FileMetadata};

/// An extraction capability. May fail; the indexing orchestrator catches
/// and logs the failure and skips the file, it is never retried here.
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<FileMetadata>;
}

/// Fallback for unregistered extensions: filesystem-inherent attributes
/// only, tagged as opaque binary, no content.
pub struct GenericExtractor;

impl Extractor for GenericExtractor {
    fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let mut meta = FileMetadata::inherent(path)?;
        meta.set_file_type("binary");
        Ok(meta)
    }
}

pub struct ExtractorRegistry {
    by_extension: HashMap<String, Arc<dyn Extractor>>,
    generic: Arc<dyn Extractor>,
}

impl ExtractorRegistry {
    /// An empty registry; everything resolves to the generic capability.
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
            generic: Arc::new(GenericExtractor),
        }
    }

    /// The standard capability table for common media families.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let text: Arc<dyn Extractor> = Arc::new(TextExtractor);
        for ext in ["txt", "md", "log", "rst", "py", "java", "c", "rs", "json", "xml", "toml", "yaml", "yml"] {
            registry.register(ext, text.clone());
        }

        registry.register("pdf", Arc::new(PdfExtractor));

        let archive: Arc<dyn Extractor> = Arc::new(ArchiveExtractor);
        for ext in ["zip", "tar", "gz", "tgz"] {
            registry.register(ext, archive.clone());
        }

        let image: Arc<dyn Extractor> = Arc::new(MediaExtractor::image());
        for ext in ["jpg", "jpeg", "png", "gif", "tiff"] {
            registry.register(ext, image.clone());
        }

        let audio: Arc<dyn Extractor> = Arc::new(MediaExtractor::audio());
        for ext in ["mp3", "flac", "ogg", "m4a"] {
            registry.register(ext, audio.clone());
        }

        let video: Arc<dyn Extractor> = Arc::new(MediaExtractor::video());
        for ext in ["mp4", "avi", "mkv", "mov"] {
            registry.register(ext, video.clone());
        }

        registry
    }

    /// Register a capability for an extension, replacing any prior one.
    pub fn register(&mut self, extension: &str, extractor: Arc<dyn Extractor>) {
        let key = extension.trim_start_matches('.').to_lowercase();
        self.by_extension.insert(key, extractor);
    }

    /// Capability for a path, by lower-cased extension; generic fallback.
    pub fn resolve(&self, path: &Path) -> Arc<dyn Extractor> {
        self.by_extension
            .get(&extension_of(path))
            .cloned()
            .unwrap_or_else(|| self.generic.clone())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
