// src/packages/traits.rs

//! Common traits for package archive readers

use crate::control::MetadataRecord;
use crate::error::Result;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads the embedded metadata block of a package archive
pub trait MetadataExtractor: Send + Sync {
    /// Open the metadata block of the archive at `path` as a text stream
    ///
    /// Fails with `Error::ExtractionError` if the archive cannot be unpacked
    /// or has no metadata block.
    fn extract(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// Extract and parse the metadata block
    fn extract_record(&self, path: &Path) -> Result<MetadataRecord> {
        let stream = self.extract(path)?;
        MetadataRecord::parse(BufReader::new(stream))
    }
}
