// src/packages/deb.rs

//! Debian package (.deb) metadata extraction
//!
//! DEB packages are ar archives containing:
//! - debian-binary: version string "2.0\n"
//! - control.tar{,.gz,.xz,.zst}: package metadata and scripts
//! - data.tar.*: actual file contents
//!
//! Only the `control` file inside `control.tar.*` is read. Everything is
//! decoded in-process; no `dpkg-deb` or `tar` binaries are needed.

use super::traits::MetadataExtractor;
use crate::compression::{CompressionFormat, create_decoder};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Prefix of the ar member holding package metadata
const CONTROL_MEMBER_PREFIX: &str = "control.tar";

/// Name of the metadata file inside the control tarball
const CONTROL_FILE: &str = "control";

/// Upper bound on the control file size (16 MB)
const MAX_CONTROL_SIZE: u64 = 16 * 1024 * 1024;

/// Extracts the control record from `.deb` archives
#[derive(Debug, Default, Clone, Copy)]
pub struct DebExtractor;

impl DebExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read the raw `control.tar.*` member and its compression format
    fn read_control_member(path: &Path) -> Result<(CompressionFormat, Vec<u8>)> {
        let fail = |reason: String| Error::ExtractionError {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| fail(format!("failed to open archive: {e}")))?;
        let mut archive = ar::Archive::new(file);

        while let Some(entry) = archive.next_entry() {
            let mut entry = entry.map_err(|e| fail(format!("failed to read ar archive: {e}")))?;
            let name = String::from_utf8_lossy(entry.header().identifier())
                .trim_end_matches('/')
                .to_string();

            if name.starts_with(CONTROL_MEMBER_PREFIX) {
                let format = CompressionFormat::from_extension(&name);
                let mut data = Vec::new();
                entry
                    .read_to_end(&mut data)
                    .map_err(|e| fail(format!("failed to read {name}: {e}")))?;
                debug!("Found {} ({}, {} bytes)", name, format, data.len());
                return Ok((format, data));
            }
        }

        Err(fail(format!("no {CONTROL_MEMBER_PREFIX}.* member found")))
    }

    /// Pull the `control` file out of a (possibly compressed) tarball
    fn read_control_file(path: &Path, format: CompressionFormat, member: &[u8]) -> Result<Vec<u8>> {
        let fail = |reason: String| Error::ExtractionError {
            path: path.display().to_string(),
            reason,
        };

        let decoder = create_decoder(member, format)
            .map_err(|e| fail(format!("failed to decode control tarball: {e}")))?;
        let mut tarball = tar::Archive::new(decoder);

        let entries = tarball
            .entries()
            .map_err(|e| fail(format!("failed to read control tarball: {e}")))?;

        for entry in entries {
            let entry = entry.map_err(|e| fail(format!("failed to read control tarball entry: {e}")))?;
            let entry_path = entry
                .path()
                .map_err(|e| fail(format!("invalid path in control tarball: {e}")))?
                .to_string_lossy()
                .to_string();

            if entry_path.trim_start_matches("./") != CONTROL_FILE {
                continue;
            }

            let size = entry.header().size().unwrap_or(0);
            if size > MAX_CONTROL_SIZE {
                return Err(fail(format!("control file too large ({size} bytes)")));
            }

            let mut content = Vec::new();
            entry
                .take(MAX_CONTROL_SIZE)
                .read_to_end(&mut content)
                .map_err(|e| fail(format!("failed to read control file: {e}")))?;
            return Ok(content);
        }

        Err(fail("control tarball has no control file".to_string()))
    }
}

impl MetadataExtractor for DebExtractor {
    fn extract(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        debug!("Extracting control record from {}", path.display());

        let (format, member) = Self::read_control_member(path)?;
        let control = Self::read_control_file(path, format, &member)?;

        Ok(Box::new(Cursor::new(control)))
    }
}
