// src/repository/builder.rs

//! Repository build orchestration
//!
//! A build runs in fixed stages:
//! 1. Fetch each architecture's previously published `Packages` index
//!    (in parallel). A missing index starts that architecture empty.
//! 2. Reset the output directory.
//! 3. Extract, pool and merge every new archive, in order.
//! 4. Write `Packages` and `Packages.gz` per architecture, digesting both
//!    while they are written.
//! 5. Write `dists/stable/Release`.
//!
//! Any error aborts the build before stage 5, so a failed build never leaves
//! a Release file behind.

use super::layout::{
    PACKAGES_FILE, PACKAGES_GZ_FILE, RELEASE_DIR, binary_dir, packages_key, pool_path, suite_dir,
};
use super::packages::{PackageEntry, PackageSet};
use super::release::ReleaseBuilder;
use crate::compression::{decompress_auto, gzip_encoder};
use crate::config::{DEFAULT_ARCHITECTURES, validate_architectures, validate_channel};
use crate::error::{Error, Result};
use crate::hash::{DigestWriter, Digests};
use crate::packages::{DebExtractor, MetadataExtractor};
use crate::storage::{ObjectStore, get_optional};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Settings for one repository build
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Release channel, used as suite, codename and pool segment
    pub channel: String,
    /// Licence stamped on every new entry
    pub licence: String,
    /// Vendor stamped on every new entry
    pub vendor: String,
    /// Release `Description:`
    pub description: String,
    /// Release `Origin:`; defaults to "<vendor> APT Repository"
    pub origin: Option<String>,
    /// Release `Label:`; defaults to the vendor
    pub label: Option<String>,
    /// Architectures to publish, in Release order
    pub architectures: Vec<String>,
    /// Directory the layout is written to. Removed and recreated by a build.
    pub output_dir: PathBuf,
    /// Release `Date:`
    pub date: DateTime<Utc>,
}

impl BuildConfig {
    pub fn new(channel: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            channel: channel.into(),
            licence: String::new(),
            vendor: String::new(),
            description: String::new(),
            origin: None,
            label: None,
            architectures: DEFAULT_ARCHITECTURES.iter().map(|a| a.to_string()).collect(),
            output_dir: output_dir.into(),
            date: Utc::now(),
        }
    }

    /// Effective `Origin:` value
    pub fn origin(&self) -> String {
        self.origin
            .clone()
            .unwrap_or_else(|| format!("{} APT Repository", self.vendor))
    }

    /// Effective `Label:` value
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.vendor.clone())
    }
}

/// Summary of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Package count per architecture, in Release order
    pub packages: Vec<(String, usize)>,
    /// Number of archives added by this build
    pub added: usize,
    /// Location of the written Release file
    pub release_path: PathBuf,
}

impl BuildReport {
    /// Total number of entries across all architectures
    pub fn total_packages(&self) -> usize {
        self.packages.iter().map(|(_, count)| count).sum()
    }
}

/// Builds an APT repository layout from new archives and the published index
pub struct RepositoryBuilder<'a> {
    config: BuildConfig,
    store: Option<&'a dyn ObjectStore>,
    extractor: Box<dyn MetadataExtractor>,
}

impl<'a> RepositoryBuilder<'a> {
    /// Create a builder with no prior index and the native `.deb` extractor
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            store: None,
            extractor: Box::new(DebExtractor::new()),
        }
    }

    /// Read the previously published index from `store`
    pub fn with_store(mut self, store: &'a dyn ObjectStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the archive metadata extractor
    pub fn with_extractor(mut self, extractor: Box<dyn MetadataExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run a full build over `archives`
    pub fn build<P: AsRef<Path>>(&self, archives: &[P]) -> Result<BuildReport> {
        let config = &self.config;
        validate_channel(&config.channel)?;
        validate_architectures(&config.architectures)?;

        info!(
            "Building channel '{}' for {} ({} new archives)",
            config.channel,
            config.architectures.join(", "),
            archives.len()
        );

        let mut sets = self.load_indexes()?;

        reset_dir(&config.output_dir)?;

        for archive in archives {
            self.add_archive(archive.as_ref(), &mut sets)?;
        }

        let mut release = ReleaseBuilder::new(config.channel.as_str())
            .origin(config.origin())
            .label(config.label())
            .description(config.description.as_str())
            .architectures(config.architectures.iter().cloned());

        let mut packages = Vec::with_capacity(config.architectures.len());
        for arch in &config.architectures {
            let set = sets.remove(arch).unwrap_or_default();
            self.write_index(arch, &set, &mut release)?;
            packages.push((arch.clone(), set.len()));
        }

        let release_path = self.write_release(release)?;

        Ok(BuildReport {
            packages,
            added: archives.len(),
            release_path,
        })
    }

    /// Fetch every architecture's prior index, one task per architecture
    fn load_indexes(&self) -> Result<HashMap<String, PackageSet>> {
        let Some(store) = self.store else {
            debug!("No store configured; all architectures start empty");
            return Ok(self
                .config
                .architectures
                .iter()
                .map(|arch| (arch.clone(), PackageSet::new()))
                .collect());
        };

        self.config
            .architectures
            .par_iter()
            .map(|arch| -> Result<(String, PackageSet)> {
                Ok((arch.clone(), self.load_index(store, arch)?))
            })
            .collect()
    }

    fn load_index(&self, store: &dyn ObjectStore, arch: &str) -> Result<PackageSet> {
        let key = packages_key(&self.config.channel, arch);

        let Some(data) = get_optional(store, &key)? else {
            info!("No existing index at {} on {}, starting empty", key, store.name());
            return Ok(PackageSet::new());
        };

        let text = decompress_auto(&data).map_err(|e| Error::StorageError {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        let set = PackageSet::read(text.as_slice())?;
        info!("Loaded {} entries from {}", set.len(), key);
        Ok(set)
    }

    /// Extract an archive, copy it into the pool and merge it into its set
    fn add_archive(&self, path: &Path, sets: &mut HashMap<String, PackageSet>) -> Result<()> {
        let record = self.extractor.extract_record(path)?;

        let Some(set) = sets.get_mut(&record.architecture) else {
            return Err(Error::UnsupportedArchitecture {
                architecture: record.architecture,
                path: path.display().to_string(),
                supported: self.config.architectures.join(", "),
            });
        };

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::IoError(format!("Invalid archive file name: {}", path.display())))?;
        let relative = pool_path(&record.architecture, &self.config.channel, file_name);
        let digests = copy_digested(path, &self.config.output_dir.join(&relative))?;

        let mut entry = PackageEntry::from_record(record, &self.config.licence, &self.config.vendor);
        entry.filename = relative;
        entry.sha1 = digests.sha1;
        entry.sha256 = digests.sha256;
        entry.size = i64::try_from(digests.size)
            .map_err(|_| Error::IoError(format!("Archive too large: {}", path.display())))?;

        info!(
            "Added {} {} ({}) as {}",
            entry.package, entry.version, entry.architecture, entry.filename
        );
        set.add(entry);
        Ok(())
    }

    /// Write `Packages` and `Packages.gz` for one architecture in one pass
    fn write_index(&self, arch: &str, set: &PackageSet, release: &mut ReleaseBuilder) -> Result<()> {
        let relative_dir = binary_dir(arch);
        let dir = self
            .config
            .output_dir
            .join(suite_dir(&self.config.channel))
            .join(&relative_dir);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", dir.display())))?;

        let plain_path = dir.join(PACKAGES_FILE);
        let gz_path = dir.join(PACKAGES_GZ_FILE);

        let mut tee = Tee {
            first: DigestWriter::new(create_file(&plain_path)?),
            second: gzip_encoder(DigestWriter::new(create_file(&gz_path)?)),
        };
        set.write(&mut tee)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {e}", plain_path.display())))?;

        let plain_digests = finish_file(tee.first, &plain_path)?;
        let gz_writer = tee
            .second
            .finish()
            .map_err(|e| Error::IoError(format!("Failed to compress {}: {e}", gz_path.display())))?;
        let gz_digests = finish_file(gz_writer, &gz_path)?;

        info!(
            "Wrote {} entries to {} ({} bytes, {} compressed)",
            set.len(),
            plain_path.display(),
            plain_digests.size,
            gz_digests.size
        );

        release.add_file(&format!("{relative_dir}/{PACKAGES_FILE}"), &plain_digests);
        release.add_file(&format!("{relative_dir}/{PACKAGES_GZ_FILE}"), &gz_digests);
        Ok(())
    }

    fn write_release(&self, release: ReleaseBuilder) -> Result<PathBuf> {
        let dir = self.config.output_dir.join(RELEASE_DIR);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", dir.display())))?;

        let path = dir.join("Release");
        let file_count = release.file_count();
        let descriptor = release.build(self.config.date);

        let mut temp = NamedTempFile::new_in(&dir)
            .map_err(|e| Error::IoError(format!("Failed to create temp file in {}: {e}", dir.display())))?;
        descriptor
            .write(&mut temp)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {e}", path.display())))?;
        temp.persist(&path)
            .map_err(|e| Error::IoError(format!("Failed to persist {}: {}", path.display(), e.error)))?;

        info!("Wrote {} ({} index files)", path.display(), file_count);
        Ok(path)
    }
}

/// Writes the same bytes to two writers
struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!("Removing previous output at {}", dir.display());
        fs::remove_dir_all(dir)
            .map_err(|e| Error::IoError(format!("Failed to remove {}: {e}", dir.display())))?;
    }
    fs::create_dir_all(dir)
        .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", dir.display())))
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn finish_file(writer: DigestWriter<BufWriter<File>>, path: &Path) -> Result<Digests> {
    let (mut file, digests) = writer.finish();
    file.flush()
        .map_err(|e| Error::IoError(format!("Failed to flush {}: {e}", path.display())))?;
    Ok(digests)
}

/// Copy `src` to `dest`, digesting the bytes on the way
fn copy_digested(src: &Path, dest: &Path) -> Result<Digests> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", parent.display())))?;
    }

    let mut input = File::open(src)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", src.display())))?;
    let mut output = DigestWriter::new(create_file(dest)?);
    io::copy(&mut input, &mut output).map_err(|e| {
        Error::IoError(format!("Failed to copy {} to {}: {e}", src.display(), dest.display()))
    })?;
    finish_file(output, dest)
}
