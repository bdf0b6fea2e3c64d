// src/repository/packages.rs

//! Per-architecture package sets and the `Packages` index format
//!
//! A [`PackageSet`] holds at most one entry per (name, version). Adding an
//! entry with an existing key replaces the old one outright, which is how new
//! uploads are merged over a previously published index.

use crate::control::{FIELD_SEPARATOR, MetadataRecord, numbered_lines, split_field};
use crate::error::{Error, FormatError, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// One package as listed in a `Packages` index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageEntry {
    pub package: String,
    pub version: String,
    pub licence: String,
    pub vendor: String,
    pub architecture: String,
    pub maintainer: String,
    pub installed_size: String,
    pub depends: String,
    pub priority: String,
    pub homepage: String,
    pub description: String,
    /// Repository-relative path of the archive (`pool/...`)
    pub filename: String,
    pub sha1: String,
    pub sha256: String,
    /// Archive size in bytes
    pub size: i64,
}

impl PackageEntry {
    /// Build an entry from extracted control metadata
    ///
    /// Hashes, size and filename start empty; the caller fills them in once
    /// the archive has been stored.
    pub fn from_record(record: MetadataRecord, licence: &str, vendor: &str) -> Self {
        Self {
            package: record.package,
            version: record.version,
            licence: licence.to_string(),
            vendor: vendor.to_string(),
            architecture: record.architecture,
            maintainer: record.maintainer,
            installed_size: record.installed_size,
            depends: record.depends,
            priority: record.priority,
            homepage: record.homepage,
            description: record.description,
            ..Default::default()
        }
    }

    /// Identity of this entry within a set
    pub fn key(&self) -> PackageKey {
        PackageKey {
            package: self.package.clone(),
            version: self.version.clone(),
        }
    }

    /// Write this entry as one `Packages` stanza, blank line included
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        let mut field = |name: &str, value: &str| writeln!(w, "{name}{FIELD_SEPARATOR}{value}");

        field("Package", &self.package)?;
        field("Version", &self.version)?;
        field("Licence", &self.licence)?;
        field("Vendor", &self.vendor)?;
        field("Architecture", &self.architecture)?;
        field("Maintainer", &self.maintainer)?;
        field("Installed-Size", &self.installed_size)?;
        if !self.depends.is_empty() {
            field("Depends", &self.depends)?;
        }
        field("Priority", &self.priority)?;
        field("Homepage", &self.homepage)?;
        field("Description", &self.description)?;
        field("Filename", &self.filename)?;
        field("SHA1", &self.sha1)?;
        field("SHA256", &self.sha256)?;
        field("Size", &self.size.to_string())?;
        writeln!(w)
    }

    /// Apply one parsed `Field: value` pair, ignoring unknown fields
    fn set_field(&mut self, name: &str, value: &str, line: usize) -> Result<()> {
        let slot = match name {
            "Package" => &mut self.package,
            "Version" => &mut self.version,
            "Licence" => &mut self.licence,
            "Vendor" => &mut self.vendor,
            "Architecture" => &mut self.architecture,
            "Maintainer" => &mut self.maintainer,
            "Installed-Size" => &mut self.installed_size,
            "Depends" => &mut self.depends,
            "Priority" => &mut self.priority,
            "Homepage" => &mut self.homepage,
            "Description" => &mut self.description,
            "Filename" => &mut self.filename,
            "SHA1" => &mut self.sha1,
            "SHA256" => &mut self.sha256,
            "Size" => {
                self.size = value.parse().map_err(|source| FormatError::InvalidSize {
                    line,
                    value: value.to_string(),
                    source,
                })?;
                return Ok(());
            }
            _ => return Ok(()),
        };
        *slot = value.to_string();
        Ok(())
    }
}

/// Identity of a package within one architecture
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub package: String,
    pub version: String,
}

/// Deduplicated packages of a single architecture
///
/// Entries are kept ordered by (name, version) using byte-wise string
/// comparison. Since that pair is unique, this is also the
/// (name, version, architecture) order the index is written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    packages: BTreeMap<PackageKey, PackageEntry>,
}

impl PackageSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any entry with the same name and version
    pub fn add(&mut self, entry: PackageEntry) {
        self.packages.insert(entry.key(), entry);
    }

    /// Look up an entry by name and version
    pub fn get(&self, package: &str, version: &str) -> Option<&PackageEntry> {
        self.packages.get(&PackageKey {
            package: package.to_string(),
            version: version.to_string(),
        })
    }

    /// Iterate entries in index order
    pub fn iter(&self) -> impl Iterator<Item = &PackageEntry> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Serialize the set in `Packages` index format
    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for entry in self.iter() {
            entry.write_to(w)?;
        }
        Ok(())
    }

    /// Serialize the set into a byte vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write(&mut buffer);
        buffer
    }

    /// Parse a `Packages` index
    ///
    /// A blank line closes the stanza being read. A final stanza that is not
    /// followed by a blank line is dropped: [`PackageSet::write`] terminates
    /// every stanza, so such a tail is an incomplete write, not an entry.
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut set = Self::new();
        let mut pending: Option<PackageEntry> = None;

        for line in numbered_lines(reader) {
            let (number, line) = line?;

            if line.is_empty() {
                if let Some(entry) = pending.take() {
                    set.add(entry);
                }
                continue;
            }

            let (name, value) = split_field(&line).ok_or_else(|| {
                Error::from(FormatError::MissingSeparator {
                    line: number,
                    content: line.clone(),
                })
            })?;

            pending
                .get_or_insert_with(PackageEntry::default)
                .set_field(name, value, number)?;
        }

        Ok(set)
    }
}

impl Extend<PackageEntry> for PackageSet {
    fn extend<T: IntoIterator<Item = PackageEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl FromIterator<PackageEntry> for PackageSet {
    fn from_iter<T: IntoIterator<Item = PackageEntry>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
