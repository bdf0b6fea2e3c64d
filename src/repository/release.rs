// src/repository/release.rs

//! `Release` file generation
//!
//! The Release file describes a repository snapshot and lists a checksum line
//! for every index file under the suite directory. Checksums are listed in the
//! order they were recorded; nothing here validates them.

use crate::hash::{Digests, HashAlgorithm};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;

/// Release format version
pub const RELEASE_VERSION: &str = "1.0";

/// The single component every repository publishes
pub const COMPONENT: &str = "main";

/// RFC 1123 date format used by the `Date:` field
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// One checksum line in a Release section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord {
    /// Hex digest
    pub sum: String,
    /// File size in bytes
    pub size: u64,
    /// Path relative to the suite directory
    pub path: String,
}

impl fmt::Display for ChecksumRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {} {} {}", self.sum, self.size, self.path)
    }
}

/// Contents of a Release file
#[derive(Debug, Clone)]
pub struct ReleaseDescriptor {
    pub origin: String,
    pub label: String,
    pub suite: String,
    pub codename: String,
    pub version: String,
    pub architectures: Vec<String>,
    pub components: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub md5sums: Vec<ChecksumRecord>,
    pub sha1sums: Vec<ChecksumRecord>,
    pub sha256sums: Vec<ChecksumRecord>,
}

impl ReleaseDescriptor {
    /// Checksum lines recorded for one algorithm
    pub fn checksums(&self, algorithm: HashAlgorithm) -> &[ChecksumRecord] {
        match algorithm {
            HashAlgorithm::Md5 => &self.md5sums,
            HashAlgorithm::Sha1 => &self.sha1sums,
            HashAlgorithm::Sha256 => &self.sha256sums,
        }
    }

    /// Write the Release file
    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "Origin: {}", self.origin)?;
        writeln!(w, "Label: {}", self.label)?;
        writeln!(w, "Suite: {}", self.suite)?;
        writeln!(w, "Codename: {}", self.codename)?;
        writeln!(w, "Version: {}", self.version)?;
        writeln!(w, "Architectures: {}", self.architectures.join(" "))?;
        writeln!(w, "Components: {}", self.components)?;
        writeln!(w, "Description: {}", self.description)?;
        writeln!(w, "Date: {}", format_date(&self.date))?;

        for algorithm in HashAlgorithm::ALL {
            writeln!(w, "{}:", algorithm.release_field())?;
            for record in self.checksums(algorithm) {
                writeln!(w, "{record}")?;
            }
        }

        Ok(())
    }

    /// Render the Release file to a string
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Format a timestamp for the `Date:` field
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Accumulates checksums during a build and produces the Release descriptor
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    origin: String,
    label: String,
    suite: String,
    architectures: Vec<String>,
    description: String,
    md5sums: Vec<ChecksumRecord>,
    sha1sums: Vec<ChecksumRecord>,
    sha256sums: Vec<ChecksumRecord>,
}

impl ReleaseBuilder {
    /// Start a Release for the given suite (channel)
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            origin: String::new(),
            label: String::new(),
            suite: suite.into(),
            architectures: Vec::new(),
            description: String::new(),
            md5sums: Vec::new(),
            sha1sums: Vec::new(),
            sha256sums: Vec::new(),
        }
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn architectures<I, S>(mut self, architectures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.architectures = architectures.into_iter().map(Into::into).collect();
        self
    }

    /// Append one checksum line to an algorithm's section
    pub fn add_checksum(
        &mut self,
        algorithm: HashAlgorithm,
        sum: impl Into<String>,
        size: u64,
        path: impl Into<String>,
    ) {
        let record = ChecksumRecord {
            sum: sum.into(),
            size,
            path: path.into(),
        };
        match algorithm {
            HashAlgorithm::Md5 => self.md5sums.push(record),
            HashAlgorithm::Sha1 => self.sha1sums.push(record),
            HashAlgorithm::Sha256 => self.sha256sums.push(record),
        }
    }

    /// Append a line to every section for a file digested with [`crate::hash::MultiHasher`]
    pub fn add_file(&mut self, path: &str, digests: &Digests) {
        for algorithm in HashAlgorithm::ALL {
            self.add_checksum(algorithm, digests.get(algorithm), digests.size, path);
        }
    }

    /// Number of files recorded so far
    pub fn file_count(&self) -> usize {
        self.sha256sums.len()
    }

    /// Produce the descriptor stamped with the given generation time
    pub fn build(self, date: DateTime<Utc>) -> ReleaseDescriptor {
        ReleaseDescriptor {
            origin: self.origin,
            label: self.label,
            codename: self.suite.clone(),
            suite: self.suite,
            version: RELEASE_VERSION.to_string(),
            architectures: self.architectures,
            components: COMPONENT.to_string(),
            description: self.description,
            date,
            md5sums: self.md5sums,
            sha1sums: self.sha1sums,
            sha256sums: self.sha256sums,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_bytes;
    use chrono::TimeZone;

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&fixed_date()), "Tue, 05 Mar 2024 14:07:09 UTC");
    }

    #[test]
    fn test_render_release() {
        let mut builder = ReleaseBuilder::new("stable")
            .origin("Common Fate APT Repository")
            .label("Common Fate")
            .description("Granted packages")
            .architectures(["amd64", "arm64"]);

        builder.add_checksum(HashAlgorithm::Md5, "aa", 10, "main/binary-amd64/Packages");
        builder.add_checksum(HashAlgorithm::Sha1, "bb", 10, "main/binary-amd64/Packages");
        builder.add_checksum(HashAlgorithm::Sha256, "cc", 10, "main/binary-amd64/Packages");

        let expected = "\
Origin: Common Fate APT Repository
Label: Common Fate
Suite: stable
Codename: stable
Version: 1.0
Architectures: amd64 arm64
Components: main
Description: Granted packages
Date: Tue, 05 Mar 2024 14:07:09 UTC
MD5Sum:
 aa 10 main/binary-amd64/Packages
SHA1:
 bb 10 main/binary-amd64/Packages
SHA256:
 cc 10 main/binary-amd64/Packages
";
        assert_eq!(builder.build(fixed_date()).render(), expected);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut builder = ReleaseBuilder::new("beta");
        builder.add_checksum(HashAlgorithm::Sha256, "ff", 2, "z/Packages");
        builder.add_checksum(HashAlgorithm::Sha256, "00", 1, "a/Packages");

        let release = builder.build(fixed_date());
        let paths: Vec<&str> = release
            .checksums(HashAlgorithm::Sha256)
            .iter()
            .map(|r| r.path.as_str())
            .collect();
        assert_eq!(paths, vec!["z/Packages", "a/Packages"]);

        let text = release.render();
        assert!(text.ends_with("SHA256:\n ff 2 z/Packages\n 00 1 a/Packages\n"));
    }

    #[test]
    fn test_add_file_uses_reference_digests() {
        let payload = b"Hello, World!";
        let mut builder = ReleaseBuilder::new("stable");
        builder.add_file("main/binary-i386/Packages", &hash_bytes(payload));

        let text = builder.build(fixed_date()).render();
        assert!(text.contains(" 65a8e27d8879283831b664bd8b7f0ad4 13 main/binary-i386/Packages\n"));
        assert!(text.contains(" 0a0a9f2a6772942557ab5355d76af442f8f65e01 13 main/binary-i386/Packages\n"));
        assert!(text.contains(
            " dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f 13 main/binary-i386/Packages\n"
        ));
    }

    #[test]
    fn test_empty_sections_still_have_headers() {
        let text = ReleaseBuilder::new("stable").build(fixed_date()).render();
        assert!(text.contains("MD5Sum:\nSHA1:\nSHA256:\n"));
    }
}
