// src/hash.rs

//! Checksums for package archives and index files
//!
//! APT repositories describe every artifact with several digests at once:
//! - **MD5**: `MD5Sum` section of the Release file
//! - **SHA-1**: `SHA1` field of Packages entries and Release section
//! - **SHA-256**: `SHA256` field of Packages entries and Release section
//!
//! [`MultiHasher`] feeds all three accumulators from a single pass over the
//! data, and [`DigestWriter`] does the same while the bytes are being written.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::{self, Write};

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// MD5 (128-bit, legacy)
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
    /// SHA-256 (256-bit)
    Sha256,
}

impl HashAlgorithm {
    /// All algorithms, in the order their sections appear in a Release file
    pub const ALL: [HashAlgorithm; 3] = [Self::Md5, Self::Sha1, Self::Sha256];

    /// Name of the Release file section holding this digest
    #[inline]
    pub const fn release_field(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5Sum",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }
}

/// Hex digests of one byte stream under every supported algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digests {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    /// Number of bytes digested
    pub size: u64,
}

impl Digests {
    /// Get the hex digest for one algorithm
    pub fn get(&self, algorithm: HashAlgorithm) -> &str {
        match algorithm {
            HashAlgorithm::Md5 => &self.md5,
            HashAlgorithm::Sha1 => &self.sha1,
            HashAlgorithm::Sha256 => &self.sha256,
        }
    }
}

/// Accumulates MD5, SHA-1 and SHA-256 over the same input
#[derive(Clone, Default)]
pub struct MultiHasher {
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
    size: u64,
}

impl MultiHasher {
    /// Create a new hasher
    pub fn new() -> Self {
        Self::default()
    }

    /// Update every accumulator with more data
    pub fn update(&mut self, data: &[u8]) {
        self.md5.update(data);
        self.sha1.update(data);
        self.sha256.update(data);
        self.size += data.len() as u64;
    }

    /// Finalize and return all digests
    pub fn finalize(self) -> Digests {
        Digests {
            md5: format!("{:x}", self.md5.finalize()),
            sha1: format!("{:x}", self.sha1.finalize()),
            sha256: format!("{:x}", self.sha256.finalize()),
            size: self.size,
        }
    }
}

impl Write for MultiHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer adapter that digests every byte it forwards to the inner writer
pub struct DigestWriter<W: Write> {
    inner: W,
    hasher: MultiHasher,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: MultiHasher::new(),
        }
    }

    /// Return the inner writer and the digests of everything written
    pub fn finish(self) -> (W, Digests) {
        (self.inner, self.hasher.finalize())
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Compute all digests of a byte slice
pub fn hash_bytes(data: &[u8]) -> Digests {
    let mut hasher = MultiHasher::new();
    hasher.update(data);
    hasher.finalize()
}
