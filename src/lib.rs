// src/lib.rs

//! aptpack: APT repository index builder
//!
//! Adds `.deb` archives to an APT repository and regenerates its indexes.
//!
//! # Architecture
//!
//! - Control records: `Field: value` metadata read natively from `.deb` archives
//! - Package sets: one `Packages` index per architecture, merged over the
//!   previously published one
//! - Release: MD5/SHA-1/SHA-256 checksums of every generated index
//! - Storage: where the published index is read from and uploaded to
//!
//! Output layout:
//!
//! ```text
//! dists/<channel>/main/binary-<arch>/Packages
//! dists/<channel>/main/binary-<arch>/Packages.gz
//! dists/stable/Release
//! pool/<arch>/<channel>/<file name>
//! ```

pub mod compression;
pub mod config;
pub mod control;
mod error;
pub mod hash;
pub mod packages;
pub mod repository;
pub mod storage;

pub use control::MetadataRecord;
pub use error::{Error, FormatError, Result};
pub use repository::{BuildConfig, BuildReport, PackageEntry, PackageSet, RepositoryBuilder};
