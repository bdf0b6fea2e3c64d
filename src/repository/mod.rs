// src/repository/mod.rs

//! APT repository index building
//!
//! This module provides functionality for:
//! - Reading and writing `Packages` indexes (per-architecture package sets)
//! - Rendering the `Release` descriptor with MD5/SHA-1/SHA-256 sections
//! - The published directory layout under `dists/` and `pool/`
//! - Orchestrating a build: merge new archives over the published index

mod builder;
pub mod layout;
mod packages;
mod release;

// Re-export main types and functions
pub use builder::{BuildConfig, BuildReport, RepositoryBuilder};
pub use packages::{PackageEntry, PackageKey, PackageSet};
pub use release::{ChecksumRecord, ReleaseBuilder, ReleaseDescriptor, format_date};
