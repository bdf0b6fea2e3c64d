// src/commands/inspect.rs

//! Read-only inspection commands

use anyhow::{Context, Result};
use aptpack::compression::decompress_auto;
use aptpack::packages::{DebExtractor, MetadataExtractor};
use aptpack::repository::PackageSet;
use std::path::Path;
use tracing::debug;

/// Print the control record of a .deb archive
pub fn cmd_inspect(deb: &Path) -> Result<()> {
    let record = DebExtractor::new()
        .extract_record(deb)
        .with_context(|| format!("Failed to inspect {}", deb.display()))?;

    print!("{record}");
    Ok(())
}

/// Parse a Packages index (plain or compressed) and list its entries
pub fn cmd_show(packages: &Path) -> Result<()> {
    let data = std::fs::read(packages)
        .with_context(|| format!("Failed to read {}", packages.display()))?;
    let text = decompress_auto(&data)
        .with_context(|| format!("Failed to decompress {}", packages.display()))?;
    debug!("{} is {} bytes uncompressed", packages.display(), text.len());

    let set = PackageSet::read(text.as_slice())
        .with_context(|| format!("Invalid index {}", packages.display()))?;

    if set.is_empty() {
        println!("No packages in {}", packages.display());
        return Ok(());
    }

    for entry in set.iter() {
        println!("{} {} {}", entry.package, entry.version, entry.architecture);
    }
    println!("\n{} packages", set.len());
    Ok(())
}
