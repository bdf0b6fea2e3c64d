// src/commands/package.rs

//! The `package` command: build, and optionally publish, a repository

use crate::cli::PackageArgs;
use anyhow::{Context, Result, anyhow};
use aptpack::config::{Config, StorageSection, validate_architectures, validate_channel};
use aptpack::repository::{BuildConfig, RepositoryBuilder, layout};
use aptpack::storage::{HttpStore, LocalStore, ObjectStore, publish_dir};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Environment variable fixing the Release date for reproducible builds
const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

pub fn cmd_package(args: PackageArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let repo = file_config.repository;

    let channel = args
        .channel
        .or(repo.channel)
        .ok_or_else(|| anyhow!("--channel is required (or set repository.channel in the config file)"))?;
    validate_channel(&channel)?;

    let mut config = BuildConfig::new(channel, &args.out);
    config.licence = args.licence.unwrap_or(repo.licence);
    config.vendor = args.vendor.unwrap_or(repo.vendor);
    config.description = args.description.unwrap_or(repo.description);
    config.origin = args.origin.or(repo.origin);
    config.label = args.label.or(repo.label);
    config.architectures = if args.arch.is_empty() {
        repo.architectures
    } else {
        args.arch
    };
    validate_architectures(&config.architectures)?;
    config.date = release_date(args.date)?;

    if config.vendor.is_empty() {
        warn!("No vendor set; entries will carry an empty Vendor field");
    }

    let store = open_store(
        args.store_dir.as_deref(),
        args.store_url.as_deref(),
        &file_config.storage,
    )?;
    if args.upload && store.is_none() {
        return Err(anyhow!("--upload requires --store-dir, --store-url or a [storage] backend"));
    }

    let mut builder = RepositoryBuilder::new(config);
    if let Some(store) = store.as_deref() {
        builder = builder.with_store(store);
    }

    let report = builder
        .build(&args.files)
        .context("Repository build failed; no Release file was written")?;

    println!("Added {} archive(s) to channel '{}'", report.added, builder.config().channel);
    for (arch, count) in &report.packages {
        println!("  {arch}: {count} package(s)");
    }
    println!("Release: {}", report.release_path.display());

    if args.upload
        && let Some(store) = store.as_deref()
    {
        let release_key = layout::release_key();
        let uploaded = publish_dir(store, &args.out, &[release_key.as_str()])
            .with_context(|| format!("Failed to publish {}", args.out.display()))?;
        info!("Published {} files to {}", uploaded, store.name());
        println!("Uploaded {uploaded} file(s) to {}", store.name());
    }

    Ok(())
}

/// CLI store flags win over the `[storage]` section
fn open_store(
    store_dir: Option<&std::path::Path>,
    store_url: Option<&str>,
    section: &StorageSection,
) -> Result<Option<Box<dyn ObjectStore>>> {
    if let Some(dir) = store_dir {
        return Ok(Some(Box::new(LocalStore::new(dir))));
    }
    if let Some(url) = store_url {
        return Ok(Some(Box::new(HttpStore::new(url)?)));
    }
    Ok(section.open()?)
}

/// `--date`, then `$SOURCE_DATE_EPOCH`, then the current time
fn release_date(flag: Option<i64>) -> Result<DateTime<Utc>> {
    let seconds = match flag {
        Some(seconds) => Some(seconds),
        None => match std::env::var(SOURCE_DATE_EPOCH) {
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("Invalid {SOURCE_DATE_EPOCH} '{value}'"))?,
            ),
            Err(_) => None,
        },
    };

    match seconds {
        Some(seconds) => DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| anyhow!("Release date {seconds} is out of range")),
        None => Ok(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_date_from_flag() {
        let date = release_date(Some(1_709_647_629)).unwrap();
        assert_eq!(
            aptpack::repository::format_date(&date),
            "Tue, 05 Mar 2024 14:07:09 UTC"
        );
    }

    #[test]
    fn test_release_date_out_of_range() {
        assert!(release_date(Some(i64::MAX)).is_err());
    }

    #[test]
    fn test_cli_store_flags_override_config() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(Some(temp.path()), None, &StorageSection::default())
            .unwrap()
            .unwrap();
        assert_eq!(store.name(), "local");

        assert!(open_store(None, None, &StorageSection::default()).unwrap().is_none());
    }
}
