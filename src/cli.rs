// src/cli.rs
//! CLI definitions for aptpack
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aptpack")]
#[command(author = "aptpack contributors")]
#[command(version)]
#[command(about = "Build and publish APT repository indexes from .deb archives", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add .deb archives to a repository and regenerate its indexes
    Package(PackageArgs),

    /// Print the control record of a .deb archive
    Inspect {
        /// Path to the .deb archive
        deb: PathBuf,
    },

    /// Validate a Packages index and list its entries
    Show {
        /// Path to a Packages or Packages.gz file
        packages: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PackageArgs {
    /// .deb archives to add (repeatable)
    #[arg(short = 'f', long = "file", value_name = "DEB", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Release channel (suite and codename), e.g. "stable"
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Output directory; removed and recreated by the build
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Licence stamped on every new entry
    #[arg(long)]
    pub licence: Option<String>,

    /// Vendor stamped on every new entry
    #[arg(long)]
    pub vendor: Option<String>,

    /// Release description
    #[arg(long)]
    pub description: Option<String>,

    /// Release origin (default: "<vendor> APT Repository")
    #[arg(long)]
    pub origin: Option<String>,

    /// Release label (default: vendor)
    #[arg(long)]
    pub label: Option<String>,

    /// Architectures to publish, comma separated
    #[arg(long, value_delimiter = ',')]
    pub arch: Vec<String>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read the published index from this directory
    #[arg(long, value_name = "DIR", conflicts_with = "store_url")]
    pub store_dir: Option<PathBuf>,

    /// Read the published index from this base URL
    #[arg(long, value_name = "URL")]
    pub store_url: Option<String>,

    /// Release date as Unix seconds (default: $SOURCE_DATE_EPOCH, then now)
    #[arg(long, value_name = "SECONDS")]
    pub date: Option<i64>,

    /// Publish the output to the store after a successful build
    #[arg(long)]
    pub upload: bool,
}
