// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // -v wins over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Package(args) => commands::cmd_package(args),
        Commands::Inspect { deb } => commands::cmd_inspect(&deb),
        Commands::Show { packages } => commands::cmd_show(&packages),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "aptpack", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_package_args() {
        let cli = Cli::try_parse_from([
            "aptpack", "package", "-f", "a.deb", "-f", "b.deb", "--channel", "stable", "--out",
            "dist", "--arch", "amd64,arm64",
        ])
        .unwrap();

        match cli.command {
            Commands::Package(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.channel.as_deref(), Some("stable"));
                assert_eq!(args.arch, vec!["amd64", "arm64"]);
                assert!(!args.upload);
            }
            _ => panic!("expected package command"),
        }
    }

    #[test]
    fn test_store_flags_conflict() {
        let result = Cli::try_parse_from([
            "aptpack", "package", "-f", "a.deb", "--out", "dist", "--store-dir", "/srv",
            "--store-url", "https://apt.example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_package_requires_files() {
        assert!(Cli::try_parse_from(["aptpack", "package", "--out", "dist"]).is_err());
    }
}
