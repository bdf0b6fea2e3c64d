// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: debug logging
fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable debug logging")
}

fn build_cli() -> Command {
    Command::new("aptpack")
        .version(env!("CARGO_PKG_VERSION"))
        .author("aptpack contributors")
        .about("Build and publish APT repository indexes from .deb archives")
        .arg(verbose_arg())
        .subcommand_required(true)
        .subcommand(
            Command::new("package")
                .about("Add .deb archives to a repository and regenerate its indexes")
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .value_name("DEB")
                        .required(true)
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .help(".deb archives to add (repeatable)"),
                )
                .arg(Arg::new("channel").short('c').long("channel").help("Release channel, e.g. \"stable\""))
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("DIR")
                        .required(true)
                        .help("Output directory; removed and recreated by the build"),
                )
                .arg(Arg::new("licence").long("licence").help("Licence stamped on every new entry"))
                .arg(Arg::new("vendor").long("vendor").help("Vendor stamped on every new entry"))
                .arg(Arg::new("description").long("description").help("Release description"))
                .arg(Arg::new("origin").long("origin").help("Release origin"))
                .arg(Arg::new("label").long("label").help("Release label"))
                .arg(
                    Arg::new("arch")
                        .long("arch")
                        .value_delimiter(',')
                        .help("Architectures to publish, comma separated"),
                )
                .arg(Arg::new("config").long("config").value_name("PATH").help("TOML configuration file"))
                .arg(
                    Arg::new("store_dir")
                        .long("store-dir")
                        .value_name("DIR")
                        .help("Read the published index from this directory"),
                )
                .arg(
                    Arg::new("store_url")
                        .long("store-url")
                        .value_name("URL")
                        .help("Read the published index from this base URL"),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .value_name("SECONDS")
                        .help("Release date as Unix seconds (default: $SOURCE_DATE_EPOCH, then now)"),
                )
                .arg(
                    Arg::new("upload")
                        .long("upload")
                        .action(ArgAction::SetTrue)
                        .help("Publish the output to the store after a successful build"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the control record of a .deb archive")
                .arg(Arg::new("deb").required(true).help("Path to the .deb archive")),
        )
        .subcommand(
            Command::new("show")
                .about("Validate a Packages index and list its entries")
                .arg(Arg::new("packages").required(true).help("Path to a Packages or Packages.gz file")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell to generate completions for"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("aptpack.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
