// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use aptpack::BuildConfig;
use chrono::{TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Release date used by every fixture build
pub const FIXED_DATE: &str = "Tue, 05 Mar 2024 14:07:09 UTC";

/// Control file for a synthetic package
pub fn control(name: &str, version: &str, arch: &str) -> String {
    format!(
        "Package: {name}\n\
         Version: {version}\n\
         Section: utils\n\
         Priority: optional\n\
         Architecture: {arch}\n\
         Maintainer: Common Fate <hello@commonfate.io>\n\
         Installed-Size: 10240\n\
         Depends: libc6 (>= 2.34)\n\
         Homepage: https://granted.dev\n\
         Description: {name} command line tool\n"
    )
}

/// Write a minimal `.deb` (ar with debian-binary, control.tar.gz, data.tar.gz)
///
/// Returns the path `<dir>/<name>_<version>_<arch>.deb`.
pub fn write_deb(dir: &Path, name: &str, version: &str, arch: &str) -> PathBuf {
    let path = dir.join(format!("{name}_{version}_{arch}.deb"));
    let control = control(name, version, arch);

    let control_tar = gzip(&tarball("./control", control.as_bytes()));
    let data_tar = gzip(&tarball(
        &format!("./usr/bin/{name}"),
        format!("#!/bin/sh\necho {name} {version}\n").as_bytes(),
    ));

    let file = File::create(&path).unwrap();
    let mut archive = ar::Builder::new(file);
    for (member, data) in [
        ("debian-binary", b"2.0\n".to_vec()),
        ("control.tar.gz", control_tar),
        ("data.tar.gz", data_tar),
    ] {
        archive
            .append(&ar::Header::new(member.as_bytes().to_vec(), data.len() as u64), &data[..])
            .unwrap();
    }

    path
}

fn tarball(path: &str, content: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();
    builder.append_data(&mut header, path, content).unwrap();
    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Build configuration with fixed vendor, licence and date
pub fn build_config(out: &Path, channel: &str) -> BuildConfig {
    let mut config = BuildConfig::new(channel, out);
    config.licence = "MIT".to_string();
    config.vendor = "Common Fate".to_string();
    config.description = "Granted packages".to_string();
    config.date = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
    config
}
