// src/repository/layout.rs

//! Published repository layout
//!
//! ```text
//! dists/<channel>/main/binary-<arch>/Packages
//! dists/<channel>/main/binary-<arch>/Packages.gz
//! dists/stable/Release
//! pool/<arch>/<channel>/<file name>
//! ```
//!
//! All paths are `/`-separated keys, usable both as object-store keys and
//! as paths relative to the output directory.

use super::release::COMPONENT;

/// Directory holding the Release file
pub const RELEASE_DIR: &str = "dists/stable";

/// Name of the plain index file
pub const PACKAGES_FILE: &str = "Packages";

/// Name of the gzip-compressed index file
pub const PACKAGES_GZ_FILE: &str = "Packages.gz";

/// Index directory of one architecture, relative to the suite directory
pub fn binary_dir(architecture: &str) -> String {
    format!("{COMPONENT}/binary-{architecture}")
}

/// Suite directory of a channel
pub fn suite_dir(channel: &str) -> String {
    format!("dists/{channel}")
}

/// Key of an architecture's plain `Packages` index
pub fn packages_key(channel: &str, architecture: &str) -> String {
    format!("{}/{}/{PACKAGES_FILE}", suite_dir(channel), binary_dir(architecture))
}

/// Key of the Release file
pub fn release_key() -> String {
    format!("{RELEASE_DIR}/Release")
}

/// Repository-relative path an archive is published under
pub fn pool_path(architecture: &str, channel: &str, file_name: &str) -> String {
    format!("pool/{architecture}/{channel}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packages_key() {
        assert_eq!(
            packages_key("stable", "amd64"),
            "dists/stable/main/binary-amd64/Packages"
        );
        assert_eq!(packages_key("beta", "i386"), "dists/beta/main/binary-i386/Packages");
    }

    #[test]
    fn test_pool_path() {
        assert_eq!(
            pool_path("arm64", "stable", "granted_0.20.3_arm64.deb"),
            "pool/arm64/stable/granted_0.20.3_arm64.deb"
        );
    }

    #[test]
    fn test_release_key() {
        assert_eq!(release_key(), "dists/stable/Release");
        assert_eq!(binary_dir("amd64"), "main/binary-amd64");
    }
}
