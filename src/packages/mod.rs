// src/packages/mod.rs

//! Package archive support
//!
//! Archives are only opened to read their control record. Each format
//! implements the `MetadataExtractor` trait; `.deb` is the only one an APT
//! repository carries.

pub mod deb;
pub mod traits;

pub use deb::DebExtractor;
pub use traits::MetadataExtractor;
