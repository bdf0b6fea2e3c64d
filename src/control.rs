// src/control.rs

//! Debian control record parsing
//!
//! A control record is a block of `Field: value` lines as found in the
//! `control` member of a `.deb` archive. Only the fields that end up in a
//! repository index are kept; anything else is ignored so newer `dpkg-deb`
//! output keeps parsing.

use crate::error::{Error, FormatError, Result};
use std::fmt;
use std::io::BufRead;

/// Separator between a field name and its value
pub const FIELD_SEPARATOR: &str = ": ";

/// Split a `Field: value` line into its name and value
///
/// Only the first separator counts, so values may themselves contain `": "`.
pub fn split_field(line: &str) -> Option<(&str, &str)> {
    line.split_once(FIELD_SEPARATOR)
}

/// Iterate the lines of a reader with 1-based line numbers
///
/// Trailing `\r` is dropped so CRLF input parses like LF input. Bytes that are
/// not valid UTF-8 are replaced rather than rejected, so legacy Latin-1
/// maintainer names still parse.
pub(crate) fn numbered_lines<R: BufRead>(
    mut reader: R,
) -> impl Iterator<Item = Result<(usize, String)>> {
    let mut number = 0;
    let mut buffer = Vec::new();

    std::iter::from_fn(move || {
        buffer.clear();
        number += 1;
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => None,
            Ok(_) => {
                if buffer.last() == Some(&b'\n') {
                    buffer.pop();
                }
                if buffer.last() == Some(&b'\r') {
                    buffer.pop();
                }
                Some(Ok((number, String::from_utf8_lossy(&buffer).into_owned())))
            }
            Err(e) => Some(Err(Error::IoError(format!("Failed to read line {number}: {e}")))),
        }
    })
}

/// Identifying metadata of one binary package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub package: String,
    pub version: String,
    pub section: String,
    pub priority: String,
    pub architecture: String,
    pub maintainer: String,
    pub installed_size: String,
    pub depends: String,
    pub homepage: String,
    pub description: String,
}

impl MetadataRecord {
    /// Parse a control record from a reader
    ///
    /// Every non-blank line must contain the `": "` separator. Recognized fields
    /// that never appear stay empty, and a repeated field keeps its last value.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut record = Self::default();

        for line in numbered_lines(reader) {
            let (number, line) = line?;
            if line.is_empty() {
                continue;
            }

            let (name, value) = split_field(&line).ok_or_else(|| FormatError::MissingSeparator {
                line: number,
                content: line.clone(),
            })?;

            record.set_field(name, value);
        }

        Ok(record)
    }

    /// Parse a control record held in a string
    pub fn parse_str(content: &str) -> Result<Self> {
        Self::parse(content.as_bytes())
    }

    fn set_field(&mut self, name: &str, value: &str) {
        let slot = match name {
            "Package" => &mut self.package,
            "Version" => &mut self.version,
            "Section" => &mut self.section,
            "Priority" => &mut self.priority,
            "Architecture" => &mut self.architecture,
            "Maintainer" => &mut self.maintainer,
            "Installed-Size" => &mut self.installed_size,
            "Depends" => &mut self.depends,
            "Homepage" => &mut self.homepage,
            "Description" => &mut self.description,
            _ => return,
        };
        *slot = value.to_string();
    }
}

impl fmt::Display for MetadataRecord {
    /// Render the non-empty fields back into control-file form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("Package", &self.package),
            ("Version", &self.version),
            ("Section", &self.section),
            ("Priority", &self.priority),
            ("Architecture", &self.architecture),
            ("Maintainer", &self.maintainer),
            ("Installed-Size", &self.installed_size),
            ("Depends", &self.depends),
            ("Homepage", &self.homepage),
            ("Description", &self.description),
        ];

        for (name, value) in fields {
            if !value.is_empty() {
                writeln!(f, "{name}{FIELD_SEPARATOR}{value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROL: &str = "\
Package: granted
Version: 0.20.3
Section: utils
Priority: optional
Architecture: amd64
Maintainer: Common Fate <hello@commonfate.io>
Installed-Size: 10240
Homepage: https://granted.dev
Description: Cloud access tool
";

    #[test]
    fn test_parse_non_utf8_value() {
        let record = MetadataRecord::parse(&b"Package: a\nMaintainer: Jos\xe9 <j@x>\nVersion: 1\n"[..])
            .unwrap();
        assert_eq!(record.package, "a");
        assert_eq!(record.maintainer, "Jos\u{fffd} <j@x>");
        assert_eq!(record.version, "1");
    }

    #[test]
    fn test_parse_crlf_and_missing_final_newline() {
        let record = MetadataRecord::parse_str("Package: a\r\nVersion: 1").unwrap();
        assert_eq!(record.package, "a");
        assert_eq!(record.version, "1");
    }

    #[test]
    fn test_parse_control() {
        let record = MetadataRecord::parse_str(CONTROL).unwrap();

        assert_eq!(record.package, "granted");
        assert_eq!(record.version, "0.20.3");
        assert_eq!(record.section, "utils");
        assert_eq!(record.priority, "optional");
        assert_eq!(record.architecture, "amd64");
        assert_eq!(record.maintainer, "Common Fate <hello@commonfate.io>");
        assert_eq!(record.installed_size, "10240");
        assert_eq!(record.homepage, "https://granted.dev");
        assert_eq!(record.description, "Cloud access tool");
        assert_eq!(record.depends, "");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record = MetadataRecord::parse_str("Package: tiny\n").unwrap();
        assert_eq!(record.package, "tiny");
        assert!(record.version.is_empty());
        assert!(record.architecture.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let record =
            MetadataRecord::parse_str("Package: foo\nX-Custom: bar\nBuilt-Using: baz\n").unwrap();
        assert_eq!(record, MetadataRecord {
            package: "foo".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn test_duplicate_field_last_wins() {
        let record = MetadataRecord::parse_str("Version: 1.0\nVersion: 2.0\n").unwrap();
        assert_eq!(record.version, "2.0");
    }

    #[test]
    fn test_missing_separator() {
        let err = MetadataRecord::parse_str("Package: foo\nnot a field\n").unwrap_err();
        match err {
            Error::FormatError(FormatError::MissingSeparator { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "not a field");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_colon_without_space_is_rejected() {
        assert!(MetadataRecord::parse_str("Package:foo\n").is_err());
    }

    #[test]
    fn test_value_may_contain_separator() {
        let record = MetadataRecord::parse_str("Description: tool: does things\n").unwrap();
        assert_eq!(record.description, "tool: does things");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let record = MetadataRecord::parse_str("Package: foo\r\n\r\nVersion: 1\r\n").unwrap();
        assert_eq!(record.package, "foo");
        assert_eq!(record.version, "1");
    }

    #[test]
    fn test_display_round_trip() {
        let record = MetadataRecord::parse_str(CONTROL).unwrap();
        let rendered = record.to_string();
        assert_eq!(MetadataRecord::parse_str(&rendered).unwrap(), record);
    }
}
