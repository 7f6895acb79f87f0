//! Signature file format versions.
//!
//! Each version toggles a fixed set of serialization switches. Versions are
//! totally ordered, so "at least V2" checks are plain comparisons.

use serde::{Deserialize, Serialize};

/// Prefix of the header comment declaring the format version.
pub const HEADER_PREFIX: &str = "// Signature format: ";

/// A signature file format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// Sentinel for a tag that matched no known version.
    Unknown,
    /// Legacy format: fully qualified types, no header, no default values.
    V1,
    /// Adds the header, elides `java.lang.` and emits default values.
    V2,
    /// Adds Kotlin-style nullness sigils.
    V3,
}

impl FileFormat {
    /// Format emitted when none is requested.
    pub const CURRENT: FileFormat = FileFormat::V2;

    /// All known versions in ascending order.
    pub const ALL: [FileFormat; 3] = [FileFormat::V1, FileFormat::V2, FileFormat::V3];

    /// Version tag as written in headers and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Unknown => "?",
            FileFormat::V1 => "1.0",
            FileFormat::V2 => "2.0",
            FileFormat::V3 => "3.0",
        }
    }

    /// Exact-match lookup of a version tag. Never fails; unmatched tags map to `Unknown`.
    pub fn parse(tag: &str) -> FileFormat {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == tag)
            .unwrap_or(FileFormat::Unknown)
    }

    /// Header line for this version, if the version writes one.
    pub fn header(&self) -> Option<String> {
        if self.include_header() {
            Some(format!("{}{}", HEADER_PREFIX, self.as_str()))
        } else {
            None
        }
    }

    pub fn compat_output(&self) -> bool {
        *self == FileFormat::V1
    }

    pub fn kotlin_style_nulls(&self) -> bool {
        *self >= FileFormat::V3
    }

    pub fn default_values(&self) -> bool {
        *self >= FileFormat::V2
    }

    pub fn omit_common_packages(&self) -> bool {
        *self >= FileFormat::V2
    }

    pub fn include_header(&self) -> bool {
        *self >= FileFormat::V2
    }

    /// Apply this version's switches to `options`.
    pub fn configure(&self, options: &mut SignatureOptions) {
        options.format = *self;
        options.compat_output = self.compat_output();
        options.kotlin_style_nulls = self.kotlin_style_nulls();
        options.default_values = self.default_values();
        options.omit_common_packages = self.omit_common_packages();
        options.include_header = self.include_header();
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output switches for the signature writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureOptions {
    pub format: FileFormat,
    pub compat_output: bool,
    pub kotlin_style_nulls: bool,
    pub default_values: bool,
    pub omit_common_packages: bool,
    pub include_header: bool,
}

impl SignatureOptions {
    pub fn new(format: FileFormat) -> Self {
        let mut options = Self::default();
        format.configure(&mut options);
        options
    }
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            format: FileFormat::Unknown,
            compat_output: false,
            kotlin_style_nulls: false,
            default_values: false,
            omit_common_packages: false,
            include_header: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_tags() {
        assert_eq!(FileFormat::parse("2.0"), FileFormat::V2);
        assert_eq!(FileFormat::parse("1.0"), FileFormat::V1);
        assert_eq!(FileFormat::parse("3.0"), FileFormat::V3);
        assert_eq!(FileFormat::parse("bogus"), FileFormat::Unknown);
        assert_eq!(FileFormat::parse("2"), FileFormat::Unknown);
        assert_eq!(FileFormat::parse(""), FileFormat::Unknown);
    }

    #[test]
    fn test_versions_are_ordered() {
        assert!(FileFormat::Unknown < FileFormat::V1);
        assert!(FileFormat::V1 < FileFormat::V2);
        assert!(FileFormat::V2 < FileFormat::V3);
    }

    #[test]
    fn test_configure_switches() {
        let v1 = SignatureOptions::new(FileFormat::V1);
        assert!(v1.compat_output);
        assert!(!v1.include_header);
        assert!(!v1.default_values);

        let v3 = SignatureOptions::new(FileFormat::V3);
        assert!(!v3.compat_output);
        assert!(v3.kotlin_style_nulls);
        assert!(v3.omit_common_packages);
        assert!(v3.include_header);
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut options = SignatureOptions::default();
        FileFormat::V2.configure(&mut options);
        let once = options.clone();
        FileFormat::V2.configure(&mut options);
        assert_eq!(once, options);
    }

    #[test]
    fn test_header() {
        assert_eq!(
            FileFormat::V2.header().as_deref(),
            Some("// Signature format: 2.0")
        );
        assert_eq!(FileFormat::V1.header(), None);
    }
}
