//! Baseline files: known diagnostics that should not be reported again.
//!
//! One entry per line, `Name: location: message`. Blank lines and `//`
//! comments are ignored. The location is the qualified name of the item
//! the diagnostic is about, e.g. `test.pkg.Foo.bar`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SignatureError};

/// One suppressed diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaselineEntry {
    pub issue: String,
    pub location: String,
    pub message: String,
}

impl BaselineEntry {
    fn parse(line: &str) -> Option<Self> {
        let (issue, rest) = line.split_once(": ")?;
        let (location, message) = rest.split_once(": ")?;
        if issue.is_empty() || issue.contains(char::is_whitespace) {
            return None;
        }
        Some(Self {
            issue: issue.to_string(),
            location: location.to_string(),
            message: message.to_string(),
        })
    }
}

impl fmt::Display for BaselineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.issue, self.location, self.message)
    }
}

/// A loaded baseline, counting how often each entry matched.
#[derive(Clone, Debug, Default)]
pub struct Baseline {
    description: String,
    entries: HashMap<BaselineEntry, usize>,
}

impl Baseline {
    /// Parse baseline text. `file` only labels errors.
    pub fn parse(text: &str, file: Option<&str>) -> Result<Self> {
        let mut entries = HashMap::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let entry = BaselineEntry::parse(line).ok_or_else(|| {
                SignatureError::parse(
                    file,
                    index as u32 + 1,
                    format!("Expected `Name: location: message`, found `{}`", line),
                )
            })?;
            entries.insert(entry, 0);
        }
        debug!(entries = entries.len(), "loaded baseline");
        Ok(Self {
            description: file.unwrap_or("baseline").to_string(),
            entries,
        })
    }

    /// Read and parse a baseline file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, Some(&path.display().to_string()))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the diagnostic is in the baseline. Matches are counted.
    pub fn matches(&mut self, issue: &str, location: &str, message: &str) -> bool {
        let key = BaselineEntry {
            issue: issue.to_string(),
            location: location.to_string(),
            message: message.to_string(),
        };
        match self.entries.get_mut(&key) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    /// Total number of diagnostics suppressed by this baseline.
    pub fn matched_count(&self) -> usize {
        self.entries.values().sum()
    }

    /// Entries that never matched, sorted. These can be deleted.
    pub fn unmatched(&self) -> Vec<&BaselineEntry> {
        let mut unmatched: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(entry, _)| entry)
            .collect();
        unmatched.sort_by(|a, b| (&a.location, &a.issue).cmp(&(&b.location, &b.issue)));
        unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "// Baseline format: 1.0\n\
        RemovedMethod: test.pkg.Foo.bar: Removed method test.pkg.Foo.bar(int)\n\
        \n\
        AddedClass: test.pkg.New: Added class test.pkg.New\n";

    #[test]
    fn test_parse_and_match() {
        let mut baseline = Baseline::parse(TEXT, Some("baseline.txt")).unwrap();
        assert_eq!(baseline.len(), 2);

        assert!(baseline.matches(
            "RemovedMethod",
            "test.pkg.Foo.bar",
            "Removed method test.pkg.Foo.bar(int)"
        ));
        assert!(!baseline.matches("RemovedMethod", "test.pkg.Foo.baz", "Removed method"));
        assert_eq!(baseline.matched_count(), 1);

        let unmatched = baseline.unmatched();
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].issue, "AddedClass");
        assert_eq!(unmatched[0].to_string(), "AddedClass: test.pkg.New: Added class test.pkg.New");
    }

    #[test]
    fn test_malformed_line() {
        let err = Baseline::parse("// header\nnot a baseline entry\n", Some("b.txt")).unwrap_err();
        assert!(err.to_string().starts_with("b.txt:2:"));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.txt");
        std::fs::write(&path, TEXT).unwrap();
        let baseline = Baseline::read(&path).unwrap();
        assert_eq!(baseline.len(), 2);
        assert!(baseline.description().ends_with("baseline.txt"));
    }
}
