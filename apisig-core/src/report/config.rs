//! Per-run severity configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::issues::{self, Issue, Severity};
use crate::error::Result;

/// Named starting points for an [`ErrorConfiguration`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Table defaults.
    #[default]
    Default,
    /// Checking against the in-development API: every compatibility issue is an error.
    Current,
    /// Checking against the last release: additions are fine, removals are not.
    Released,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Current => "current",
            Preset::Released => "released",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "current" => Ok(Preset::Current),
            "released" => Ok(Preset::Released),
            other => Err(format!("unknown preset: {}", other)),
        }
    }
}

/// Severity overrides on top of the issue table.
///
/// Passed explicitly into every check; nothing here is global.
#[derive(Clone, Debug, Default)]
pub struct ErrorConfiguration {
    overrides: HashMap<u16, Severity>,
}

impl ErrorConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration for a preset.
    pub fn preset(preset: Preset) -> Self {
        let mut config = Self::new();
        match preset {
            Preset::Default => {}
            Preset::Current => {
                for issue in issues::ALL {
                    if issue.is_compatibility() && issue.default_severity != Severity::Inherit {
                        config.error(issue);
                    }
                }
            }
            Preset::Released => {
                for issue in [
                    &issues::ADDED_PACKAGE,
                    &issues::ADDED_CLASS,
                    &issues::ADDED_METHOD,
                    &issues::ADDED_FIELD,
                    &issues::ADDED_INTERFACE,
                    &issues::CHANGED_DEPRECATED,
                ] {
                    config.hide(issue);
                }
                for issue in [
                    &issues::REMOVED_PACKAGE,
                    &issues::REMOVED_CLASS,
                    &issues::REMOVED_METHOD,
                    &issues::REMOVED_FIELD,
                    &issues::REMOVED_INTERFACE,
                    &issues::CHANGED_STATIC,
                    &issues::CHANGED_TRANSIENT,
                    &issues::CHANGED_VOLATILE,
                    &issues::CHANGED_TYPE,
                    &issues::CHANGED_VALUE,
                    &issues::CHANGED_SUPERCLASS,
                    &issues::CHANGED_CLASS,
                    &issues::ADDED_ABSTRACT_METHOD,
                ] {
                    config.error(issue);
                }
            }
        }
        config
    }

    pub fn set_severity(&mut self, issue: &Issue, severity: Severity) {
        self.overrides.insert(issue.code, severity);
    }

    pub fn error(&mut self, issue: &Issue) {
        self.set_severity(issue, Severity::Error);
    }

    pub fn hide(&mut self, issue: &Issue) {
        self.set_severity(issue, Severity::Hidden);
    }

    /// Apply a severity to a comma separated list of issue names or codes.
    ///
    /// Nothing is changed when any id is unknown.
    pub fn set_level(&mut self, ids: &str, severity: Severity) -> Result<()> {
        let resolved = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(Issue::lookup)
            .collect::<Result<Vec<_>>>()?;
        for issue in resolved {
            self.set_severity(issue, severity);
        }
        Ok(())
    }

    /// Effective severity of an issue. Inherit resolves through the parent
    /// after overrides, so an override on the parent is honoured.
    pub fn severity(&self, issue: &Issue) -> Severity {
        let severity = self
            .overrides
            .get(&issue.code)
            .copied()
            .unwrap_or(issue.default_severity);
        match (severity, issue.parent) {
            (Severity::Inherit, Some(parent)) => self.severity(parent),
            (Severity::Inherit, None) => Severity::Error,
            (severity, _) => severity,
        }
    }

    pub fn is_overridden(&self, issue: &Issue) -> bool {
        self.overrides.contains_key(&issue.code)
    }
}
