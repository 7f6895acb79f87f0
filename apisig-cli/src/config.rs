//! apisig configuration loading from `.apisigrc.toml`.
//!
//! Configuration is optional. Every section falls back to defaults, and
//! command-line flags override whatever the file says.
//!
//! # Example Configuration
//!
//! ```toml
//! [check]
//! preset = "released"
//! error = ["AddedMethod"]
//! hide = ["ChangedDeprecated"]
//! warnings_as_errors = false
//! baseline = "api/baseline.txt"
//!
//! [output]
//! format = "text"
//! color = true
//! signature_format = "2.0"
//! ```

use std::path::{Path, PathBuf};

use apisig_core::report::{ErrorConfiguration, Preset, Severity};
use serde::Deserialize;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".apisigrc.toml";

/// Root configuration structure loaded from `.apisigrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct ApisigConfig {
    /// Severity settings for `apisig check`.
    #[serde(default)]
    pub check: CheckSettings,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Compatibility check settings.
///
/// The lists accept issue names or numeric ids, and entries may themselves
/// be comma-separated.
#[derive(Debug, Deserialize, Default)]
pub struct CheckSettings {
    /// Starting severity table: `default`, `current` or `released`.
    #[serde(default)]
    pub preset: Option<Preset>,

    #[serde(default)]
    pub error: Vec<String>,

    #[serde(default)]
    pub warning: Vec<String>,

    #[serde(default)]
    pub lint: Vec<String>,

    #[serde(default)]
    pub hide: Vec<String>,

    #[serde(default)]
    pub warnings_as_errors: bool,

    #[serde(default)]
    pub lints_as_errors: bool,

    /// Baseline file of known problems, relative to the working directory.
    #[serde(default)]
    pub baseline: Option<PathBuf>,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g. `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `text` or `json`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output. Auto-detected when unset.
    #[serde(default)]
    pub color: Option<bool>,

    /// Signature format version written by `apisig format`.
    #[serde(default)]
    pub signature_format: Option<String>,
}

/// Severity overrides collected from one source, applied in increasing
/// order of strength.
#[derive(Debug, Default, Clone)]
pub struct SeverityLists {
    pub error: Vec<String>,
    pub warning: Vec<String>,
    pub lint: Vec<String>,
    pub hide: Vec<String>,
}

impl SeverityLists {
    /// Apply every list to `config`. Fails on the first unknown issue id.
    pub fn apply(&self, config: &mut ErrorConfiguration) -> apisig_core::Result<()> {
        let levels = [
            (&self.hide, Severity::Hidden),
            (&self.lint, Severity::Lint),
            (&self.warning, Severity::Warning),
            (&self.error, Severity::Error),
        ];
        for (ids, severity) in levels {
            for id in ids {
                config.set_level(id, severity)?;
            }
        }
        Ok(())
    }
}

impl ApisigConfig {
    /// Load configuration from `.apisigrc.toml` in the given directory.
    ///
    /// A missing file yields defaults. Read and parse errors are logged as
    /// warnings and also yield defaults.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Severity lists from the `[check]` section.
    pub fn severity_lists(&self) -> SeverityLists {
        SeverityLists {
            error: self.check.error.clone(),
            warning: self.check.warning.clone(),
            lint: self.check.lint.clone(),
            hide: self.check.hide.clone(),
        }
    }

    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    pub fn signature_format(&self) -> Option<&str> {
        self.output.signature_format.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apisig_core::report::issues;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ApisigConfig::default();
        assert!(config.check.preset.is_none());
        assert!(config.check.error.is_empty());
        assert!(!config.check.warnings_as_errors);
        assert!(config.output.format.is_none());
        assert!(config.use_color().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[check]
preset = "released"
error = ["AddedMethod"]
warning = ["ChangedThrows,ChangedScope"]
hide = ["24"]
warnings_as_errors = true
baseline = "api/baseline.txt"

[output]
format = "json"
color = false
signature_format = "3.0"
"#;
        let config: ApisigConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.check.preset, Some(Preset::Released));
        assert_eq!(config.check.error, vec!["AddedMethod"]);
        assert!(config.check.warnings_as_errors);
        assert!(!config.check.lints_as_errors);
        assert_eq!(config.check.baseline, Some(PathBuf::from("api/baseline.txt")));

        assert_eq!(config.default_format(), Some("json"));
        assert_eq!(config.use_color(), Some(false));
        assert_eq!(config.signature_format(), Some("3.0"));
    }

    #[test]
    fn test_severity_lists_apply() {
        let config: ApisigConfig = toml::from_str(
            r#"
[check]
error = ["AddedMethod"]
warning = ["ChangedThrows,ChangedScope"]
hide = ["24"]
"#,
        )
        .unwrap();

        let mut errors = ErrorConfiguration::new();
        config.severity_lists().apply(&mut errors).unwrap();
        assert_eq!(errors.severity(&issues::ADDED_METHOD), Severity::Error);
        assert_eq!(errors.severity(&issues::CHANGED_SCOPE), Severity::Warning);
        assert_eq!(errors.severity(&issues::CHANGED_DEPRECATED), Severity::Hidden);
    }

    #[test]
    fn test_unknown_issue_is_rejected() {
        let lists = SeverityLists {
            error: vec!["NoSuchIssue".to_string()],
            ..SeverityLists::default()
        };
        let err = lists.apply(&mut ErrorConfiguration::new()).unwrap_err();
        assert!(err.to_string().contains("NoSuchIssue"));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[check\npreset = ").unwrap();
        let config = ApisigConfig::load(dir.path());
        assert!(config.check.preset.is_none());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[check]\nlints_as_errors = true\n").unwrap();
        let config = ApisigConfig::load(dir.path());
        assert!(config.check.lints_as_errors);

        let missing = TempDir::new().unwrap();
        assert!(!ApisigConfig::load(missing.path()).check.lints_as_errors);
    }
}
