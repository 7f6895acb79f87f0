//! Check command - compatibility check between two API snapshots
//!
//! Loads the previous and current signature files in parallel, runs the
//! compatibility rules under the configured severities and prints the
//! diagnostics. Any error-level diagnostic makes the command fail.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use apisig_core::report::{Baseline, ErrorConfiguration, Preset, Reporter, Severity, VecSink};
use apisig_core::{load_codebases_parallel, ApiSources, CheckOutcome, CompatibilityCheck};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ApisigConfig, SeverityLists};
use crate::output::{paint_diagnostic, OutputConfig, Outputter};

/// Arguments for `apisig check`
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Signature files of the previously released API
    #[arg(long, num_args = 1.., required = true)]
    pub previous: Vec<PathBuf>,

    /// Signature files of the current API
    #[arg(long, num_args = 1.., required = true)]
    pub current: Vec<PathBuf>,

    /// Signature files for classes outside the tracked API (e.g. the platform)
    #[arg(long, num_args = 1..)]
    pub classpath: Vec<PathBuf>,

    /// Baseline file of known problems to suppress
    #[arg(long)]
    pub baseline: Option<PathBuf>,

    /// Starting severity table
    #[arg(long)]
    pub preset: Option<Preset>,

    /// Issues to report as errors (names or ids, comma separated)
    #[arg(long = "error", value_name = "ISSUES")]
    pub error: Vec<String>,

    /// Issues to report as warnings
    #[arg(long = "warning", value_name = "ISSUES")]
    pub warning: Vec<String>,

    /// Issues to report as lint
    #[arg(long = "lint", value_name = "ISSUES")]
    pub lint: Vec<String>,

    /// Issues to hide
    #[arg(long = "hide", value_name = "ISSUES")]
    pub hide: Vec<String>,

    /// Treat warnings as errors
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Treat lint as errors
    #[arg(long)]
    pub lints_as_errors: bool,
}

impl CheckArgs {
    fn severity_lists(&self) -> SeverityLists {
        SeverityLists {
            error: self.error.clone(),
            warning: self.warning.clone(),
            lint: self.lint.clone(),
            hide: self.hide.clone(),
        }
    }
}

/// Result of a compatibility check
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub previous: Vec<PathBuf>,
    pub current: Vec<PathBuf>,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// Baseline entries that matched nothing in this run
    pub unmatched_baseline: Vec<String>,
    pub duration_ms: u64,
}

impl Outputter for CheckReport {
    fn to_text(&self, _config: &OutputConfig) -> String {
        let mut output = String::new();
        for diagnostic in &self.outcome.diagnostics {
            output.push_str(&paint_diagnostic(diagnostic));
            output.push('\n');
        }

        let warnings = self
            .outcome
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        let status = if self.outcome.found_problems {
            "FAILED:".red().bold()
        } else {
            "OK:".green().bold()
        };
        output.push_str(&format!(
            "{} {} errors, {} warnings ({}ms)",
            status, self.outcome.error_count, warnings, self.duration_ms
        ));
        if self.outcome.baseline_matches > 0 {
            output.push_str(&format!(
                "\n{}",
                format!("{} known problems suppressed by the baseline", self.outcome.baseline_matches).dimmed()
            ));
        }
        if !self.unmatched_baseline.is_empty() {
            output.push_str(&format!(
                "\n{}",
                format!("{} baseline entries no longer match", self.unmatched_baseline.len()).dimmed()
            ));
        }
        output
    }
}

/// Build the severity table: preset, then the config file, then flags.
pub fn error_configuration(args: &CheckArgs, config: &ApisigConfig) -> anyhow::Result<ErrorConfiguration> {
    let preset = args.preset.or(config.check.preset).unwrap_or_default();
    let mut errors = ErrorConfiguration::preset(preset);
    config
        .severity_lists()
        .apply(&mut errors)
        .context("Invalid issue in configuration file")?;
    args.severity_lists().apply(&mut errors)?;
    Ok(errors)
}

/// Run the check and print the report.
pub fn run(args: &CheckArgs, config: &ApisigConfig, output: &OutputConfig) -> anyhow::Result<()> {
    let start = Instant::now();
    let errors = error_configuration(args, config)?;

    let sources = [
        ApiSources::new("previous", args.previous.clone()).with_classpath(args.classpath.clone()),
        ApiSources::new("current", args.current.clone()).with_classpath(args.classpath.clone()),
    ];
    let [previous, current]: [_; 2] = load_codebases_parallel(&sources)
        .try_into()
        .map_err(|_| anyhow!("Expected two loaded codebases"))?;
    let previous = previous.context("Failed to load previous API")?;
    let current = current.context("Failed to load current API")?;

    let mut reporter = Reporter::new(&errors, VecSink::new())
        .warnings_as_errors(args.warnings_as_errors || config.check.warnings_as_errors)
        .lints_as_errors(args.lints_as_errors || config.check.lints_as_errors);
    if let Some(path) = args.baseline.as_ref().or(config.check.baseline.as_ref()) {
        let baseline = Baseline::read(path).with_context(|| format!("Failed to read baseline {}", path.display()))?;
        debug!("Loaded {} baseline entries from {}", baseline.len(), path.display());
        reporter = reporter.with_baseline(baseline);
    }

    CompatibilityCheck::run(&previous, &current, &mut reporter);

    let unmatched_baseline = reporter
        .baseline()
        .map(|b| b.unmatched().iter().map(|e| e.to_string()).collect())
        .unwrap_or_default();
    let report = CheckReport {
        previous: args.previous.clone(),
        current: args.current.clone(),
        outcome: CheckOutcome::from_reporter(reporter),
        unmatched_baseline,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Checked {} against {}: {} diagnostics",
        current.description(),
        previous.description(),
        report.outcome.diagnostics.len()
    );

    report.output(output);
    report.outcome.into_result()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apisig_core::report::issues;

    fn args() -> CheckArgs {
        CheckArgs {
            previous: vec![PathBuf::from("previous.txt")],
            current: vec![PathBuf::from("current.txt")],
            classpath: Vec::new(),
            baseline: None,
            preset: None,
            error: Vec::new(),
            warning: Vec::new(),
            lint: Vec::new(),
            hide: Vec::new(),
            warnings_as_errors: false,
            lints_as_errors: false,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let config: ApisigConfig = toml::from_str("[check]\nhide = [\"AddedMethod\"]\n").unwrap();
        let mut args = args();
        args.error = vec!["AddedMethod".to_string()];

        let errors = error_configuration(&args, &config).unwrap();
        assert_eq!(errors.severity(&issues::ADDED_METHOD), Severity::Error);
    }

    #[test]
    fn test_preset_flag_wins_over_config() {
        let config: ApisigConfig = toml::from_str("[check]\npreset = \"current\"\n").unwrap();
        let mut args = args();
        assert_eq!(
            error_configuration(&args, &config).unwrap().severity(&issues::ADDED_METHOD),
            Severity::Error
        );

        args.preset = Some(Preset::Released);
        assert_eq!(
            error_configuration(&args, &config).unwrap().severity(&issues::ADDED_METHOD),
            Severity::Hidden
        );
    }

    #[test]
    fn test_unknown_issue_flag_fails() {
        let mut args = args();
        args.lint = vec!["Bogus".to_string()];
        assert!(error_configuration(&args, &ApisigConfig::default()).is_err());
    }
}
