//! Issues command - list the issue table with effective severities

use apisig_core::report::{issues, Category, ErrorConfiguration, Preset, Severity};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::config::ApisigConfig;
use crate::output::{severity_label, OutputConfig, Outputter};

/// Arguments for `apisig issues`
#[derive(Args, Debug, Clone)]
pub struct IssuesArgs {
    /// Show severities under this preset instead of the configured one
    #[arg(long)]
    pub preset: Option<Preset>,
}

#[derive(Debug, Serialize)]
pub struct IssueRow {
    pub code: u16,
    pub name: &'static str,
    pub category: Category,
    pub default_severity: Severity,
    /// Severity after the preset and configuration are applied
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct IssueTable {
    pub preset: Preset,
    pub issues: Vec<IssueRow>,
}

impl Outputter for IssueTable {
    fn to_text(&self, _config: &OutputConfig) -> String {
        let width = self.issues.iter().map(|row| row.name.len()).max().unwrap_or(0);
        let mut output = format!(
            "{} {} issues ({} preset)\n\n",
            "ISSUES:".cyan().bold(),
            self.issues.len(),
            self.preset
        );
        for row in &self.issues {
            let label = severity_label(row.severity);
            output.push_str(&format!(
                "  {:>4}  {:<width$}  {:<8}  {}",
                row.code,
                row.name,
                label.to_string(),
                row.category.as_str().dimmed(),
                width = width
            ));
            if let Some(parent) = row.inherits_from {
                output.push_str(&format!(" {}", format!("(inherits {})", parent).dimmed()));
            }
            output.push('\n');
        }
        output
    }
}

/// Rows for every known issue, in code order.
pub fn issue_table(preset: Preset, config: &ErrorConfiguration) -> IssueTable {
    let issues = issues::ALL
        .iter()
        .map(|issue| IssueRow {
            code: issue.code,
            name: issue.name,
            category: issue.category,
            default_severity: issue.default_severity,
            severity: config.severity(issue),
            inherits_from: issue.parent.map(|parent| parent.name),
        })
        .collect();
    IssueTable { preset, issues }
}

pub fn run(args: &IssuesArgs, config: &ApisigConfig, output: &OutputConfig) -> anyhow::Result<()> {
    let preset = args.preset.or(config.check.preset).unwrap_or_default();
    let mut errors = ErrorConfiguration::preset(preset);
    config.severity_lists().apply(&mut errors)?;
    issue_table(preset, &errors).output(output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_table_resolves_inherited_severity() {
        let table = issue_table(Preset::Default, &ErrorConfiguration::new());
        assert_eq!(table.issues.len(), issues::ALL.len());

        let row = table
            .issues
            .iter()
            .find(|row| row.name == "RemovedDeprecatedMethod")
            .unwrap();
        assert_eq!(row.default_severity, Severity::Inherit);
        assert_eq!(row.severity, Severity::Warning);
        assert_eq!(row.inherits_from, Some("RemovedMethod"));
    }

    #[test]
    fn test_issue_table_text() {
        colored::control::set_override(false);
        let table = issue_table(Preset::Released, &ErrorConfiguration::preset(Preset::Released));
        let text = table.to_text(&OutputConfig::new(crate::output::OutputFormat::Text));
        assert!(text.starts_with("ISSUES: "));
        assert!(text.contains("(released preset)"));
        assert!(text.lines().any(|line| line.contains("AddedMethod") && line.contains("hidden")));
    }
}
