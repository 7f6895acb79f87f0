//! Diff command - compare two signature files
//!
//! By default both files are normalized through the signature writer and
//! diffed line by line, so formatting and ordering noise disappears. With
//! `--summary` the two APIs are compared item by item instead.

use std::path::{Path, PathBuf};

use anyhow::Context;
use apisig_core::differ::{ApiChange, ChangeType};
use apisig_core::signature::write_format;
use apisig_core::{diff_lines, parse_files, summarize_changes, ChangeSummary, Codebase, DiffHunk, FileFormat};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::output::{paint_hunk, OutputConfig, Outputter};

/// Arguments for `apisig diff`
#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Older signature file
    pub old: PathBuf,

    /// Newer signature file
    pub new: PathBuf,

    /// Lines of context around each hunk
    #[arg(short = 'C', long, default_value = "3")]
    pub context: usize,

    /// Summarize added, removed and modified items instead of diffing text
    #[arg(long)]
    pub summary: bool,
}

/// Line diff of the normalized signature text
#[derive(Debug, Serialize)]
pub struct TextDiff {
    pub old: PathBuf,
    pub new: PathBuf,
    pub format: FileFormat,
    pub hunks: Vec<DiffHunk>,
}

impl Outputter for TextDiff {
    fn to_text(&self, _config: &OutputConfig) -> String {
        let mut output = format!(
            "{} {} -> {}\n",
            "DIFF:".cyan().bold(),
            self.old.display().to_string().yellow(),
            self.new.display().to_string().green()
        );
        if self.hunks.is_empty() {
            output.push_str(&format!("{}\n", "No differences.".dimmed()));
        }
        for hunk in &self.hunks {
            output.push_str(&paint_hunk(hunk));
        }
        output
    }
}

/// Item-level change summary
#[derive(Debug, Serialize)]
pub struct SummaryDiff {
    pub old: PathBuf,
    pub new: PathBuf,
    #[serde(flatten)]
    pub result: ChangeSummary,
}

fn push_group(output: &mut String, title: colored::ColoredString, changes: &[&ApiChange], marker: &str) {
    if changes.is_empty() {
        return;
    }
    output.push_str(&format!("{} ({}):\n", title, changes.len()));
    for change in changes {
        let marker = if change.is_breaking { "!" } else { marker };
        output.push_str(&format!("  {} {} [{}]\n", marker, change.name, change.item_kind.as_str()));
        if let Some(details) = &change.details {
            output.push_str(&format!("    {}\n", details.dimmed()));
        }
    }
    output.push('\n');
}

impl Outputter for SummaryDiff {
    fn to_text(&self, _config: &OutputConfig) -> String {
        let breaking: Vec<&ApiChange> = self.result.breaking_changes().collect();
        let mut output = format!(
            "{} {} -> {}\n",
            "DIFF:".cyan().bold(),
            self.old.display().to_string().yellow(),
            self.new.display().to_string().green()
        );
        output.push_str(&format!(
            "Found {} changes ({} breaking) ({:.1}ms)\n",
            self.result.changes.len().to_string().cyan(),
            breaking.len().to_string().red(),
            self.result.duration_ms
        ));
        output.push_str(&format!("{}\n\n", self.result.summary_text.dimmed()));

        if !self.result.has_changes() {
            output.push_str(&format!("{}\n", "No API changes detected.".dimmed()));
            return output;
        }

        if !breaking.is_empty() {
            output.push_str(&format!("{}\n", "BREAKING CHANGES:".red().bold()));
            output.push_str(&format!("{}\n", "-".repeat(60)));
            for change in &breaking {
                output.push_str(&format!(
                    "  {} {} ({})\n",
                    change.name.red().bold(),
                    format!("[{}]", change.item_kind.as_str()).dimmed(),
                    change.change_type.as_str()
                ));
                if let Some(details) = &change.details {
                    output.push_str(&format!("     {}\n", details.dimmed()));
                }
            }
            output.push('\n');
        }

        let of_type = |change_type: ChangeType| -> Vec<&ApiChange> {
            self.result
                .changes
                .iter()
                .filter(|c| c.change_type == change_type)
                .collect()
        };
        push_group(&mut output, "ADDED".green().bold(), &of_type(ChangeType::Added), "+");
        push_group(&mut output, "MODIFIED".yellow().bold(), &of_type(ChangeType::Modified), "~");
        push_group(&mut output, "REMOVED".red().bold(), &of_type(ChangeType::Removed), "-");
        output
    }
}

fn load(path: &Path) -> anyhow::Result<Codebase> {
    parse_files(&path.display().to_string(), &[path.to_path_buf()])
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Diff two codebases as normalized text in the older file's format.
pub fn text_diff(old: &Codebase, new: &Codebase, context: usize) -> (FileFormat, Vec<DiffHunk>) {
    let format = old.format().unwrap_or(FileFormat::CURRENT);
    let before = write_format(old, format);
    let after = write_format(new, format);
    let before: Vec<&str> = before.lines().collect();
    let after: Vec<&str> = after.lines().collect();
    (format, diff_lines(&before, &after, context))
}

pub fn run(args: &DiffArgs, output: &OutputConfig) -> anyhow::Result<()> {
    let old = load(&args.old)?;
    let new = load(&args.new)?;

    if args.summary {
        SummaryDiff {
            old: args.old.clone(),
            new: args.new.clone(),
            result: summarize_changes(&old, &new),
        }
        .output(output);
    } else {
        let (format, hunks) = text_diff(&old, &new, args.context);
        TextDiff {
            old: args.old.clone(),
            new: args.new.clone(),
            format,
            hunks,
        }
        .output(output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apisig_core::parse_signature;

    const OLD: &str = "// Signature format: 2.0\npackage p {\n  public class A {\n    method public void b();\n    method public void a();\n  }\n}\n";

    #[test]
    fn test_text_diff_ignores_ordering() {
        let old = parse_signature("old", OLD).unwrap();
        let reordered = parse_signature(
            "new",
            "// Signature format: 2.0\npackage p {\n  public class A {\n    method public void a();\n    method public void b();\n  }\n}\n",
        )
        .unwrap();
        let (format, hunks) = text_diff(&old, &reordered, 3);
        assert_eq!(format, FileFormat::V2);
        assert!(hunks.is_empty());
    }

    #[test]
    fn test_text_diff_shows_removed_method() {
        let old = parse_signature("old", OLD).unwrap();
        let new = parse_signature(
            "new",
            "// Signature format: 2.0\npackage p {\n  public class A {\n    method public void a();\n  }\n}\n",
        )
        .unwrap();
        let (_, hunks) = text_diff(&old, &new, 0);
        assert_eq!(hunks.len(), 1);
        colored::control::set_override(false);
        assert!(paint_hunk(&hunks[0]).contains("-     method public void b();"));
    }

    #[test]
    fn test_summary_text_lists_breaking_changes() {
        colored::control::set_override(false);
        let old = parse_signature("old", OLD).unwrap();
        let new = parse_signature(
            "new",
            "// Signature format: 2.0\npackage p {\n  public class A {\n    method public void a();\n    method public void c();\n  }\n}\n",
        )
        .unwrap();
        let diff = SummaryDiff {
            old: PathBuf::from("old.txt"),
            new: PathBuf::from("new.txt"),
            result: summarize_changes(&old, &new),
        };
        let text = diff.to_text(&OutputConfig::new(crate::output::OutputFormat::Text));
        assert!(text.contains("BREAKING CHANGES:"));
        assert!(text.contains("ADDED (1):\n  + p.A.c [method]"));
        assert!(text.contains("REMOVED (1):\n  ! p.A.b [method]"));
    }
}
