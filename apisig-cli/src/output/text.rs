//! Colored text rendering shared by the commands.

use apisig_core::report::{Diagnostic, Severity};
use apisig_core::DiffHunk;
use colored::{ColoredString, Colorize};

/// Severity name colored by loudness.
pub fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => severity.as_str().red().bold(),
        Severity::Warning => severity.as_str().yellow().bold(),
        Severity::Lint => severity.as_str().magenta(),
        Severity::Info => severity.as_str().cyan(),
        Severity::Hidden | Severity::Inherit => severity.as_str().dimmed(),
    }
}

/// `location: severity: message [Name:code]`, colored.
pub fn paint_diagnostic(diagnostic: &Diagnostic) -> String {
    let mut line = String::new();
    if !diagnostic.location.is_empty() {
        line.push_str(&format!("{}: ", diagnostic.location.bold()));
    }
    line.push_str(&format!(
        "{}: {} {}",
        severity_label(diagnostic.severity),
        diagnostic.message,
        diagnostic.issue.to_string().dimmed()
    ));
    line
}

/// A diff hunk with removed lines in red and added lines in green.
pub fn paint_hunk(hunk: &DiffHunk) -> String {
    let mut out = String::new();
    for line in hunk.to_string().lines() {
        let painted = if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else {
            line.to_string()
        };
        out.push_str(&painted);
        out.push('\n');
    }
    out
}
