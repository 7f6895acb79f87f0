//! Severity-aware diagnostic reporting.
//!
//! The [`Reporter`] decides whether a diagnostic is shown and at which
//! severity, then hands it to a [`DiagnosticSink`]. It never formats for a
//! terminal; that is the sink's job.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::baseline::Baseline;
use super::config::ErrorConfiguration;
use super::issues::{Issue, Severity};
use crate::model::{ClassId, Codebase, Item, ItemRef, ModifierList};

/// A reported problem.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub issue: &'static Issue,
    pub severity: Severity,
    /// `file:line` of the item, empty when unknown.
    pub location: String,
    /// Qualified name of the item, when the diagnostic is about one.
    pub item: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.location.is_empty() {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "{}: {} {}", self.severity, self.message, self.issue)
    }
}

/// Receives diagnostics that survived suppression and severity filtering.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in report order.
#[derive(Debug, Default)]
pub struct VecSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for VecSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

/// Applies configuration, suppression and the baseline before emitting.
pub struct Reporter<'a, S: DiagnosticSink> {
    config: &'a ErrorConfiguration,
    sink: S,
    baseline: Option<Baseline>,
    warnings_as_errors: bool,
    lints_as_errors: bool,
    error_count: usize,
    reported_count: usize,
}

impl<'a, S: DiagnosticSink> Reporter<'a, S> {
    pub fn new(config: &'a ErrorConfiguration, sink: S) -> Self {
        Self {
            config,
            sink,
            baseline: None,
            warnings_as_errors: false,
            lints_as_errors: false,
            error_count: 0,
            reported_count: 0,
        }
    }

    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn warnings_as_errors(mut self, value: bool) -> Self {
        self.warnings_as_errors = value;
        self
    }

    pub fn lints_as_errors(mut self, value: bool) -> Self {
        self.lints_as_errors = value;
        self
    }

    pub fn config(&self) -> &ErrorConfiguration {
        self.config
    }

    /// Whether an item-scoped `@SuppressLint`/`@Suppress` annotation covers
    /// this diagnostic. The item and all its containing classes are checked.
    pub fn is_suppressed(
        &self,
        issue: &Issue,
        codebase: &Codebase,
        item: ItemRef<'_>,
        message: &str,
    ) -> bool {
        let covers = |modifiers: &ModifierList| {
            modifiers
                .suppressed_values()
                .iter()
                .any(|value| suppress_matches(value, issue.name, message))
        };

        if covers(item.item().modifiers()) {
            return true;
        }
        if let ItemRef::Parameter(_, method) = item {
            if covers(method.modifiers()) {
                return true;
            }
        }

        let mut class_id: Option<ClassId> = match item {
            ItemRef::Class(class) => class.containing_class_id(),
            other => other.class_id(),
        };
        while let Some(id) = class_id {
            let class = codebase.class(id);
            if covers(class.modifiers()) {
                return true;
            }
            class_id = class.containing_class_id();
        }
        false
    }

    /// Report a diagnostic about an item of `codebase`.
    ///
    /// Returns true when the diagnostic was suppressed and never reached
    /// the sink.
    pub fn report(&mut self, issue: &'static Issue, codebase: &Codebase, item: ItemRef<'_>, message: &str) -> bool {
        if self.is_suppressed(issue, codebase, item, message) {
            trace!(issue = issue.name, item = %item.describe(), "suppressed by annotation");
            return true;
        }
        let location = item.position().to_string();
        !self.emit(issue, location, Some(item.qualified_name()), message)
    }

    /// Report a diagnostic that is not tied to an item, such as a parse error.
    /// Returns true when it was suppressed.
    pub fn report_at(&mut self, issue: &'static Issue, location: &str, message: &str) -> bool {
        !self.emit(issue, location.to_string(), None, message)
    }

    // Returns true when the diagnostic reached the sink.
    fn emit(&mut self, issue: &'static Issue, location: String, item: Option<String>, message: &str) -> bool {
        let severity = self.config.severity(issue);
        if severity == Severity::Hidden {
            return false;
        }

        if let Some(baseline) = &mut self.baseline {
            let key = item.as_deref().unwrap_or(&location);
            if baseline.matches(issue.name, key, message) {
                trace!(issue = issue.name, key, "suppressed by baseline");
                return false;
            }
        }

        let severity = match severity {
            Severity::Lint if self.lints_as_errors => Severity::Error,
            Severity::Warning if self.warnings_as_errors => Severity::Error,
            other => other,
        };
        if severity == Severity::Error {
            self.error_count += 1;
        }
        self.reported_count += 1;

        self.sink.emit(Diagnostic {
            issue,
            severity,
            location,
            item,
            message: message.to_string(),
        });
        true
    }

    /// Whether any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn reported_count(&self) -> usize {
        self.reported_count
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// `Name` suppresses every message; `Name:message` or `Name: message`
/// suppresses only that exact message.
fn suppress_matches(value: &str, name: &str, message: &str) -> bool {
    if value == name {
        return true;
    }
    match value.strip_prefix(name).and_then(|rest| rest.strip_prefix(':')) {
        Some(rest) => rest == message || rest.strip_prefix(' ') == Some(message),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::issues::{ADDED_METHOD, INVALID_NULL_CONVERSION, REMOVED_METHOD};
    use crate::signature::parse_signature;

    const API: &str = "// Signature format: 2.0\n\
package test.pkg {\n\
  @SuppressLint(\"AddedMethod\") public class Quiet {\n\
    method public void foo();\n\
  }\n\
  public class Loud {\n\
    method public void bar();\n\
    method @SuppressLint(\"InvalidNullConversion:Attempted to change nullness\") public void baz();\n\
  }\n\
}\n";

    #[test]
    fn test_suppress_matches() {
        assert!(suppress_matches("AddedMethod", "AddedMethod", "anything"));
        assert!(suppress_matches("AddedMethod:msg", "AddedMethod", "msg"));
        assert!(suppress_matches("AddedMethod: msg", "AddedMethod", "msg"));
        assert!(!suppress_matches("AddedMethod:other", "AddedMethod", "msg"));
        assert!(!suppress_matches("AddedMethodX", "AddedMethod", "msg"));
    }

    #[test]
    fn test_report_respects_suppression_and_severity() {
        let codebase = parse_signature("api", API).unwrap();
        let quiet = codebase.find_class("test.pkg.Quiet").unwrap();
        let loud = codebase.find_class("test.pkg.Loud").unwrap();
        let config = ErrorConfiguration::new();
        let mut reporter = Reporter::new(&config, VecSink::new());

        let foo = ItemRef::Method(&quiet.methods()[0]);
        assert!(reporter.report(&ADDED_METHOD, &codebase, foo, "Added method test.pkg.Quiet.foo()"));

        let bar = ItemRef::Method(&loud.methods()[0]);
        assert!(!reporter.report(&ADDED_METHOD, &codebase, bar, "Added method test.pkg.Loud.bar()"));

        let baz = ItemRef::Method(&loud.methods()[1]);
        assert!(reporter.report(&INVALID_NULL_CONVERSION, &codebase, baz, "Attempted to change nullness"));
        assert!(!reporter.report(&INVALID_NULL_CONVERSION, &codebase, baz, "Something else"));

        assert_eq!(reporter.reported_count(), 2);
        assert_eq!(reporter.error_count(), 1);
        let sink = reporter.into_sink();
        assert_eq!(sink.diagnostics[0].severity, Severity::Warning);
        assert_eq!(sink.diagnostics[0].item.as_deref(), Some("test.pkg.Loud.bar"));
    }

    #[test]
    fn test_hidden_and_promoted() {
        let mut config = ErrorConfiguration::new();
        config.hide(&REMOVED_METHOD);
        let mut reporter = Reporter::new(&config, VecSink::new()).warnings_as_errors(true);

        assert!(reporter.report_at(&REMOVED_METHOD, "api.txt:3", "Removed method"));
        assert!(!reporter.report_at(&ADDED_METHOD, "api.txt:4", "Added method"));
        assert!(reporter.has_errors());
        assert_eq!(
            reporter.sink().diagnostics[0].to_string(),
            "api.txt:4: error: Added method [AddedMethod:4]"
        );
    }

    #[test]
    fn test_baseline_suppresses_and_counts() {
        let codebase = parse_signature("api", API).unwrap();
        let loud = codebase.find_class("test.pkg.Loud").unwrap();
        let baseline = Baseline::parse(
            "AddedMethod: test.pkg.Loud.bar: Added method test.pkg.Loud.bar()\n",
            None,
        )
        .unwrap();
        let config = ErrorConfiguration::new();
        let mut reporter = Reporter::new(&config, VecSink::new()).with_baseline(baseline);

        let bar = ItemRef::Method(&loud.methods()[0]);
        assert!(reporter.report(&ADDED_METHOD, &codebase, bar, "Added method test.pkg.Loud.bar()"));
        assert_eq!(reporter.baseline().map(Baseline::matched_count), Some(1));
        assert!(reporter.sink().diagnostics.is_empty());
    }
}
