//! Issues, severities and the reporting pipeline.
//!
//! A diagnostic goes through, in order: item-scoped suppression
//! annotations, the per-run [`ErrorConfiguration`], the [`Baseline`], and
//! the `warnings_as_errors`/`lints_as_errors` promotions. Survivors reach
//! the [`DiagnosticSink`].
//!
//! # Example
//!
//! ```
//! use apisig_core::report::{issues, ErrorConfiguration, Reporter, Severity, VecSink};
//!
//! let mut config = ErrorConfiguration::new();
//! config.set_level("AddedMethod", Severity::Error).unwrap();
//!
//! let mut reporter = Reporter::new(&config, VecSink::new());
//! reporter.report_at(&issues::ADDED_METHOD, "api/current.txt:12", "Added method test.pkg.Foo.bar()");
//! assert!(reporter.has_errors());
//! ```

pub mod baseline;
pub mod config;
pub mod issues;
pub mod reporter;

pub use baseline::{Baseline, BaselineEntry};
pub use config::{ErrorConfiguration, Preset};
pub use issues::{Category, Issue, Severity};
pub use reporter::{Diagnostic, DiagnosticSink, Reporter, VecSink};
