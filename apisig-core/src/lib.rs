//! apisig core - signature-file model and API compatibility engine.
//!
//! This crate reads versioned signature files describing the public surface
//! of a Java/Kotlin library, writes them back in a normal form, and compares
//! two snapshots to find incompatible changes.
//!
//! # Features
//!
//! - **Signature files**: a `pest` grammar for formats 1.0, 2.0 and 3.0
//! - **API views**: public, removed and private filters over one model
//! - **Compatibility check**: rule-based comparison with configurable severities
//! - **Suppression**: item annotations and baseline files
//! - **Line diff**: LCS-based hunks for human-readable output
//!
//! # Example
//!
//! ```
//! use apisig_core::{check_compatibility, parse_signature, ErrorConfiguration};
//!
//! let old = parse_signature(
//!     "old",
//!     "// Signature format: 3.0\npackage p {\n  public class A {\n    method public void m(String? s);\n  }\n}\n",
//! ).unwrap();
//! let new = parse_signature(
//!     "new",
//!     "// Signature format: 3.0\npackage p {\n  public class A {\n    method public void m(String s);\n  }\n}\n",
//! ).unwrap();
//!
//! let outcome = check_compatibility(&old, &new, &ErrorConfiguration::new());
//! assert!(outcome.found_problems);
//! assert_eq!(outcome.diagnostics[0].issue.name, "InvalidNullConversion");
//! ```

pub mod differ;
pub mod error;
pub mod filter;
pub mod format;
pub mod line_diff;
pub mod model;
pub mod report;
pub mod signature;

pub use differ::{check_compatibility, summarize_changes, ChangeSummary, CheckOutcome, CompatibilityCheck};
pub use error::{Result, SignatureError};
pub use filter::ApiView;
pub use format::{FileFormat, SignatureOptions};
pub use line_diff::{diff_lines, get_diff, DiffHunk};
pub use model::{Codebase, CodebaseBuilder, ItemRef};
pub use report::{Baseline, Diagnostic, ErrorConfiguration, Issue, Preset, Reporter, Severity, VecSink};
pub use signature::{load_codebases_parallel, parse_files, parse_signature, write_codebase, ApiSources};
