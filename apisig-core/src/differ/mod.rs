//! Comparison of two API snapshots.
//!
//! [`compare_codebases`] walks an old and a new [`Codebase`](crate::model::Codebase)
//! in lockstep and calls a [`ComparisonVisitor`] for every matched, added and
//! removed item. Two visitors are provided:
//!
//! - [`CompatibilityCheck`] applies the compatibility rules and reports
//!   diagnostics through a [`Reporter`](crate::report::Reporter).
//! - [`ChangeSummary`] records every change for review.
//!
//! # Example
//!
//! ```
//! use apisig_core::differ::check_compatibility;
//! use apisig_core::report::ErrorConfiguration;
//! use apisig_core::signature::parse_signature;
//!
//! let old = parse_signature("old", "// Signature format: 2.0\npackage p {\n  public class A {\n    method public void m();\n  }\n}\n").unwrap();
//! let new = parse_signature("new", "// Signature format: 2.0\npackage p {\n  public class A {\n  }\n}\n").unwrap();
//!
//! let outcome = check_compatibility(&old, &new, &ErrorConfiguration::new());
//! assert_eq!(outcome.diagnostics[0].message, "Removed method p.A.m");
//! ```

pub mod changes;
pub mod comparator;
pub mod compatibility;

pub use changes::{summarize_changes, ApiChange, ChangeSummary, ChangeType, DiffSummary, ItemKind};
pub use comparator::{compare_codebases, Comparison, ComparisonVisitor, WalkStats};
pub use compatibility::{check_compatibility, CheckOutcome, CompatibilityCheck};
