//! The static issue table.
//!
//! Every diagnostic the checker can produce is identified by an [`Issue`]:
//! a stable numeric code, a CamelCase name, a category and a default
//! severity. Some issues inherit their severity from a parent issue, so a
//! run that hides `RemovedMethod` also hides `RemovedDeprecatedMethod`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignatureError};

/// How loudly an issue is reported.
///
/// Ordered from quietest to loudest. [`Severity::Inherit`] sorts first but
/// never survives resolution; it defers to the parent issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Inherit,
    Hidden,
    Info,
    Lint,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Inherit => "inherit",
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Lint => "lint",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inherit" => Ok(Severity::Inherit),
            "hidden" | "hide" => Ok(Severity::Hidden),
            "info" => Ok(Severity::Info),
            "lint" => Ok(Severity::Lint),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Broad grouping of issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Compatibility,
    Documentation,
    ApiLint,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Compatibility => "compatibility",
            Category::Documentation => "documentation",
            Category::ApiLint => "api_lint",
            Category::Unknown => "unknown",
        }
    }
}

/// A kind of diagnostic.
#[derive(Debug, Serialize)]
pub struct Issue {
    pub code: u16,
    pub name: &'static str,
    pub category: Category,
    /// Severity before any configuration is applied.
    pub default_severity: Severity,
    /// Issue whose severity is used when this one resolves to inherit.
    #[serde(skip)]
    pub parent: Option<&'static Issue>,
}

impl Issue {
    const fn new(code: u16, name: &'static str, category: Category, severity: Severity) -> Self {
        Self {
            code,
            name,
            category,
            default_severity: severity,
            parent: None,
        }
    }

    const fn inheriting(code: u16, name: &'static str, parent: &'static Issue) -> Self {
        Self {
            code,
            name,
            category: Category::Compatibility,
            default_severity: Severity::Inherit,
            parent: Some(parent),
        }
    }

    /// Look an issue up by case-insensitive name or numeric code.
    pub fn find(id: &str) -> Option<&'static Issue> {
        let id = id.trim();
        if let Ok(code) = id.parse::<u16>() {
            return ALL.iter().copied().find(|issue| issue.code == code);
        }
        ALL.iter()
            .copied()
            .find(|issue| issue.name.eq_ignore_ascii_case(id))
    }

    /// Like [`Issue::find`], but an unknown id is an error.
    pub fn lookup(id: &str) -> Result<&'static Issue> {
        Self::find(id).ok_or_else(|| SignatureError::UnknownIssue { id: id.to_string() })
    }

    pub fn is_compatibility(&self) -> bool {
        self.category == Category::Compatibility
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Issue {}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.name, self.code)
    }
}

use Category::{Compatibility, Unknown};
use Severity::{Error, Warning};

pub static PARSE_ERROR: Issue = Issue::new(1, "ParseError", Unknown, Error);

// Additions and removals
pub static ADDED_PACKAGE: Issue = Issue::new(2, "AddedPackage", Compatibility, Warning);
pub static ADDED_CLASS: Issue = Issue::new(3, "AddedClass", Compatibility, Warning);
pub static ADDED_METHOD: Issue = Issue::new(4, "AddedMethod", Compatibility, Warning);
pub static ADDED_FIELD: Issue = Issue::new(5, "AddedField", Compatibility, Warning);
pub static ADDED_INTERFACE: Issue = Issue::new(6, "AddedInterface", Compatibility, Warning);
pub static REMOVED_PACKAGE: Issue = Issue::new(7, "RemovedPackage", Compatibility, Warning);
pub static REMOVED_CLASS: Issue = Issue::new(8, "RemovedClass", Compatibility, Warning);
pub static REMOVED_METHOD: Issue = Issue::new(9, "RemovedMethod", Compatibility, Warning);
pub static REMOVED_FIELD: Issue = Issue::new(10, "RemovedField", Compatibility, Warning);
pub static REMOVED_INTERFACE: Issue = Issue::new(11, "RemovedInterface", Compatibility, Warning);

// Changes
pub static CHANGED_STATIC: Issue = Issue::new(12, "ChangedStatic", Compatibility, Warning);
pub static CHANGED_TRANSIENT: Issue = Issue::new(14, "ChangedTransient", Compatibility, Warning);
pub static CHANGED_VOLATILE: Issue = Issue::new(15, "ChangedVolatile", Compatibility, Warning);
pub static CHANGED_TYPE: Issue = Issue::new(16, "ChangedType", Compatibility, Warning);
pub static CHANGED_VALUE: Issue = Issue::new(17, "ChangedValue", Compatibility, Warning);
pub static CHANGED_SUPERCLASS: Issue = Issue::new(18, "ChangedSuperclass", Compatibility, Warning);
pub static CHANGED_SCOPE: Issue = Issue::new(19, "ChangedScope", Compatibility, Warning);
pub static CHANGED_ABSTRACT: Issue = Issue::new(20, "ChangedAbstract", Compatibility, Warning);
pub static CHANGED_THROWS: Issue = Issue::new(21, "ChangedThrows", Compatibility, Warning);
pub static CHANGED_CLASS: Issue = Issue::new(23, "ChangedClass", Compatibility, Error);
pub static CHANGED_DEPRECATED: Issue = Issue::new(24, "ChangedDeprecated", Compatibility, Warning);

pub static REMOVED_DEPRECATED_CLASS: Issue =
    Issue::inheriting(28, "RemovedDeprecatedClass", &REMOVED_CLASS);
pub static REMOVED_DEPRECATED_METHOD: Issue =
    Issue::inheriting(29, "RemovedDeprecatedMethod", &REMOVED_METHOD);
pub static REMOVED_DEPRECATED_FIELD: Issue =
    Issue::inheriting(30, "RemovedDeprecatedField", &REMOVED_FIELD);
pub static ADDED_ABSTRACT_METHOD: Issue =
    Issue::inheriting(31, "AddedAbstractMethod", &ADDED_METHOD);

pub static NEWLY_FINAL: Issue = Issue::new(45, "NewlyFinal", Compatibility, Error);

// Kotlin-era rules
pub static INVALID_NULL_CONVERSION: Issue =
    Issue::new(135, "InvalidNullConversion", Compatibility, Error);
pub static PARAMETER_NAME_CHANGE: Issue =
    Issue::new(136, "ParameterNameChange", Compatibility, Error);
pub static OPERATOR_REMOVAL: Issue = Issue::new(137, "OperatorRemoval", Compatibility, Error);
pub static INFIX_REMOVAL: Issue = Issue::new(138, "InfixRemoval", Compatibility, Error);
pub static VARARG_REMOVAL: Issue = Issue::new(139, "VarargRemoval", Compatibility, Error);
pub static ADD_SEALED: Issue = Issue::new(140, "AddSealed", Compatibility, Error);

pub static INTERNAL_ERROR: Issue = Issue::new(150, "InternalError", Unknown, Error);
pub static DEFAULT_VALUE_CHANGE: Issue =
    Issue::new(382, "DefaultValueChange", Compatibility, Error);

/// Every known issue, ordered by code.
pub static ALL: &[&Issue] = &[
    &PARSE_ERROR,
    &ADDED_PACKAGE,
    &ADDED_CLASS,
    &ADDED_METHOD,
    &ADDED_FIELD,
    &ADDED_INTERFACE,
    &REMOVED_PACKAGE,
    &REMOVED_CLASS,
    &REMOVED_METHOD,
    &REMOVED_FIELD,
    &REMOVED_INTERFACE,
    &CHANGED_STATIC,
    &CHANGED_TRANSIENT,
    &CHANGED_VOLATILE,
    &CHANGED_TYPE,
    &CHANGED_VALUE,
    &CHANGED_SUPERCLASS,
    &CHANGED_SCOPE,
    &CHANGED_ABSTRACT,
    &CHANGED_THROWS,
    &CHANGED_CLASS,
    &CHANGED_DEPRECATED,
    &REMOVED_DEPRECATED_CLASS,
    &REMOVED_DEPRECATED_METHOD,
    &REMOVED_DEPRECATED_FIELD,
    &ADDED_ABSTRACT_METHOD,
    &NEWLY_FINAL,
    &INVALID_NULL_CONVERSION,
    &PARAMETER_NAME_CHANGE,
    &OPERATOR_REMOVAL,
    &INFIX_REMOVAL,
    &VARARG_REMOVAL,
    &ADD_SEALED,
    &INTERNAL_ERROR,
    &DEFAULT_VALUE_CHANGE,
];
