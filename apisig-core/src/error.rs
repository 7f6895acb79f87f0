//! Error types for apisig-core.

use thiserror::Error;

/// Result type alias for apisig-core operations.
pub type Result<T> = std::result::Result<T, SignatureError>;

/// Errors raised while loading, building or checking API signatures.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// Malformed signature text. Fatal to the load of that file.
    #[error("{}: {message}", location_prefix(.file, .line))]
    Parse {
        /// File the text came from, when known.
        file: Option<String>,
        /// 1-based line of the offending token.
        line: u32,
        /// Description of the problem.
        message: String,
    },

    /// Type text that cannot be tokenized into a well-formed type.
    #[error("Invalid type `{text}`: {reason}")]
    InvalidType {
        /// The rejected type text.
        text: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two classes with the same qualified name in one codebase.
    #[error("Duplicate class {qualified_name}")]
    DuplicateClass {
        /// Qualified name of the class.
        qualified_name: String,
    },

    /// Two members with the same signature key in one class.
    #[error("Duplicate member {key} in {class}")]
    DuplicateMember {
        /// Qualified name of the owning class.
        class: String,
        /// Signature key of the member.
        key: String,
    },

    /// A class referenced by id or name does not exist.
    #[error("Unknown class {name}")]
    UnknownClass {
        /// Name that failed to resolve.
        name: String,
    },

    /// A member referenced by signature key does not exist.
    #[error("Unknown member {key} in {class}")]
    UnknownMember {
        /// Qualified name of the class searched.
        class: String,
        /// Signature key that failed to resolve.
        key: String,
    },

    /// An issue name or code that is not in the issue table.
    #[error("Unknown issue id: {id}")]
    UnknownIssue {
        /// The id as given.
        id: String,
    },

    /// Unrecognized signature format version tag in a file header.
    #[error("Unsupported signature format {tag}")]
    UnsupportedFormat {
        /// The tag found in the header.
        tag: String,
    },

    /// The compatibility check reported at least one error.
    #[error("Aborting: Found compatibility problems ({count} errors)")]
    CompatibilityProblems {
        /// Number of error-severity diagnostics.
        count: usize,
    },

    /// IO error reading signature or baseline files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignatureError {
    /// Build a parse error at the given location.
    pub fn parse(file: Option<&str>, line: u32, message: impl Into<String>) -> Self {
        SignatureError::Parse {
            file: file.map(str::to_string),
            line,
            message: message.into(),
        }
    }

    /// Build an invalid-type error.
    pub fn invalid_type(text: &str, reason: impl Into<String>) -> Self {
        SignatureError::InvalidType {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

fn location_prefix(file: &Option<String>, line: &u32) -> String {
    match file {
        Some(file) => format!("{}:{}", file, line),
        None => format!("line {}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = SignatureError::parse(Some("api/current.txt"), 12, "expected `{`");
        assert_eq!(err.to_string(), "api/current.txt:12: expected `{`");

        let err = SignatureError::parse(None, 3, "unexpected end of input");
        assert_eq!(err.to_string(), "line 3: unexpected end of input");
    }

    #[test]
    fn test_error_display() {
        let err = SignatureError::invalid_type("List<String", "unbalanced `<`");
        assert!(err.to_string().contains("List<String"));

        let err = SignatureError::CompatibilityProblems { count: 2 };
        assert!(err.to_string().starts_with("Aborting: Found compatibility problems"));
    }
}
