//! Signature files: grammar, parser and writer.
//!
//! # Example
//!
//! ```
//! use apisig_core::format::FileFormat;
//! use apisig_core::signature::{parse_signature, write_format};
//!
//! let text = "// Signature format: 2.0\npackage a {\n  public class A {\n    ctor public A();\n  }\n}\n";
//! let codebase = parse_signature("example", text).unwrap();
//! assert!(write_format(&codebase, FileFormat::V2).contains("ctor public A();"));
//! ```

pub mod parser;
pub mod writer;

pub use parser::{
    detect_format, load_codebases_parallel, parse_files, parse_signature, read_signature, ApiSources,
};
pub use writer::{write_codebase, write_format, SignatureWriter};
