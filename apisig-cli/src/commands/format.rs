//! Format command - re-emit a signature file in normal form
//!
//! Reads a signature file in any supported version and writes it back for
//! the requested view and format version.

use std::path::PathBuf;

use anyhow::{bail, Context};
use apisig_core::signature::write_codebase;
use apisig_core::{parse_files, ApiView, FileFormat, SignatureOptions};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::config::ApisigConfig;
use crate::output::{OutputConfig, Outputter};

/// Arguments for `apisig format`
#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Signature file to read
    pub file: PathBuf,

    /// Format version to write: 1.0, 2.0 or 3.0 (default: the input's version)
    #[arg(long = "format-version", value_name = "VERSION")]
    pub format_version: Option<String>,

    /// API view to emit
    #[arg(long, default_value = "public")]
    pub view: ApiView,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Result of a format run
#[derive(Debug, Serialize)]
pub struct FormatReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: FileFormat,
    pub view: ApiView,
    /// The signature text, when it was not written to a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Outputter for FormatReport {
    fn to_text(&self, _config: &OutputConfig) -> String {
        match (&self.signature, &self.output) {
            (Some(signature), _) => signature.clone(),
            (None, Some(path)) => format!(
                "{} Wrote {} (format {}, {} view)",
                "SUCCESS:".green().bold(),
                path.display().to_string().cyan(),
                self.format,
                self.view
            ),
            (None, None) => String::new(),
        }
    }
}

/// Pick the version to write: flag, then config, then the input's own.
pub fn resolve_format(requested: Option<&str>, config: &ApisigConfig, input: Option<FileFormat>) -> anyhow::Result<FileFormat> {
    match requested.or(config.signature_format()) {
        Some(tag) => match FileFormat::parse(tag) {
            FileFormat::Unknown => bail!("Unsupported signature format version: {}", tag),
            format => Ok(format),
        },
        None => Ok(input.unwrap_or(FileFormat::CURRENT)),
    }
}

pub fn run(args: &FormatArgs, config: &ApisigConfig, output: &OutputConfig) -> anyhow::Result<()> {
    let codebase = parse_files(&args.file.display().to_string(), std::slice::from_ref(&args.file))
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let format = resolve_format(args.format_version.as_deref(), config, codebase.format())?;
    let text = write_codebase(&codebase, args.view, &SignatureOptions::new(format));

    let signature = match &args.output {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("Failed to write to: {}", path.display()))?;
            None
        }
        None => Some(text),
    };

    FormatReport {
        input: args.file.clone(),
        output: args.output.clone(),
        format,
        view: args.view,
        signature,
    }
    .output(output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_precedence() {
        let config: ApisigConfig = toml::from_str("[output]\nsignature_format = \"3.0\"\n").unwrap();
        assert_eq!(resolve_format(Some("1.0"), &config, None).unwrap(), FileFormat::V1);
        assert_eq!(resolve_format(None, &config, Some(FileFormat::V1)).unwrap(), FileFormat::V3);

        let defaults = ApisigConfig::default();
        assert_eq!(resolve_format(None, &defaults, Some(FileFormat::V1)).unwrap(), FileFormat::V1);
        assert_eq!(resolve_format(None, &defaults, None).unwrap(), FileFormat::CURRENT);
    }

    #[test]
    fn test_resolve_format_rejects_unknown() {
        let err = resolve_format(Some("4.0"), &ApisigConfig::default(), None).unwrap_err();
        assert!(err.to_string().contains("4.0"));
    }
}
