//! Integration tests for apisig CLI
//!
//! Tests end-to-end command behavior using the CLI binary.
//! Uses tempfile for isolated test directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Get the path to the apisig binary (built by cargo)
fn apisig_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_apisig"))
}

/// Run apisig with the given args in the specified directory
fn run_apisig(dir: &Path, args: &[&str]) -> Output {
    apisig_binary()
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute apisig command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write file");
    path
}

const RELEASED: &str = r#"// Signature format: 3.0
package sample {

  public class Greeter {
    ctor public Greeter();
    method public String greet(String? name);
    method public void wave();
  }

}
"#;

/// `greet` no longer accepts null: an error.
const CURRENT_BROKEN: &str = r#"// Signature format: 3.0
package sample {

  public class Greeter {
    ctor public Greeter();
    method public String greet(String name);
    method public void wave();
  }

}
"#;

/// Only an addition: a warning.
const CURRENT_COMPATIBLE: &str = r#"// Signature format: 3.0
package sample {

  public class Greeter {
    ctor public Greeter();
    method public String greet(String? name);
    method public void shout();
    method public void wave();
  }

}
"#;

fn check_args<'a>(previous: &'a str, current: &'a str) -> Vec<&'a str> {
    vec!["check", "--previous", previous, "--current", current]
}

// ============================================================================
// Check Command Tests
// ============================================================================

#[test]
fn test_check_compatible_api_succeeds() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_COMPATIBLE);

    let output = run_apisig(temp_dir.path(), &check_args("released.txt", "current.txt"));
    assert!(output.status.success(), "check should succeed: {}", stderr(&output));

    let stdout_str = stdout(&output);
    assert!(
        stdout_str.contains("warning: Added method sample.Greeter.shout [AddedMethod:4]"),
        "got: {}",
        stdout_str
    );
    assert!(stdout_str.contains("OK: 0 errors, 1 warnings"));
}

#[test]
fn test_check_incompatible_api_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_BROKEN);

    let output = run_apisig(temp_dir.path(), &check_args("released.txt", "current.txt"));
    assert!(!output.status.success(), "check should fail");

    assert!(stdout(&output).contains("error: Attempted to change parameter from @Nullable to @NonNull"));
    assert!(stderr(&output).contains("Aborting: Found compatibility problems"));
}

#[test]
fn test_check_hide_flag_suppresses_issue() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_BROKEN);

    let mut args = check_args("released.txt", "current.txt");
    args.extend(["--hide", "InvalidNullConversion"]);
    let output = run_apisig(temp_dir.path(), &args);
    assert!(output.status.success(), "hidden issue should not fail: {}", stderr(&output));
    assert!(!stdout(&output).contains("InvalidNullConversion"));
}

#[test]
fn test_check_warnings_as_errors() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_COMPATIBLE);

    let mut args = check_args("released.txt", "current.txt");
    args.push("--warnings-as-errors");
    let output = run_apisig(temp_dir.path(), &args);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("error: Added method sample.Greeter.shout"));
}

#[test]
fn test_check_baseline_suppresses_known_problem() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_BROKEN);
    write_file(
        temp_dir.path(),
        "baseline.txt",
        "// Baseline format: 1.0\n\
         InvalidNullConversion: sample.Greeter.greet.name: Attempted to change parameter from @Nullable to @NonNull: incompatible change for parameter name in sample.Greeter.greet\n",
    );

    let mut args = check_args("released.txt", "current.txt");
    args.extend(["--baseline", "baseline.txt"]);
    let output = run_apisig(temp_dir.path(), &args);
    assert!(output.status.success(), "baseline should suppress: {}", stdout(&output));
    assert!(stdout(&output).contains("1 known problems suppressed by the baseline"));
}

#[test]
fn test_check_config_file_preset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_COMPATIBLE);
    write_file(temp_dir.path(), ".apisigrc.toml", "[check]\npreset = \"current\"\n");

    let output = run_apisig(temp_dir.path(), &check_args("released.txt", "current.txt"));
    assert!(!output.status.success(), "current preset makes additions errors");
}

#[test]
fn test_check_json_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_BROKEN);

    let mut args = check_args("released.txt", "current.txt");
    args.extend(["--format", "json"]);
    let output = run_apisig(temp_dir.path(), &args);
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["found_problems"], true);
    assert_eq!(json["error_count"], 1);
    assert_eq!(json["diagnostics"][0]["issue"]["name"], "InvalidNullConversion");
    assert_eq!(json["diagnostics"][0]["severity"], "error");
}

#[test]
fn test_check_parse_error_reports_location() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", "// Signature format: 3.0\npackage sample {\n  public class {\n}\n");

    let output = run_apisig(temp_dir.path(), &check_args("released.txt", "current.txt"));
    assert!(!output.status.success());
    let stderr_str = stderr(&output);
    assert!(stderr_str.contains("Failed to load current API"), "got: {}", stderr_str);
    assert!(stderr_str.contains("current.txt:3"), "got: {}", stderr_str);
}

#[test]
fn test_check_unknown_issue_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", RELEASED);

    let mut args = check_args("released.txt", "current.txt");
    args.extend(["--error", "NotAnIssue"]);
    let output = run_apisig(temp_dir.path(), &args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown issue id: NotAnIssue"));
}

// ============================================================================
// Format Command Tests
// ============================================================================

#[test]
fn test_format_to_stdout_in_requested_version() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "api.txt", RELEASED);

    let output = run_apisig(temp_dir.path(), &["format", "api.txt", "--format-version", "2.0"]);
    assert!(output.status.success(), "format should succeed: {}", stderr(&output));

    let stdout_str = stdout(&output);
    assert!(stdout_str.starts_with("// Signature format: 2.0\n"));
    assert!(stdout_str.contains("greet(@Nullable String name)"), "got: {}", stdout_str);
}

#[test]
fn test_format_to_file_is_stable() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "api.txt", RELEASED);

    let output = run_apisig(temp_dir.path(), &["format", "api.txt", "-o", "once.txt"]);
    assert!(output.status.success(), "format should succeed: {}", stderr(&output));
    assert!(stdout(&output).contains("Wrote once.txt"));

    let output = run_apisig(temp_dir.path(), &["format", "once.txt", "-o", "twice.txt"]);
    assert!(output.status.success());

    let once = fs::read_to_string(temp_dir.path().join("once.txt")).unwrap();
    let twice = fs::read_to_string(temp_dir.path().join("twice.txt")).unwrap();
    assert_eq!(once, twice);
    assert!(once.starts_with("// Signature format: 3.0\n"));
}

#[test]
fn test_format_rejects_unknown_version() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "api.txt", RELEASED);

    let output = run_apisig(temp_dir.path(), &["format", "api.txt", "--format-version", "9.9"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unsupported signature format version: 9.9"));
}

// ============================================================================
// Diff Command Tests
// ============================================================================

#[test]
fn test_diff_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_COMPATIBLE);

    let output = run_apisig(temp_dir.path(), &["diff", "released.txt", "current.txt", "--context", "0"]);
    assert!(output.status.success(), "diff should succeed: {}", stderr(&output));
    assert!(stdout(&output).contains("+     method public void shout();"));
}

#[test]
fn test_diff_identical_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "a.txt", RELEASED);
    write_file(temp_dir.path(), "b.txt", RELEASED);

    let output = run_apisig(temp_dir.path(), &["diff", "a.txt", "b.txt"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No differences."));
}

#[test]
fn test_diff_summary_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "released.txt", RELEASED);
    write_file(temp_dir.path(), "current.txt", CURRENT_COMPATIBLE);

    let output = run_apisig(
        temp_dir.path(),
        &["diff", "released.txt", "current.txt", "--summary", "--format", "json"],
    );
    assert!(output.status.success(), "diff should succeed: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["summary"]["methods_added"], 1);
    assert_eq!(json["changes"][0]["name"], "sample.Greeter.shout");
    assert_eq!(json["changes"][0]["change_type"], "added");
}

// ============================================================================
// Issues Command Tests
// ============================================================================

#[test]
fn test_issues_lists_table() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_apisig(temp_dir.path(), &["issues"]);
    assert!(output.status.success());

    let stdout_str = stdout(&output);
    assert!(stdout_str.contains("InvalidNullConversion"));
    assert!(stdout_str.contains("(default preset)"));
}

#[test]
fn test_issues_json_with_preset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_apisig(temp_dir.path(), &["issues", "--preset", "released", "--format", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["preset"], "released");
    let added = json["issues"]
        .as_array()
        .unwrap()
        .iter()
        .find(|issue| issue["name"] == "AddedMethod")
        .unwrap();
    assert_eq!(added["severity"], "hidden");
}

// ============================================================================
// General
// ============================================================================

#[test]
fn test_no_command_prints_help() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_apisig(temp_dir.path(), &[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_malformed_config_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), ".apisigrc.toml", "[check\n");
    let output = run_apisig(temp_dir.path(), &["issues"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("Failed to parse .apisigrc.toml"));
}
