// crates/pax-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests running the pax binary end to end.
// Purpose: Ensure conversions, searches and validation succeed or fail closed.
// Dependencies: pax-cli binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Runs the `pax` binary against temporary files and checks stdout, stderr
//! and exit status.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const SAMPLE_XML: &str = "<root><child1><child4 is=\"active\"/></child1>\
                          <child2 is=\"active\"/><child3 is=\"inactive\"/></root>";

fn pax_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pax"))
}

/// Runs `pax` in `dir` with `PAX_CONFIG` cleared.
fn run_pax(dir: &Path, args: &[&str]) -> Output {
    Command::new(pax_bin())
        .current_dir(dir)
        .env_remove("PAX_CONFIG")
        .args(args)
        .output()
        .expect("run pax")
}

/// Runs `pax` in `dir` with `PAX_CONFIG` set to `config`.
fn run_pax_with_env_config(dir: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(pax_bin())
        .current_dir(dir)
        .env("PAX_CONFIG", config)
        .args(args)
        .output()
        .expect("run pax")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn version_flag_prints_package_version() {
    let dir = TempDir::new().expect("temp dir");
    let output = run_pax(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("pax "), "unexpected stdout: {}", stdout(&output));
}

#[test]
fn convert_xml_to_json_on_stdout() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    let output = run_pax(dir.path(), &["convert", "sample.xml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(stdout(&output).trim()).expect("json output");
    assert_eq!(value["__tag__"], "root");
    assert_eq!(value["__children__"]["child2"]["__attributes__"][0]["value"], "active");
}

#[test]
fn convert_round_trips_through_files() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    let output = run_pax(dir.path(), &["convert", "sample.xml", "--output", "tree.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("tree.json").is_file());
    let output = run_pax(dir.path(), &["convert", "tree.json", "--lined"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), SAMPLE_XML);
}

#[test]
fn convert_requires_known_format() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.txt"), SAMPLE_XML).expect("write input");
    let output = run_pax(dir.path(), &["convert", "sample.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("pass --from"), "unexpected stderr: {}", stderr(&output));
    let output = run_pax(dir.path(), &["convert", "sample.txt", "--from", "xml", "--to", "xml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("<root>\n  <child1>"));
}

#[test]
fn search_prints_found_subtree() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    let output = run_pax(dir.path(), &["search", "sample.xml", "/root/child1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "<child1>\n  <child4 is=\"active\"/>\n</child1>\n");
    let output = run_pax(dir.path(), &["search", "sample.xml", "/root/child5"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No node found at /root/child5"));
}

#[test]
fn validate_reports_counts_and_rejects_malformed_input() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    fs::write(dir.path().join("broken.xml"), "<root><a></root>").expect("write input");
    let output = run_pax(dir.path(), &["validate", "sample.xml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Valid xml document: 5 nodes, 3 attributes");
    let output = run_pax(dir.path(), &["validate", "broken.xml"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read broken.xml"));
}

#[test]
fn demo_writes_and_searches_sample_tree() {
    let dir = TempDir::new().expect("temp dir");
    let output = run_pax(dir.path(), &["demo", "--output-dir", "."]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let (before, after) = text.split_once("wrote ").expect("wrote line");
    let reloaded = after.split_once('\n').map(|(_, rest)| rest).expect("reloaded tree");
    assert!(before.starts_with("<root>"), "unexpected stdout: {text}");
    assert!(reloaded.starts_with(before), "reloaded tree should match the original: {text}");
    assert!(text.contains("/root/child1/child4/: hit <child4>"), "unexpected stdout: {text}");
    assert!(text.contains("/root/child1/child5/: miss"), "unexpected stdout: {text}");
    assert!(text.contains("./child1/child4/: hit <child4>"), "unexpected stdout: {text}");
    let written = fs::read_to_string(dir.path().join("root.xml")).expect("root.xml");
    assert!(written.starts_with("<?xml version=\"1.1\" encoding=\"UTF-8\"?>\n<root>"));
}

#[test]
fn config_controls_formatting_and_logging() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    let config = "[xml]\nindent_width = 4\n\n[logging]\nsink = \"file\"\npath = \"events.log\"\n";
    fs::write(dir.path().join("pax.toml"), config).expect("write config");
    let output = run_pax(dir.path(), &["search", "sample.xml", "/root/child1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "<child1>\n    <child4 is=\"active\"/>\n</child1>\n");
    let log = fs::read_to_string(dir.path().join("events.log")).expect("events log");
    let kinds: Vec<String> = log
        .lines()
        .map(|line| {
            let record: Value = serde_json::from_str(line).expect("json record");
            record["event"].as_str().unwrap_or_default().to_string()
        })
        .collect();
    assert_eq!(kinds, ["document_parsed", "search_resolved", "document_generated"]);
}

#[test]
fn config_env_var_selects_config_file() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    let settings = TempDir::new().expect("settings dir");
    let config = settings.path().join("custom.toml");
    fs::write(&config, "[xml]\nindent_width = 4\n").expect("write config");
    let output =
        run_pax_with_env_config(dir.path(), &config, &["search", "sample.xml", "/root/child1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "<child1>\n    <child4 is=\"active\"/>\n</child1>\n");
}

#[test]
fn config_env_var_pointing_at_missing_file_fails_closed() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    fs::write(dir.path().join("pax.toml"), "[xml]\nindent_width = 4\n").expect("write config");
    let missing = dir.path().join("missing.toml");
    let output = run_pax_with_env_config(dir.path(), &missing, &["validate", "sample.xml"]);
    assert!(!output.status.success(), "stdout: {}", stdout(&output));
    assert!(stderr(&output).contains("Failed to load config"), "stderr: {}", stderr(&output));
}

#[test]
fn invalid_config_fails_closed() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample.xml"), SAMPLE_XML).expect("write input");
    fs::write(dir.path().join("bad.toml"), "[limits]\nmax_depth = 0\n").expect("write config");
    let output = run_pax(dir.path(), &["--config", "bad.toml", "validate", "sample.xml"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"), "stderr: {}", stderr(&output));
}
