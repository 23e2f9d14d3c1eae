// crates/pax-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for format resolution, tree counts and sinks.
// Purpose: Ensure command helpers resolve inputs and fail closed.
// Dependencies: pax-cli main helpers
// ============================================================================

//! ## Overview
//! Validates the helpers behind the `pax` subcommands.

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

use pax_config::LogSinkKind;
use pax_config::LoggingConfig;
use pax_core::DocumentFormat;
use pax_core::PaxEvent;
use tempfile::TempDir;

use super::FormatArg;
use super::TreeCounts;
use super::build_sink;
use super::demo_tree;
use super::input_format;
use super::output_format;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn input_format_prefers_explicit_choice() {
    let format = input_format(Path::new("data.xml"), Some(FormatArg::Json)).expect("format");
    assert_eq!(format, DocumentFormat::Json);
    let inferred = input_format(Path::new("DATA.JSON"), None).expect("format");
    assert_eq!(inferred, DocumentFormat::Json);
}

#[test]
fn input_format_fails_without_extension() {
    let err = input_format(Path::new("data"), None).expect_err("format should be unknown");
    assert!(err.to_string().contains("pass --from"));
}

#[test]
fn output_format_defaults_to_the_other_format() {
    assert_eq!(output_format(DocumentFormat::Xml, None, None), DocumentFormat::Json);
    assert_eq!(output_format(DocumentFormat::Json, None, None), DocumentFormat::Xml);
    assert_eq!(
        output_format(DocumentFormat::Xml, None, Some(Path::new("out.xml"))),
        DocumentFormat::Xml
    );
    assert_eq!(
        output_format(DocumentFormat::Xml, Some(FormatArg::Xml), Some(Path::new("out.json"))),
        DocumentFormat::Xml
    );
}

#[test]
fn demo_tree_matches_sample_layout() {
    let document = demo_tree();
    let counts = TreeCounts::of(document.root_node());
    assert_eq!(counts, TreeCounts {
        nodes: 5,
        attributes: 3,
    });
    let child4 = document.search("/root/child1/child4").expect("child4");
    assert_eq!(child4.attributes().value("is"), Some("active"));
    assert!(document.search("./child1/child5/").is_none());
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("events.log");
    let logging = LoggingConfig {
        sink: LogSinkKind::File,
        path: Some(path.to_string_lossy().into_owned()),
    };
    let sink = build_sink(&logging).expect("sink");
    sink.record(&PaxEvent::SearchResolved {
        path: "/root".to_string(),
        found: true,
    });
    drop(sink);
    let content = fs::read_to_string(&path).expect("log file");
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"event\":\"search_resolved\""));
}

#[test]
fn file_sink_without_path_fails() {
    let logging = LoggingConfig {
        sink: LogSinkKind::File,
        path: None,
    };
    assert!(build_sink(&logging).is_err());
}
