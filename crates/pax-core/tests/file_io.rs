// crates/pax-core/tests/file_io.rs
// ============================================================================
// Module: File IO Tests
// Description: Writing and reading XML and JSON files on disk.
// Purpose: Ensure naming rules, declaration output and error mapping.
// Dependencies: pax_core, tempfile
// ============================================================================
//! ## Overview
//! Integration tests for [`pax_core::FileWriter`] and file readers.

// ============================================================================
// SECTION: Test Support
// ============================================================================

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

mod support;

use std::fs;
use std::path::Path;

use pax_core::Document;
use pax_core::DocumentFormat;
use pax_core::FileWriter;
use pax_core::IoError;
use pax_core::NoopSink;
use pax_core::PaxError;
use pax_core::ReadLimits;
use pax_core::XmlError;
use pax_core::XmlReader;
use pax_core::io::format_of;
use pax_core::io::read_document;
use pax_core::io::read_json_file;
use pax_core::io::read_xml_file;
use pax_core::io::with_extension;
use support::TestResult;
use support::ensure;
use support::sample_tree;
use tempfile::TempDir;

#[test]
fn xml_file_starts_with_declaration() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let document = sample_tree();
    let written = FileWriter::new()
        .write_xml(document.root_node(), &dir.path().join("out"))
        .map_err(|err| err.to_string())?;
    ensure(written == dir.path().join("out.xml"), "extension should be appended")?;
    let content = fs::read_to_string(&written).map_err(|err| err.to_string())?;
    let expected = format!(
        "<?xml version=\"1.1\" encoding=\"UTF-8\"?>\n{}",
        document.root_node().xml()
    );
    ensure(content == expected, format!("unexpected content:\n{content}"))
}

#[test]
fn existing_extension_is_kept_case_insensitively() -> TestResult {
    ensure(
        with_extension(Path::new("data.XML"), ".xml") == Path::new("data.XML"),
        "upper-case extension should be kept",
    )?;
    ensure(
        with_extension(Path::new("data.txt"), ".json") == Path::new("data.txt.json"),
        "other extensions get the suffix",
    )
}

#[test]
fn directory_writes_use_root_tag_or_default_name() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let writer = FileWriter::new();
    let tagged = writer
        .write_xml_into(sample_tree().root_node(), dir.path())
        .map_err(|err| err.to_string())?;
    ensure(tagged == dir.path().join("root.xml"), "root tag names the file")?;
    let untagged = writer
        .write_json_into(Document::untagged().root_node(), dir.path())
        .map_err(|err| err.to_string())?;
    ensure(untagged == dir.path().join("__file_noname.json"), "default stem expected")
}

#[test]
fn written_files_read_back() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let document = sample_tree();
    let writer = FileWriter::new();
    let xml_path = writer
        .write_xml(document.root_node(), &dir.path().join("root"))
        .map_err(|err| err.to_string())?;
    let json_path = writer
        .write_json(document.root_node(), &dir.path().join("root"))
        .map_err(|err| err.to_string())?;
    for path in [xml_path, json_path] {
        let format = format_of(&path).ok_or("format should be inferred")?;
        let loaded = read_document(&path, format, ReadLimits::default(), &NoopSink)
            .map_err(|err| err.to_string())?;
        ensure(
            loaded.root_node().xml() == document.root_node().xml(),
            format!("{} should read back identically", path.display()),
        )?;
    }
    Ok(())
}

#[test]
fn format_is_inferred_from_extension() -> TestResult {
    ensure(format_of(Path::new("a.Json")) == Some(DocumentFormat::Json), "json")?;
    ensure(format_of(Path::new("a.xml")) == Some(DocumentFormat::Xml), "xml")?;
    ensure(format_of(Path::new("a.txt")).is_none(), "unknown extension")
}

#[test]
fn missing_file_is_an_io_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let result = XmlReader::new().parse_file(&dir.path().join("missing.xml"));
    ensure(matches!(result, Err(XmlError::Io(_))), "io error expected")?;
    let result = read_document(
        &dir.path().join("missing.json"),
        DocumentFormat::Json,
        ReadLimits::default(),
        &NoopSink,
    );
    ensure(matches!(result, Err(PaxError::Json(_))), "json error expected")
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.xml");
    fs::write(&path, format!("<root>{}</root>", "x".repeat(64))).map_err(|err| err.to_string())?;
    let reader = XmlReader::new().with_limits(ReadLimits {
        max_input_bytes: 32,
        max_depth: 4,
    });
    let result = reader.parse_file(&path);
    ensure(matches!(result, Err(XmlError::InputTooLarge { max_bytes: 32, .. })), "limit")
}

#[test]
fn unwritable_target_is_a_write_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let target = dir.path().join("no-such-dir").join("out");
    let result = FileWriter::new().write_xml(sample_tree().root_node(), &target);
    ensure(matches!(result, Err(IoError::Write { .. })), "write error expected")
}

#[test]
fn format_specific_readers_load_files() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let document = sample_tree();
    let writer = FileWriter::new();
    let xml_path = writer
        .write_xml(document.root_node(), &dir.path().join("tree"))
        .map_err(|err| err.to_string())?;
    let json_path = writer
        .write_json(document.root_node(), &dir.path().join("tree"))
        .map_err(|err| err.to_string())?;
    let from_xml = read_xml_file(&xml_path).map_err(|err| err.to_string())?;
    let from_json = read_json_file(&json_path).map_err(|err| err.to_string())?;
    ensure(from_xml.node_count() == document.node_count(), "xml node count")?;
    ensure(from_json.root_node().xml() == document.root_node().xml(), "json content")
}
