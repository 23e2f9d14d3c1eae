//! Config loading and validation tests for pax-config.
// crates/pax-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load and Validation Tests
// Description: Validate defaults, file loading guards and field invariants.
// Purpose: Ensure configuration fails closed and maps onto pax-core options.
// =============================================================================

use std::fs;

use pax_config::ConfigError;
use pax_config::LineEndingConfig;
use pax_config::LogSinkKind;
use pax_config::PaxConfig;
use pax_core::LineEnding;
use pax_core::ReadLimits;
use pax_core::XmlOptions;
use tempfile::TempDir;

mod common;

use common::TestResult;
use common::assert_invalid;
use common::config_from_toml;
use common::minimal_config;

#[test]
fn empty_config_matches_core_defaults() -> TestResult {
    let config = minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.xml_options() != XmlOptions::default() {
        return Err("xml options should match defaults".to_string());
    }
    if config.read_limits() != ReadLimits::default() {
        return Err("read limits should match defaults".to_string());
    }
    if config.json_options().pretty {
        return Err("json output should default to compact".to_string());
    }
    if config.logging.sink != LogSinkKind::None {
        return Err("logging should default to none".to_string());
    }
    Ok(())
}

#[test]
fn sections_map_onto_core_options() -> TestResult {
    let config = PaxConfig::from_toml(
        r#"
        [xml]
        indent_width = 4
        line_ending = "crlf"
        declaration_version = "1.0"

        [json]
        pretty = true

        [limits]
        max_input_bytes = 2048
        max_depth = 16

        [logging]
        sink = "stderr"
        "#,
    )
    .map_err(|err| err.to_string())?;
    let xml = config.xml_options();
    if xml.indent_width != 4 || xml.line_ending != LineEnding::CrLf {
        return Err("xml options should use width 4 and crlf".to_string());
    }
    if xml.declaration_version != "1.0" {
        return Err("declaration version should be 1.0".to_string());
    }
    if !config.json_options().pretty {
        return Err("json should be pretty".to_string());
    }
    let limits = config.read_limits();
    if limits.max_input_bytes != 2048 || limits.max_depth != 16 {
        return Err("limits should be 2048 bytes and depth 16".to_string());
    }
    if config.logging.sink != LogSinkKind::Stderr {
        return Err("stderr sink expected".to_string());
    }
    Ok(())
}

#[test]
fn indent_width_must_be_bounded() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.xml.indent_width = 0;
    assert_invalid(config.validate(), "xml.indent_width must be between 1 and")?;
    config.xml.indent_width = pax_config::MAX_INDENT_WIDTH + 1;
    assert_invalid(config.validate(), "xml.indent_width must be between 1 and")
}

#[test]
fn declaration_version_must_be_set() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.xml.declaration_version = "  ".to_string();
    assert_invalid(config.validate(), "xml.declaration_version must be set")?;
    config.xml.declaration_version = "1.1\"".to_string();
    assert_invalid(config.validate(), "must be a dotted version number")
}

#[test]
fn limits_must_be_positive() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.limits.max_input_bytes = 0;
    assert_invalid(config.validate(), "limits.max_input_bytes must be greater than zero")?;
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.limits.max_depth = 0;
    assert_invalid(config.validate(), "limits.max_depth must be greater than zero")
}

#[test]
fn file_sink_requires_path() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.logging.sink = LogSinkKind::File;
    assert_invalid(config.validate(), "logging.path is required for the file sink")?;
    config.logging.path = Some("   ".to_string());
    assert_invalid(config.validate(), "logging.path must be non-empty")?;
    config.logging.path = Some("pax-events.log".to_string());
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn unknown_enum_values_fail_to_parse() -> TestResult {
    let result = config_from_toml("[xml]\nline_ending = \"cr\"\n");
    if result.is_ok() {
        return Err("unknown line ending should fail".to_string());
    }
    assert_invalid(PaxConfig::from_toml("[logging]\nsink = \"syslog\"\n"), "config parse error")
}

#[test]
fn load_reads_explicit_path() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[xml]\nline_ending = \"crlf\"\n").map_err(|err| err.to_string())?;
    let config = PaxConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.xml.line_ending != LineEndingConfig::Crlf {
        return Err("crlf expected".to_string());
    }
    if config.source.as_deref() != Some(path.as_path()) {
        return Err("source path should be recorded".to_string());
    }
    Ok(())
}

#[test]
fn load_fails_for_missing_explicit_path() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let result = PaxConfig::load(Some(&dir.path().join("absent.toml")));
    if !matches!(result, Err(ConfigError::Io(_))) {
        return Err("missing explicit config should be an io error".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_oversized_and_non_utf8_files() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let big = dir.path().join("big.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    fs::write(&big, padding).map_err(|err| err.to_string())?;
    assert_invalid(PaxConfig::load(Some(&big)), "config file exceeds size limit")?;
    let binary = dir.path().join("binary.toml");
    fs::write(&binary, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(PaxConfig::load(Some(&binary)), "config file must be utf-8")
}

#[test]
fn load_rejects_long_path_components() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("a".repeat(300));
    assert_invalid(PaxConfig::load(Some(&path)), "config path component too long")
}

#[test]
fn load_validates_file_contents() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("pax.toml");
    fs::write(&path, "[limits]\nmax_depth = 0\n").map_err(|err| err.to_string())?;
    assert_invalid(PaxConfig::load(Some(&path)), "limits.max_depth must be greater than zero")
}
