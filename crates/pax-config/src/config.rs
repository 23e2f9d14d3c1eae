// crates/pax-config/src/config.rs
// ============================================================================
// Module: PAX Configuration
// Description: Configuration loading and validation for PAX tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pax-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional; missing keys take the `pax-core` defaults.
//! Invalid configuration fails closed instead of falling back to defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use pax_core::JsonOptions;
use pax_core::LineEnding;
use pax_core::ReadLimits;
use pax_core::XmlOptions;
use pax_core::limits::DEFAULT_MAX_DEPTH;
use pax_core::limits::DEFAULT_MAX_INPUT_BYTES;
use pax_core::xml::DEFAULT_DECLARATION_VERSION;
use pax_core::xml::DEFAULT_INDENT_WIDTH;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "pax.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PAX_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum spaces per indentation level.
pub const MAX_INDENT_WIDTH: usize = 16;
/// Maximum length of the declared XML version.
pub(crate) const MAX_DECLARATION_VERSION_LENGTH: usize = 16;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level PAX configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaxConfig {
    /// XML output formatting.
    #[serde(default)]
    pub xml: XmlConfig,
    /// JSON output formatting.
    #[serde(default)]
    pub json: JsonConfig,
    /// Reader limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was loaded from, if any (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl PaxConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// An explicit `path` or the [`CONFIG_ENV_VAR`] path must exist. Without
    /// either, [`DEFAULT_CONFIG_NAME`] in the working directory is read when
    /// present and defaults apply otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            return Ok(Self::default());
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.xml.validate()?;
        self.limits.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Returns the XML writer options.
    #[must_use]
    pub fn xml_options(&self) -> XmlOptions {
        XmlOptions {
            indent_width: self.xml.indent_width,
            line_ending: self.xml.line_ending.into(),
            declaration_version: self.xml.declaration_version.clone(),
        }
    }

    /// Returns the JSON writer options.
    #[must_use]
    pub const fn json_options(&self) -> JsonOptions {
        JsonOptions {
            pretty: self.json.pretty,
        }
    }

    /// Returns the reader limits.
    #[must_use]
    pub const fn read_limits(&self) -> ReadLimits {
        ReadLimits {
            max_input_bytes: self.limits.max_input_bytes,
            max_depth: self.limits.max_depth,
        }
    }
}

/// XML output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct XmlConfig {
    /// Spaces per nesting level.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// Line separator of the indented form.
    #[serde(default)]
    pub line_ending: LineEndingConfig,
    /// Version written in the XML declaration.
    #[serde(default = "default_declaration_version")]
    pub declaration_version: String,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            line_ending: LineEndingConfig::Lf,
            declaration_version: default_declaration_version(),
        }
    }
}

impl XmlConfig {
    /// Validates XML output settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when XML settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indent_width == 0 || self.indent_width > MAX_INDENT_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "xml.indent_width must be between 1 and {MAX_INDENT_WIDTH}"
            )));
        }
        let version = self.declaration_version.trim();
        if version.is_empty() {
            return Err(ConfigError::Invalid("xml.declaration_version must be set".to_string()));
        }
        if version != self.declaration_version {
            return Err(ConfigError::Invalid(
                "xml.declaration_version must be trimmed".to_string(),
            ));
        }
        if version.len() > MAX_DECLARATION_VERSION_LENGTH
            || !version.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        {
            return Err(ConfigError::Invalid(
                "xml.declaration_version must be a dotted version number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Line separator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineEndingConfig {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl From<LineEndingConfig> for LineEnding {
    fn from(value: LineEndingConfig) -> Self {
        match value {
            LineEndingConfig::Lf => Self::Lf,
            LineEndingConfig::Crlf => Self::CrLf,
        }
    }
}

/// JSON output configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JsonConfig {
    /// Pretty-print instead of compact output.
    #[serde(default)]
    pub pretty: bool,
}

/// Reader limits configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum accepted input size in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Maximum accepted nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_depth: default_max_depth(),
        }
    }
}

impl LimitsConfig {
    /// Validates reader limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_input_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Event log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// Events are discarded.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
}

/// Event logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Destination of event records.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path, required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl LoggingConfig {
    /// Validates logging settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink lacks a usable path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path_string("logging.path", path),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default indent width.
const fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

/// Default declaration version.
fn default_declaration_version() -> String {
    DEFAULT_DECLARATION_VERSION.to_string()
}

/// Default maximum input size.
const fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

/// Default maximum nesting depth.
const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI, environment or the working directory.
///
/// Returns `None` when no path was requested and the default file is absent.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
