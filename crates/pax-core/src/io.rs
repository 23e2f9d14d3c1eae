// crates/pax-core/src/io.rs
// ============================================================================
// Module: File Output
// Description: Writes node subtrees to XML and JSON files.
// Purpose: Apply naming rules and report writes without printing.
// Dependencies: crate::xml, crate::json, crate::events, thiserror
// ============================================================================

//! ## Overview
//! [`FileWriter`] renders a subtree and writes it to disk. XML files start with
//! the declaration line. A path lacking the format's extension (compared
//! case-insensitively) gets it appended; writes into a directory without an
//! explicit name use the root tag or [`DEFAULT_FILE_STEM`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::document::Document;
use crate::document::NodeRef;
use crate::error::PaxError;
use crate::events::DocumentFormat;
use crate::events::EventSink;
use crate::events::NOOP_SINK;
use crate::events::PaxEvent;
use crate::json::JsonError;
use crate::json::JsonOptions;
use crate::json::JsonReader;
use crate::json::to_json;
use crate::limits::ReadLimits;
use crate::xml::XmlError;
use crate::xml::XmlOptions;
use crate::xml::XmlReader;
use crate::xml::declaration;
use crate::xml::to_xml;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extension of XML files.
pub const XML_EXTENSION: &str = ".xml";
/// Extension of JSON files.
pub const JSON_EXTENSION: &str = ".json";
/// File stem used when the node has no tag.
pub const DEFAULT_FILE_STEM: &str = "__file_noname";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while writing files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// Creating or writing the file failed.
    #[error("failed to write {path}: {message}")]
    Write {
        /// Destination path.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Rendering JSON failed.
    #[error(transparent)]
    Json(#[from] JsonError),
}

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Appends `extension` unless `path` already ends with it, ignoring case.
#[must_use]
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let text = path.to_string_lossy();
    if text.to_lowercase().ends_with(extension) {
        return path.to_path_buf();
    }
    let mut raw = path.as_os_str().to_os_string();
    raw.push(extension);
    PathBuf::from(raw)
}

/// Returns the file stem used for `node` when no name is given.
#[must_use]
pub fn default_file_stem<'a>(node: &NodeRef<'a>) -> &'a str {
    node.tag().unwrap_or(DEFAULT_FILE_STEM)
}

/// Infers the document format from the extension of `path`, ignoring case.
#[must_use]
pub fn format_of(path: &Path) -> Option<DocumentFormat> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    match extension.as_str() {
        "xml" => Some(DocumentFormat::Xml),
        "json" => Some(DocumentFormat::Json),
        _ => None,
    }
}

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads an XML file with default limits.
///
/// # Errors
///
/// Returns [`XmlError`] when the file cannot be read or parsed.
pub fn read_xml_file(path: &Path) -> Result<Document, XmlError> {
    XmlReader::new().parse_file(path)
}

/// Reads a JSON file with default limits.
///
/// # Errors
///
/// Returns [`JsonError`] when the file cannot be read or parsed.
pub fn read_json_file(path: &Path) -> Result<Document, JsonError> {
    JsonReader::new().parse_file(path)
}

/// Reads the file at `path` as `format` under `limits`, reporting to `sink`.
///
/// # Errors
///
/// Returns [`PaxError`] wrapping the reader error for `format`.
pub fn read_document(
    path: &Path,
    format: DocumentFormat,
    limits: ReadLimits,
    sink: &dyn EventSink,
) -> Result<Document, PaxError> {
    match format {
        DocumentFormat::Xml => {
            Ok(XmlReader::new().with_limits(limits).with_sink(sink).parse_file(path)?)
        }
        DocumentFormat::Json => {
            Ok(JsonReader::new().with_limits(limits).with_sink(sink).parse_file(path)?)
        }
    }
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Renders and writes subtrees to files.
#[derive(Clone)]
pub struct FileWriter<'a> {
    /// XML formatting.
    xml: XmlOptions,
    /// JSON formatting.
    json: JsonOptions,
    /// Event receiver.
    sink: &'a dyn EventSink,
}

impl Default for FileWriter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl FileWriter<'static> {
    /// Creates a writer with default formatting and a no-op sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            xml: XmlOptions::default(),
            json: JsonOptions::default(),
            sink: &NOOP_SINK,
        }
    }
}

impl<'a> FileWriter<'a> {
    /// Replaces the XML formatting options.
    #[must_use]
    pub fn with_xml_options(mut self, options: XmlOptions) -> Self {
        self.xml = options;
        self
    }

    /// Replaces the JSON formatting options.
    #[must_use]
    pub const fn with_json_options(mut self, options: JsonOptions) -> Self {
        self.json = options;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink<'b>(self, sink: &'b dyn EventSink) -> FileWriter<'b>
    where
        'a: 'b,
    {
        FileWriter {
            xml: self.xml,
            json: self.json,
            sink,
        }
    }

    /// Returns the full XML file content for `node`, declaration included.
    #[must_use]
    pub fn xml_content(&self, node: NodeRef<'_>) -> String {
        let mut content = declaration(&self.xml);
        content.push_str(self.xml.line_ending.as_str());
        content.push_str(&to_xml(node, &self.xml));
        content
    }

    /// Writes `node` as XML to `path`, appending `.xml` when missing.
    ///
    /// Returns the path actually written.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Write`] when the file cannot be written.
    pub fn write_xml(&self, node: NodeRef<'_>, path: &Path) -> Result<PathBuf, IoError> {
        let target = with_extension(path, XML_EXTENSION);
        let content = self.xml_content(node);
        self.write(&target, content.as_bytes(), DocumentFormat::Xml)?;
        Ok(target)
    }

    /// Writes `node` as XML into `directory`, named after its tag.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Write`] when the file cannot be written.
    pub fn write_xml_into(&self, node: NodeRef<'_>, directory: &Path) -> Result<PathBuf, IoError> {
        self.write_xml(node, &directory.join(default_file_stem(&node)))
    }

    /// Writes `node` as JSON to `path`, appending `.json` when missing.
    ///
    /// Returns the path actually written.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Json`] when rendering fails and [`IoError::Write`]
    /// when the file cannot be written.
    pub fn write_json(&self, node: NodeRef<'_>, path: &Path) -> Result<PathBuf, IoError> {
        let target = with_extension(path, JSON_EXTENSION);
        let content = to_json(node, &self.json)?;
        self.write(&target, content.as_bytes(), DocumentFormat::Json)?;
        Ok(target)
    }

    /// Writes `node` as JSON into `directory`, named after its tag.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Json`] when rendering fails and [`IoError::Write`]
    /// when the file cannot be written.
    pub fn write_json_into(
        &self,
        node: NodeRef<'_>,
        directory: &Path,
    ) -> Result<PathBuf, IoError> {
        self.write_json(node, &directory.join(default_file_stem(&node)))
    }

    /// Writes `bytes` to `target` and reports the write.
    fn write(&self, target: &Path, bytes: &[u8], format: DocumentFormat) -> Result<(), IoError> {
        let failed = |err: std::io::Error| IoError::Write {
            path: target.display().to_string(),
            message: err.to_string(),
        };
        let file = File::create(target).map_err(failed)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes).map_err(failed)?;
        writer.flush().map_err(failed)?;
        self.sink.record(&PaxEvent::DocumentWritten {
            format,
            path: target.display().to_string(),
            bytes: bytes.len(),
        });
        Ok(())
    }
}
