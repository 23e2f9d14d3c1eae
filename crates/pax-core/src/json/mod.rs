// crates/pax-core/src/json/mod.rs
// ============================================================================
// Module: JSON Codec
// Description: Self-describing JSON rendering and parsing for node trees.
// Purpose: Group generator, reader, options, reserved keys and errors.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Nodes render as objects carrying reserved keys:
//!
//! ```text
//! {"__tag__": "root",
//!  "__value__": "text",
//!  "__attributes__": [{"name": "id", "value": 1}],
//!  "__children__": {"item": [{"__tag__": "item"}, {"__tag__": "item"}]}}
//! ```
//!
//! The reader accepts that form and arbitrary JSON; see [`JsonReader`].

// ============================================================================
// SECTION: Modules
// ============================================================================

mod generator;
mod reader;

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use generator::to_json;
pub use generator::to_json_value;
pub use reader::JsonReader;
pub use reader::parse_json;

// ============================================================================
// SECTION: Reserved Keys
// ============================================================================

/// Key holding the node tag.
pub const TAG_KEY: &str = "__tag__";
/// Key holding the node value.
pub const VALUE_KEY: &str = "__value__";
/// Key holding the attribute list.
pub const ATTRIBUTES_KEY: &str = "__attributes__";
/// Key holding the grouped children.
pub const CHILDREN_KEY: &str = "__children__";
/// Key of an attribute entry's name.
pub const ATTRIBUTE_NAME_KEY: &str = "name";
/// Key of an attribute entry's value.
pub const ATTRIBUTE_VALUE_KEY: &str = "value";

/// Maximum tree depth the generator encodes.
///
/// Each tree level costs up to three JSON nesting levels, so the deepest
/// output stays well inside the default read limits.
pub const MAX_GENERATE_DEPTH: usize = 256;

/// JSON nesting levels one tree level may occupy: the node object, its
/// children object and a same-tag group array.
pub(crate) const JSON_LEVELS_PER_NODE: usize = 3;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Formatting options for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Pretty-print with two-space indentation instead of compact output.
    pub pretty: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while generating or reading JSON.
///
/// # Invariants
/// - `line` and `column` are 1-based, as reported by `serde_json`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    /// Input was empty or whitespace only.
    #[error("json input is empty")]
    EmptyInput,
    /// Input exceeded the configured size limit.
    #[error("json input exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Observed input size in bytes.
        actual_bytes: usize,
    },
    /// Input was not valid JSON.
    #[error("json syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// Line of the error.
        line: usize,
        /// Column of the error.
        column: usize,
        /// Parser message.
        message: String,
    },
    /// Structure was nested deeper than allowed.
    #[error("json nesting exceeds depth {max_depth}")]
    NestingTooDeep {
        /// Maximum allowed depth.
        max_depth: usize,
    },
    /// Serializing the generated value failed.
    #[error("json serialization failed: {0}")]
    Serialize(String),
    /// Reading the input failed.
    #[error("json io error: {0}")]
    Io(String),
}
