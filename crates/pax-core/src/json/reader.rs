// crates/pax-core/src/json/reader.rs
// ============================================================================
// Module: JSON Reader
// Description: Builds node trees from self-describing or arbitrary JSON.
// Purpose: Read back generator output exactly and map other JSON sensibly.
// Dependencies: serde_json, serde_stacker, crate::document, crate::factory
// ============================================================================

//! ## Overview
//! Mapping rules:
//! - objects become nodes tagged `object`; the reserved keys set tag, value,
//!   attributes and grouped children; any other key becomes a child tagged
//!   with that key;
//! - arrays become nodes tagged `array` with `#list="true"`, holding `item`
//!   children that carry their `index`;
//! - scalars become `string`, `number`, `boolean` or `null` nodes.
//!
//! Numbers keep their literal text. Nesting is bounded by
//! [`ReadLimits::max_depth`] alone: a bracket scan rejects input nested past
//! what that many tree levels can encode, and the parse itself runs on a
//! growable stack with `serde_json`'s fixed recursion limit switched off.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::document::Document;
use crate::events::DocumentFormat;
use crate::events::EventSink;
use crate::events::NOOP_SINK;
use crate::events::PaxEvent;
use crate::factory::DEFAULT_FACTORY;
use crate::factory::NodeFactory;
use crate::identity;
use crate::json::ATTRIBUTE_NAME_KEY;
use crate::json::ATTRIBUTE_VALUE_KEY;
use crate::json::ATTRIBUTES_KEY;
use crate::json::CHILDREN_KEY;
use crate::json::JSON_LEVELS_PER_NODE;
use crate::json::JsonError;
use crate::json::TAG_KEY;
use crate::json::VALUE_KEY;
use crate::limits::BoundedReadError;
use crate::limits::ReadLimits;
use crate::limits::read_bounded;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag of nodes built from objects without `__tag__`.
const OBJECT_TAG: &str = "object";
/// Tag of nodes built from arrays.
const ARRAY_TAG: &str = "array";
/// Tag of array element nodes.
const ITEM_TAG: &str = "item";
/// Attribute carrying an array element's position.
const INDEX_ATTRIBUTE: &str = "index";

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Configurable JSON reader.
#[derive(Clone, Copy)]
pub struct JsonReader<'a> {
    /// Size and depth bounds.
    limits: ReadLimits,
    /// Factory producing every node.
    factory: &'a dyn NodeFactory,
    /// Event receiver.
    sink: &'a dyn EventSink,
}

impl Default for JsonReader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReader<'static> {
    /// Creates a reader with default limits, factory and no-op sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limits: ReadLimits::default(),
            factory: &DEFAULT_FACTORY,
            sink: &NOOP_SINK,
        }
    }
}

impl<'a> JsonReader<'a> {
    /// Replaces the read limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the node factory.
    #[must_use]
    pub fn with_factory<'b>(self, factory: &'b dyn NodeFactory) -> JsonReader<'b>
    where
        'a: 'b,
    {
        JsonReader {
            limits: self.limits,
            factory,
            sink: self.sink,
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink<'b>(self, sink: &'b dyn EventSink) -> JsonReader<'b>
    where
        'a: 'b,
    {
        JsonReader {
            limits: self.limits,
            factory: self.factory,
            sink,
        }
    }

    /// Parses `input` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`] for blank, oversized, malformed or too deeply
    /// nested input.
    pub fn parse_str(&self, input: &str) -> Result<Document, JsonError> {
        if input.len() > self.limits.max_input_bytes {
            return Err(JsonError::InputTooLarge {
                max_bytes: self.limits.max_input_bytes,
                actual_bytes: input.len(),
            });
        }
        if input.trim().is_empty() {
            return Err(JsonError::EmptyInput);
        }
        if nesting_depth(input) > self.limits.max_depth.saturating_mul(JSON_LEVELS_PER_NODE) {
            return Err(JsonError::NestingTooDeep {
                max_depth: self.limits.max_depth,
            });
        }
        let mut deserializer = serde_json::Deserializer::from_str(input);
        deserializer.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
            .map_err(syntax_error)?;
        deserializer.end().map_err(syntax_error)?;
        let document = self.read_value(&value);
        release(value);
        let document = document?;
        self.sink.record(&PaxEvent::DocumentParsed {
            format: DocumentFormat::Json,
            nodes: document.node_count(),
            bytes: input.len(),
        });
        Ok(document)
    }

    /// Reads at most the configured byte limit from `reader` and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::Io`] when reading fails, [`JsonError::Syntax`] for
    /// invalid UTF-8 and any error of [`JsonReader::parse_str`].
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Document, JsonError> {
        let bytes = read_bounded(reader, self.limits.max_input_bytes).map_err(|err| match err {
            BoundedReadError::Io(err) => JsonError::Io(err.to_string()),
            BoundedReadError::TooLarge {
                actual,
            } => JsonError::InputTooLarge {
                max_bytes: self.limits.max_input_bytes,
                actual_bytes: actual,
            },
        })?;
        let text = String::from_utf8(bytes).map_err(|err| JsonError::Syntax {
            line: 1,
            column: err.utf8_error().valid_up_to() + 1,
            message: "input is not valid utf-8".to_string(),
        })?;
        self.parse_str(&text)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::Io`] when the file cannot be opened or read and any
    /// error of [`JsonReader::parse_reader`].
    pub fn parse_file(&self, path: &Path) -> Result<Document, JsonError> {
        let file = File::open(path)
            .map_err(|err| JsonError::Io(format!("{}: {err}", path.display())))?;
        self.parse_reader(file)
    }

    /// Builds a document from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::NestingTooDeep`] when the value nests deeper than
    /// the configured depth.
    pub fn read_value(&self, value: &Value) -> Result<Document, JsonError> {
        self.build(value, 1)
    }

    /// Fails when `depth` exceeds the configured limit.
    fn check_depth(&self, depth: usize) -> Result<(), JsonError> {
        if depth > self.limits.max_depth {
            return Err(JsonError::NestingTooDeep {
                max_depth: self.limits.max_depth,
            });
        }
        Ok(())
    }

    /// Builds the node for any JSON value.
    fn build(&self, value: &Value, depth: usize) -> Result<Document, JsonError> {
        self.check_depth(depth)?;
        Ok(match value {
            Value::Object(map) => self.build_object(map, depth)?,
            Value::Array(items) => self.build_array(items, depth)?,
            Value::String(text) => self.factory.produce_with_value("string", text),
            Value::Number(number) => self.factory.produce_with_value("number", &number.to_string()),
            Value::Bool(flag) => {
                self.factory.produce_with_value("boolean", if *flag { "true" } else { "false" })
            }
            Value::Null => self.factory.produce("null"),
        })
    }

    /// Builds the node for an object, honoring the reserved keys.
    fn build_object(&self, map: &Map<String, Value>, depth: usize) -> Result<Document, JsonError> {
        let tag = map.get(TAG_KEY).and_then(scalar_text);
        let mut document = self.factory.produce(tag.as_deref().unwrap_or(OBJECT_TAG));
        let mut children: Vec<Document> = Vec::new();
        for (key, value) in map {
            match key.as_str() {
                TAG_KEY => {}
                VALUE_KEY => {
                    if let Some(text) = scalar_text(value) {
                        document.root_mut().set_value(&text);
                    }
                }
                ATTRIBUTES_KEY => {
                    let mut root = document.root_mut();
                    for (name, attribute) in attribute_entries(value) {
                        root.attributes_mut().add(&name, attribute.as_deref());
                    }
                }
                CHILDREN_KEY => self.grouped_children(value, depth, &mut children)?,
                _ => {
                    let mut child = self.build(value, depth + 1)?;
                    child.root_mut().set_tag(key);
                    children.push(child);
                }
            }
        }
        let mut root = document.root_mut();
        for child in children {
            root.attach(child);
        }
        Ok(document)
    }

    /// Builds the members of a `__children__` object.
    fn grouped_children(
        &self,
        value: &Value,
        depth: usize,
        children: &mut Vec<Document>,
    ) -> Result<(), JsonError> {
        let Value::Object(groups) = value else {
            return Ok(());
        };
        for (group, members) in groups {
            match members {
                Value::Array(items) => {
                    for item in items {
                        children.push(self.group_member(group, item, depth)?);
                    }
                }
                single => children.push(self.group_member(group, single, depth)?),
            }
        }
        Ok(())
    }

    /// Builds one group member; its own `__tag__` wins over the group key.
    fn group_member(&self, group: &str, value: &Value, depth: usize) -> Result<Document, JsonError> {
        let mut child = self.build(value, depth + 1)?;
        let tagged = matches!(value, Value::Object(map) if map.get(TAG_KEY).and_then(scalar_text).is_some());
        if !tagged {
            child.root_mut().set_tag(group);
        }
        Ok(child)
    }

    /// Builds the node for an array.
    fn build_array(&self, items: &[Value], depth: usize) -> Result<Document, JsonError> {
        let mut document = self.factory.produce(ARRAY_TAG);
        let mut root = document.root_mut();
        root.attributes_mut().add(identity::LIST, Some("true"));
        for (index, item) in items.iter().enumerate() {
            let mut child = self.build(item, depth + 1)?;
            {
                let mut child_root = child.root_mut();
                child_root.set_tag(ITEM_TAG);
                child_root.attributes_mut().add(INDEX_ATTRIBUTE, Some(&index.to_string()));
            }
            root.attach(child);
        }
        Ok(document)
    }
}

/// Parses `input` with the default reader.
///
/// # Errors
///
/// Returns [`JsonError`] when the input is blank or malformed.
pub fn parse_json(input: &str) -> Result<Document, JsonError> {
    JsonReader::new().parse_str(input)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a `serde_json` parse failure onto [`JsonError::Syntax`].
fn syntax_error(err: serde_json::Error) -> JsonError {
    JsonError::Syntax {
        line: err.line(),
        column: err.column(),
        message: err.to_string(),
    }
}

/// Returns the deepest bracket nesting of `input`, ignoring string contents.
fn nesting_depth(input: &str) -> usize {
    let mut depth = 0_usize;
    let mut deepest = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in input.bytes() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Drops `value` one level at a time instead of recursing through it.
fn release(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(entries) => pending.extend(entries.into_iter().map(|(_, item)| item)),
            _ => {}
        }
    }
}

/// Returns the text of a scalar; `null` and containers have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Extracts `(name, value)` pairs from an `__attributes__` array.
fn attribute_entries(value: &Value) -> Vec<(String, Option<String>)> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let Value::Object(entry) = item else {
                return None;
            };
            let name = entry.get(ATTRIBUTE_NAME_KEY).and_then(scalar_text)?;
            let value = entry.get(ATTRIBUTE_VALUE_KEY).and_then(scalar_text);
            Some((name, value))
        })
        .collect()
}
