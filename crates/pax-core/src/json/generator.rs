// crates/pax-core/src/json/generator.rs
// ============================================================================
// Module: JSON Generator
// Description: Renders node subtrees in the self-describing JSON form.
// Purpose: Build `serde_json` values with typed scalars and grouped children.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Values `true` and `false` become booleans and strict JSON number literals
//! become numbers with their literal text preserved; everything else stays a
//! string. Children are grouped by tag in order of first occurrence: a single
//! child renders as an object, several as an array.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::document::NodeRef;
use crate::json::ATTRIBUTE_NAME_KEY;
use crate::json::ATTRIBUTE_VALUE_KEY;
use crate::json::ATTRIBUTES_KEY;
use crate::json::CHILDREN_KEY;
use crate::json::JsonError;
use crate::json::JsonOptions;
use crate::json::MAX_GENERATE_DEPTH;
use crate::json::TAG_KEY;
use crate::json::VALUE_KEY;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Renders `node` as JSON text.
///
/// # Errors
///
/// Returns [`JsonError::NestingTooDeep`] for subtrees deeper than
/// [`MAX_GENERATE_DEPTH`] and [`JsonError::Serialize`] if encoding fails.
pub fn to_json(node: NodeRef<'_>, options: &JsonOptions) -> Result<String, JsonError> {
    let value = to_json_value(node)?;
    let rendered = if options.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    rendered.map_err(|err| JsonError::Serialize(err.to_string()))
}

/// Builds the JSON value for `node`.
///
/// # Errors
///
/// Returns [`JsonError::NestingTooDeep`] for subtrees deeper than
/// [`MAX_GENERATE_DEPTH`].
pub fn to_json_value(node: NodeRef<'_>) -> Result<Value, JsonError> {
    node_value(node, 1)
}

// ============================================================================
// SECTION: Conversion
// ============================================================================

/// Builds the object for `node` at `depth`.
fn node_value(node: NodeRef<'_>, depth: usize) -> Result<Value, JsonError> {
    if depth > MAX_GENERATE_DEPTH {
        return Err(JsonError::NestingTooDeep {
            max_depth: MAX_GENERATE_DEPTH,
        });
    }
    let Some(tag) = node.tag() else {
        return Ok(Value::Null);
    };
    let mut object = Map::new();
    object.insert(TAG_KEY.to_string(), Value::String(tag.to_string()));
    if let Some(value) = node.value() {
        object.insert(VALUE_KEY.to_string(), scalar(value));
    }
    if node.has_attributes() {
        let attributes = node
            .attributes()
            .iter()
            .map(|attribute| {
                let mut entry = Map::new();
                entry.insert(
                    ATTRIBUTE_NAME_KEY.to_string(),
                    Value::String(attribute.name().to_string()),
                );
                entry.insert(
                    ATTRIBUTE_VALUE_KEY.to_string(),
                    attribute.value().map_or(Value::Null, scalar),
                );
                Value::Object(entry)
            })
            .collect();
        object.insert(ATTRIBUTES_KEY.to_string(), Value::Array(attributes));
    }
    if node.has_children() {
        object.insert(CHILDREN_KEY.to_string(), children_value(node, depth)?);
    }
    Ok(Value::Object(object))
}

/// Groups the children of `node` by tag and renders each group.
fn children_value(node: NodeRef<'_>, depth: usize) -> Result<Value, JsonError> {
    let mut groups: Vec<(&str, Vec<Value>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for child in node.children().iter() {
        let tag = child.tag().unwrap_or("");
        let rendered = node_value(child, depth + 1)?;
        if let Some(group) = positions.get(tag).and_then(|position| groups.get_mut(*position)) {
            group.1.push(rendered);
        } else {
            positions.insert(tag, groups.len());
            groups.push((tag, vec![rendered]));
        }
    }
    let mut object = Map::new();
    for (tag, mut members) in groups {
        let value = if members.len() == 1 {
            members.pop().unwrap_or(Value::Null)
        } else {
            Value::Array(members)
        };
        object.insert(tag.to_string(), value);
    }
    Ok(Value::Object(object))
}

/// Types a stored value as boolean, number or string.
fn scalar(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if is_number_literal(text)
        && let Ok(number) = Number::from_str(text)
    {
        return Value::Number(number);
    }
    Value::String(text.to_string())
}

/// Returns true when `text` matches the JSON number grammar exactly.
fn is_number_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut index = 0;
    if bytes.first() == Some(&b'-') {
        index += 1;
    }
    match bytes.get(index) {
        Some(b'0') => index += 1,
        Some(b'1'..=b'9') => {
            while bytes.get(index).is_some_and(u8::is_ascii_digit) {
                index += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(index) == Some(&b'.') {
        index += 1;
        let start = index;
        while bytes.get(index).is_some_and(u8::is_ascii_digit) {
            index += 1;
        }
        if index == start {
            return false;
        }
    }
    if matches!(bytes.get(index), Some(b'e' | b'E')) {
        index += 1;
        if matches!(bytes.get(index), Some(b'+' | b'-')) {
            index += 1;
        }
        let start = index;
        while bytes.get(index).is_some_and(u8::is_ascii_digit) {
            index += 1;
        }
        if index == start {
            return false;
        }
    }
    index == bytes.len()
}
