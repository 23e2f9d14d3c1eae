// crates/pax-core/tests/proptest_values.rs
// ============================================================================
// Module: Value Property Tests
// Description: Property tests for value rules and escaping.
// Purpose: Ensure arbitrary text survives XML and JSON round trips.
// Dependencies: pax_core, proptest
// ============================================================================
//! ## Overview
//! Property-based tests over arbitrary values and attribute text.

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

use pax_core::Document;
use pax_core::document::is_meaningful_value;
use pax_core::json::parse_json;
use pax_core::xml::parse_xml;
use proptest::prelude::*;

proptest! {
    #[test]
    fn stored_value_follows_value_rules(value in "\\PC{0,24}|[ \\t\\r\\n]{0,6}") {
        let document = Document::with_value("node", &value);
        let stored = document.root_node().value();
        if is_meaningful_value(&value) {
            prop_assert_eq!(stored, Some(value.as_str()));
        } else {
            prop_assert_eq!(stored, None);
        }
    }

    #[test]
    fn xml_round_trip_preserves_text(
        value in "[a-zA-Z0-9<>&\"' ]{1,32}",
        attribute in "[a-zA-Z0-9<>&\"' ]{1,32}",
    ) {
        prop_assume!(is_meaningful_value(&value) && is_meaningful_value(&attribute));
        prop_assume!(value.trim() == value);
        let mut document = Document::with_value("node", &value);
        document.root_mut().attributes_mut().add("attr", Some(&attribute));
        let xml = document.root_node().xml_lined();
        let reread = parse_xml(&xml).unwrap();
        prop_assert_eq!(reread.root_node().value(), Some(value.as_str()));
        prop_assert_eq!(reread.root_node().attributes().value("attr"), Some(attribute.as_str()));
    }

    #[test]
    fn json_round_trip_preserves_text(value in "\\PC{1,32}") {
        prop_assume!(is_meaningful_value(&value));
        let document = Document::with_value("node", &value);
        let json = document.root_node().json().unwrap();
        let reread = parse_json(&json).unwrap();
        prop_assert_eq!(reread.root_node().value(), Some(value.as_str()));
        prop_assert_eq!(reread.root_node().json().unwrap(), json);
    }
}
