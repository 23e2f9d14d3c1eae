// crates/pax-core/tests/search.rs
// ============================================================================
// Module: Path Search Tests
// Description: Absolute and relative path resolution over the sample tree.
// Purpose: Ensure hits, misses and slash normalization behave predictably.
// Dependencies: pax_core
// ============================================================================
//! ## Overview
//! Integration tests for slash-separated path search.

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

use pax_core::Document;
use support::TestResult;
use support::ensure;
use support::sample_tree;

#[test]
fn absolute_path_hits_nested_node() -> TestResult {
    let document = sample_tree();
    let found = document.search("/root/child1/child4/").ok_or("child4 not found")?;
    ensure(found.tag() == Some("child4"), "should find child4")?;
    ensure(found.attributes().value("is") == Some("active"), "should carry its attribute")
}

#[test]
fn absolute_path_misses_unknown_segment() -> TestResult {
    let document = sample_tree();
    ensure(document.search("/root/child1/child5/").is_none(), "child5 does not exist")
}

#[test]
fn every_segment_must_match() -> TestResult {
    let document = sample_tree();
    ensure(document.search("/root/missing/child4").is_none(), "intermediate miss fails")?;
    ensure(document.search("/other/child1").is_none(), "first segment must be the root")
}

#[test]
fn relative_path_starts_at_the_given_node() -> TestResult {
    let document = sample_tree();
    let root = document.root_node();
    let found = root.search("./child1/child4/").ok_or("relative hit expected")?;
    ensure(found.tag() == Some("child4"), "should find child4")?;
    ensure(root.search("./child1/child5/").is_none(), "relative miss expected")?;
    let child1 = root.children().get("child1").ok_or("child1 missing")?;
    let from_child = child1.search("./child4").ok_or("search from child1 failed")?;
    ensure(from_child.id() == found.id(), "both searches should find the same node")
}

#[test]
fn absolute_path_from_inner_node_starts_at_root() -> TestResult {
    let document = sample_tree();
    let child4 = document.search("/root/child1/child4").ok_or("child4 missing")?;
    let root = child4.search("/root").ok_or("root should be found")?;
    ensure(root.id() == document.root(), "search should walk up to the root")
}

#[test]
fn repeated_slashes_collapse() -> TestResult {
    let document = sample_tree();
    let child4 = document.search("/root/child1/child4").ok_or("child4 missing")?;
    let child1 = child4.search("///root///////child1////").ok_or("child1 expected")?;
    ensure(child1.tag() == Some("child1"), "should resolve child1")
}

#[test]
fn invalid_paths_yield_none() -> TestResult {
    let document = sample_tree();
    let root = document.root_node();
    ensure(root.search("root/child1").is_none(), "paths must be anchored")?;
    ensure(root.search("").is_none(), "empty path fails")?;
    ensure(root.search("/").is_none(), "path without segments fails")?;
    ensure(root.search("../child1").is_none(), "parent-relative paths are not supported")
}

#[test]
fn duplicate_children_are_reached_by_derived_key() -> TestResult {
    let mut document = Document::new("list");
    document.root_mut().add_child_value("entry", "first");
    document.root_mut().add_child_value("entry", "second");
    let second = document.search("/list/entry 1").ok_or("derived key should resolve")?;
    ensure(second.value() == Some("second"), "derived key selects the second entry")
}
