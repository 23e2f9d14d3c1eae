// crates/pax-core/src/search.rs
// ============================================================================
// Module: Path Search
// Description: Slash-separated path resolution over node trees.
// Purpose: Locate nodes by tag paths such as `/root/child1/child4`.
// Dependencies: crate::document
// ============================================================================

//! ## Overview
//! Absolute paths (`/a/b`) start at the document root; relative paths (`./b`)
//! start at the given node. The first segment names the start node itself and
//! every later segment selects a child by key. Resolution fails on the first
//! segment that does not match.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::NodeRef;

// ============================================================================
// SECTION: Search
// ============================================================================

/// Resolves `path` from `start`.
///
/// Returns `None` for paths not starting with `/` or `./`, for paths without
/// segments and for any segment that does not match.
#[must_use]
pub fn search<'a>(start: NodeRef<'a>, path: &str) -> Option<NodeRef<'a>> {
    if path.starts_with("./") {
        let segments = split_segments(path.trim_start_matches('.'));
        return walk(start, &segments);
    }
    if !path.starts_with('/') {
        return None;
    }
    let segments = split_segments(path);
    let (first, rest) = segments.split_first()?;
    let root = start.document().root_node();
    if root.tag() != Some(*first) {
        return None;
    }
    walk(root, rest)
}

/// Follows child keys from `from`.
fn walk<'a>(from: NodeRef<'a>, segments: &[&str]) -> Option<NodeRef<'a>> {
    segments
        .iter()
        .try_fold(from, |current, segment| current.children().get(segment))
}

/// Splits `path` on `/`, dropping empty segments.
fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}
