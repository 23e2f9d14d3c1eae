// crates/pax-core/src/identity.rs
// ============================================================================
// Module: Reserved Tags
// Description: Reserved tag names for non-element nodes.
// Purpose: Classify nodes as elements, comments or CDATA sections by tag.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Reserved tags start with `#` and mark nodes that do not render as plain
//! elements. Classification is by prefix, so `#comment 2` (a derived key
//! turned tag) is still a comment.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag of comment nodes.
pub const COMMENT: &str = "#comment";
/// Tag of CDATA section nodes.
pub const CDATA: &str = "#cdata-section";
/// Attribute marking nodes read from JSON arrays.
pub const LIST: &str = "#list";

// ============================================================================
// SECTION: Node Kinds
// ============================================================================

/// Rendering class of a node, derived from its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain element.
    Element,
    /// Comment rendered as `<!--...-->`.
    Comment,
    /// CDATA section rendered as `<![CDATA[...]]>`.
    Cdata,
}

impl NodeKind {
    /// Classifies `tag` by its reserved prefix.
    #[must_use]
    pub fn of(tag: &str) -> Self {
        if tag.starts_with(COMMENT) {
            Self::Comment
        } else if tag.starts_with(CDATA) {
            Self::Cdata
        } else {
            Self::Element
        }
    }
}
