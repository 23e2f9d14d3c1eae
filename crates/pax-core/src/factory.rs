// crates/pax-core/src/factory.rs
// ============================================================================
// Module: Node Factories
// Description: Pluggable construction of nodes created by the readers.
// Purpose: Let callers decorate or pre-populate nodes produced for given tags.
// Dependencies: crate::document
// ============================================================================

//! ## Overview
//! Readers never construct nodes directly; they ask a [`NodeFactory`] for a
//! single-node [`Document`] and attach it to the tree under construction.
//! Implementations may add attributes or children to the produced node.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::Document;

// ============================================================================
// SECTION: Factory Trait
// ============================================================================

/// Produces the nodes a reader inserts into a tree.
pub trait NodeFactory: Send + Sync {
    /// Produces a node tagged `tag`.
    fn produce(&self, tag: &str) -> Document {
        Document::new(tag)
    }

    /// Produces a node tagged `tag` holding `value`.
    fn produce_with_value(&self, tag: &str, value: &str) -> Document {
        let mut document = self.produce(tag);
        document.root_mut().set_value(value);
        document
    }
}

/// Factory producing plain nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl NodeFactory for DefaultFactory {}

/// Shared default factory used when no factory is configured.
pub(crate) static DEFAULT_FACTORY: DefaultFactory = DefaultFactory;
