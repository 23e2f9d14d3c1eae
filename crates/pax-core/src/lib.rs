// crates/pax-core/src/lib.rs
// ============================================================================
// Module: PAX Core Library
// Description: Plain old XML node trees with XML and JSON codecs.
// Purpose: Build, search, render, parse and persist tagged node trees.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `pax-core` models plain old XML as trees of tagged nodes. A node has an
//! optional tag, an optional value, ordered attributes and ordered children,
//! both kept in keyed [`Subset`]s. Trees live in a [`Document`] arena and are
//! rendered as XML or self-describing JSON, read back from either form,
//! written to files and searched with slash-separated paths.
//!
//! ```
//! use pax_core::Document;
//!
//! let mut document = Document::new("root");
//! let mut root = document.root_mut();
//! root.attributes_mut().add("version", Some("1"));
//! root.add_child_value("child", "text");
//!
//! assert_eq!(
//!     document.root_node().xml_lined(),
//!     "<root version=\"1\"><child>text</child></root>"
//! );
//! assert!(document.search("/root/child").is_some());
//! ```
//!
//! Security posture: parsed input is untrusted; readers enforce
//! [`ReadLimits`] and never recurse on element nesting.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod error;
pub mod events;
pub mod factory;
pub mod identity;
pub mod io;
pub mod json;
pub mod limits;
pub mod search;
pub mod subset;
pub mod xml;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::Attribute;
pub use document::Attributes;
pub use document::Children;
pub use document::Document;
pub use document::NodeId;
pub use document::NodeMut;
pub use document::NodeRef;
pub use error::PaxError;
pub use events::DocumentFormat;
pub use events::EventSink;
pub use events::LogSink;
pub use events::NoopSink;
pub use events::PaxEvent;
pub use events::RecordingSink;
pub use factory::DefaultFactory;
pub use factory::NodeFactory;
pub use io::FileWriter;
pub use io::IoError;
pub use json::JsonError;
pub use json::JsonOptions;
pub use json::JsonReader;
pub use limits::ReadLimits;
pub use subset::Subset;
pub use xml::LineEnding;
pub use xml::XmlError;
pub use xml::XmlOptions;
pub use xml::XmlReader;
