// crates/pax-core/src/xml/generator.rs
// ============================================================================
// Module: XML Generator
// Description: Renders node subtrees as indented or single-line XML.
// Purpose: Produce stable, escaped markup without recursion.
// Dependencies: crate::document, crate::identity
// ============================================================================

//! ## Overview
//! Rendering walks the tree with an explicit stack so arbitrarily deep trees
//! render without exhausting the call stack. Indented output prefixes every
//! line with `depth * indent_width` spaces and ends it with the configured
//! line separator; lined output emits the same markup with neither.
//!
//! Rules per node:
//! - untagged nodes render nothing, including their children;
//! - comment and CDATA nodes without children render their body verbatim;
//! - leaves render `<tag attrs>value</tag>`, `<tag attrs/>` or `<tag />`;
//! - parents render their children between open and close tags and drop their
//!   own value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::NodeRef;
use crate::identity::NodeKind;
use crate::xml::XmlOptions;
use crate::xml::escape_text;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Returns the XML declaration for `options`.
#[must_use]
pub fn declaration(options: &XmlOptions) -> String {
    format!("<?xml version=\"{}\" encoding=\"UTF-8\"?>", options.declaration_version)
}

/// Renders `node` and its subtree as indented XML.
#[must_use]
pub fn to_xml(node: NodeRef<'_>, options: &XmlOptions) -> String {
    Renderer {
        out: String::new(),
        indent_width: options.indent_width,
        newline: options.line_ending.as_str(),
    }
    .render(node)
}

/// Renders `node` and its subtree as XML on a single line.
#[must_use]
pub fn to_xml_lined(node: NodeRef<'_>) -> String {
    Renderer {
        out: String::new(),
        indent_width: 0,
        newline: "",
    }
    .render(node)
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Pending work on the render stack.
enum Step<'a> {
    /// Render a node at the given depth.
    Open(NodeRef<'a>, usize),
    /// Emit the closing tag of a parent at the given depth.
    Close(&'a str, usize),
}

/// Output buffer plus layout settings.
struct Renderer {
    /// Accumulated markup.
    out: String,
    /// Spaces per depth level; zero for lined output.
    indent_width: usize,
    /// Line separator; empty for lined output.
    newline: &'static str,
}

impl Renderer {
    /// Renders the subtree rooted at `node`.
    fn render(mut self, node: NodeRef<'_>) -> String {
        let mut stack = vec![Step::Open(node, 0)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Open(current, depth) => {
                    let Some(tag) = current.tag() else {
                        continue;
                    };
                    if current.has_children() {
                        self.open_parent(current, tag, depth);
                        stack.push(Step::Close(tag, depth));
                        stack.extend(
                            current.children().iter().rev().map(|child| Step::Open(child, depth + 1)),
                        );
                    } else {
                        self.leaf(current, tag, depth);
                    }
                }
                Step::Close(tag, depth) => {
                    self.indent(depth);
                    self.out.push_str("</");
                    self.out.push_str(tag);
                    self.out.push('>');
                    self.out.push_str(self.newline);
                }
            }
        }
        self.out
    }

    /// Writes the indentation for `depth`.
    fn indent(&mut self, depth: usize) {
        let width = depth.saturating_mul(self.indent_width);
        self.out.extend(std::iter::repeat_n(' ', width));
    }

    /// Writes `<tag` plus rendered attributes, without the closing bracket.
    fn start_tag(&mut self, node: NodeRef<'_>, tag: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        if node.has_attributes() {
            self.out.push(' ');
            self.out.push_str(&node.attributes().render());
        }
    }

    /// Writes the opening line of a node with children.
    fn open_parent(&mut self, node: NodeRef<'_>, tag: &str, depth: usize) {
        self.indent(depth);
        self.start_tag(node, tag);
        self.out.push('>');
        self.out.push_str(self.newline);
    }

    /// Writes a node without children.
    fn leaf(&mut self, node: NodeRef<'_>, tag: &str, depth: usize) {
        self.indent(depth);
        match NodeKind::of(tag) {
            NodeKind::Comment => {
                self.out.push_str("<!--");
                self.out.push_str(node.value().unwrap_or(""));
                self.out.push_str("-->");
            }
            NodeKind::Cdata => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(&node.value().unwrap_or("").replace("]]>", "]]]]><![CDATA[>"));
                self.out.push_str("]]>");
            }
            NodeKind::Element => match node.value() {
                Some(value) => {
                    self.start_tag(node, tag);
                    self.out.push('>');
                    self.out.push_str(&escape_text(value));
                    self.out.push_str("</");
                    self.out.push_str(tag);
                    self.out.push('>');
                }
                None if node.has_attributes() => {
                    self.start_tag(node, tag);
                    self.out.push_str("/>");
                }
                None => {
                    self.out.push('<');
                    self.out.push_str(tag);
                    self.out.push_str(" />");
                }
            },
        }
        self.out.push_str(self.newline);
    }
}
