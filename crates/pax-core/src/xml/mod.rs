// crates/pax-core/src/xml/mod.rs
// ============================================================================
// Module: XML Codec
// Description: XML rendering and parsing for node trees.
// Purpose: Group generator, reader, options and escaping helpers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`to_xml`] and [`to_xml_lined`] render a subtree; [`XmlReader`] parses text
//! back into a [`crate::Document`]. Output formatting is carried by
//! [`XmlOptions`], never by shared state.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod generator;
mod reader;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use generator::declaration;
pub use generator::to_xml;
pub use generator::to_xml_lined;
pub use reader::XmlError;
pub use reader::XmlReader;
pub use reader::parse_xml;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Default number of spaces per indentation level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;
/// Default XML version written in the declaration.
pub const DEFAULT_DECLARATION_VERSION: &str = "1.1";

/// Line separator used by the indented form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Returns the separator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Formatting options for XML output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Line separator.
    pub line_ending: LineEnding,
    /// Version written in the XML declaration.
    pub declaration_version: String,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            line_ending: LineEnding::Lf,
            declaration_version: DEFAULT_DECLARATION_VERSION.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Escaping
// ============================================================================

/// Escapes `&`, `<` and `>` in character data.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

/// Escapes `&`, `<`, `>` and `"` in attribute values.
#[must_use]
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    escape(text, true)
}

/// Replaces markup characters with entity references.
fn escape(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs = |ch: char| matches!(ch, '&' | '<' | '>') || (quotes && ch == '"');
    if !text.chars().any(needs) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::escape_attribute;
    use super::escape_text;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_text("say \"hi\""), "say \"hi\"");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn borrows_clean_text() {
        assert!(matches!(escape_text("plain"), std::borrow::Cow::Borrowed("plain")));
    }
}
