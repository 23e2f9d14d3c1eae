// crates/pax-core/src/xml/reader.rs
// ============================================================================
// Module: XML Reader
// Description: Hand-written, non-recursive parser for plain old XML.
// Purpose: Turn XML text into node trees with bounded resource use.
// Dependencies: crate::document, crate::events, crate::factory, thiserror
// ============================================================================

//! ## Overview
//! The reader understands elements, attributes, character data, entity and
//! character references, CDATA sections and comments. The XML declaration,
//! processing instructions and DOCTYPE declarations are skipped. Namespaces are
//! not interpreted; prefixed names are kept verbatim as tags.
//!
//! All direct character data of an element, CDATA included, is concatenated
//! and stored as the element value under the value rules. Comments inside the
//! root become `#comment` children; comments outside it are reported as
//! [`PaxEvent::CommentDropped`] and discarded.
//!
//! Security posture: input is untrusted. Size and depth are bounded by
//! [`ReadLimits`], the parser never recurses and every error carries the byte
//! offset where parsing stopped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::document::Document;
use crate::document::NodeId;
use crate::events::DocumentFormat;
use crate::events::EventSink;
use crate::events::NOOP_SINK;
use crate::events::PaxEvent;
use crate::factory::DEFAULT_FACTORY;
use crate::factory::NodeFactory;
use crate::identity;
use crate::limits::BoundedReadError;
use crate::limits::ReadLimits;
use crate::limits::read_bounded;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading XML.
///
/// # Invariants
/// - `position` fields are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// Input was empty or whitespace only.
    #[error("xml input is empty")]
    EmptyInput,
    /// Input exceeded the configured size limit.
    #[error("xml input exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Observed input size in bytes.
        actual_bytes: usize,
    },
    /// Input was not valid UTF-8.
    #[error("xml input is not valid utf-8 at byte {position}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        position: usize,
    },
    /// Elements were nested deeper than allowed.
    #[error("xml nesting exceeds depth {max_depth} at byte {position}")]
    NestingTooDeep {
        /// Maximum allowed depth.
        max_depth: usize,
        /// Offset of the offending start tag.
        position: usize,
    },
    /// No root element was found.
    #[error("xml input has no root element")]
    MissingRoot,
    /// A second top-level element followed the root.
    #[error("second root element <{name}> at byte {position}")]
    SecondRoot {
        /// Name of the extra element.
        name: String,
        /// Offset of its start tag.
        position: usize,
    },
    /// Non-whitespace text appeared outside the root element.
    #[error("text outside the root element at byte {position}")]
    TextOutsideRoot {
        /// Offset of the text.
        position: usize,
    },
    /// Input ended with elements still open.
    #[error("element <{name}> is not closed ({depth} open)")]
    Unclosed {
        /// Innermost open element.
        name: String,
        /// Number of open elements.
        depth: usize,
    },
    /// A closing tag did not match the open element.
    #[error("expected </{expected}> but found </{found}> at byte {position}")]
    MismatchedTag {
        /// Name of the open element.
        expected: String,
        /// Name in the closing tag.
        found: String,
        /// Offset of the closing tag.
        position: usize,
    },
    /// A closing tag appeared with no element open.
    #[error("unexpected closing tag </{name}> at byte {position}")]
    UnexpectedClose {
        /// Name in the closing tag.
        name: String,
        /// Offset of the closing tag.
        position: usize,
    },
    /// An attribute name repeated within one start tag.
    #[error("duplicate attribute {name} at byte {position}")]
    DuplicateAttribute {
        /// Repeated attribute name.
        name: String,
        /// Offset of the repetition.
        position: usize,
    },
    /// An entity reference was not recognized.
    #[error("unknown entity &{name}; at byte {position}")]
    UnknownEntity {
        /// Entity name without `&` and `;`.
        name: String,
        /// Offset of the reference.
        position: usize,
    },
    /// A character reference did not denote a valid character.
    #[error("invalid character reference &{raw}; at byte {position}")]
    InvalidCharacterReference {
        /// Reference body without `&` and `;`.
        raw: String,
        /// Offset of the reference.
        position: usize,
    },
    /// A comment, CDATA section, declaration or tag was not terminated.
    #[error("unterminated {construct} starting at byte {position}")]
    Unterminated {
        /// Construct being read.
        construct: &'static str,
        /// Offset where the construct starts.
        position: usize,
    },
    /// Markup did not follow the expected syntax.
    #[error("malformed xml at byte {position}: expected {expected}")]
    Malformed {
        /// Expectation summary.
        expected: &'static str,
        /// Offset of the offending input.
        position: usize,
    },
    /// Reading the input failed.
    #[error("xml io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Configurable XML reader.
#[derive(Clone, Copy)]
pub struct XmlReader<'a> {
    /// Size and depth bounds.
    limits: ReadLimits,
    /// Factory producing every node.
    factory: &'a dyn NodeFactory,
    /// Event receiver.
    sink: &'a dyn EventSink,
}

impl Default for XmlReader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlReader<'static> {
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

impl<'a> XmlReader<'a> {
    /// Replaces the read limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the node factory.
    #[must_use]
    pub fn with_factory<'b>(self, factory: &'b dyn NodeFactory) -> XmlReader<'b>
    where
        'a: 'b,
    {
        XmlReader {
            limits: self.limits,
            factory,
            sink: self.sink,
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink<'b>(self, sink: &'b dyn EventSink) -> XmlReader<'b>
    where
        'a: 'b,
    {
        XmlReader {
            limits: self.limits,
            factory: self.factory,
            sink,
        }
    }

    /// Parses `input` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] when the input is empty, too large, too deep or not
    /// well-formed.
    pub fn parse_str(&self, input: &str) -> Result<Document, XmlError> {
        if input.len() > self.limits.max_input_bytes {
            return Err(XmlError::InputTooLarge {
                max_bytes: self.limits.max_input_bytes,
                actual_bytes: input.len(),
            });
        }
        let body = input.strip_prefix('\u{feff}').unwrap_or(input);
        if body.trim().is_empty() {
            return Err(XmlError::EmptyInput);
        }
        let document = Parser::new(input, input.len() - body.len(), self).run()?;
        self.sink.record(&PaxEvent::DocumentParsed {
            format: DocumentFormat::Xml,
            nodes: document.node_count(),
            bytes: input.len(),
        });
        Ok(document)
    }

    /// Parses UTF-8 `bytes` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::InvalidUtf8`] for invalid UTF-8 and any error of
    /// [`XmlReader::parse_str`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document, XmlError> {
        if bytes.len() > self.limits.max_input_bytes {
            return Err(XmlError::InputTooLarge {
                max_bytes: self.limits.max_input_bytes,
                actual_bytes: bytes.len(),
            });
        }
        let text = std::str::from_utf8(bytes).map_err(|err| XmlError::InvalidUtf8 {
            position: err.valid_up_to(),
        })?;
        self.parse_str(text)
    }

    /// Reads at most the configured byte limit from `reader` and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Io`] when reading fails and any error of
    /// [`XmlReader::parse_bytes`].
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Document, XmlError> {
        let bytes = read_bounded(reader, self.limits.max_input_bytes).map_err(|err| match err {
            BoundedReadError::Io(err) => XmlError::Io(err.to_string()),
            BoundedReadError::TooLarge {
                actual,
            } => XmlError::InputTooLarge {
                max_bytes: self.limits.max_input_bytes,
                actual_bytes: actual,
            },
        })?;
        self.parse_bytes(&bytes)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Io`] when the file cannot be opened or read and any
    /// error of [`XmlReader::parse_bytes`].
    pub fn parse_file(&self, path: &Path) -> Result<Document, XmlError> {
        let file = File::open(path)
            .map_err(|err| XmlError::Io(format!("{}: {err}", path.display())))?;
        self.parse_reader(file)
    }
}

/// Parses `input` with the default reader.
///
/// # Errors
///
/// Returns [`XmlError`] when the input is not well-formed.
pub fn parse_xml(input: &str) -> Result<Document, XmlError> {
    XmlReader::new().parse_str(input)
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Element whose end tag has not been seen yet.
struct OpenElement {
    /// Node created for the element.
    id: NodeId,
    /// Element name as written.
    name: String,
    /// Concatenated character data.
    text: String,
}

/// Single-use parser state over one input.
struct Parser<'input, 'cfg> {
    /// Input text.
    input: &'input str,
    /// Current byte offset.
    offset: usize,
    /// Reader configuration.
    config: &'cfg XmlReader<'cfg>,
    /// Document under construction; `None` until the root starts.
    document: Option<Document>,
    /// Open elements, innermost last.
    stack: Vec<OpenElement>,
}

impl<'input, 'cfg> Parser<'input, 'cfg> {
    /// Creates a parser over `input` that starts reading at byte `offset`.
    const fn new(input: &'input str, offset: usize, config: &'cfg XmlReader<'cfg>) -> Self {
        Self {
            input,
            offset,
            config,
            document: None,
            stack: Vec::new(),
        }
    }

    /// Returns the unread input.
    fn rest(&self) -> &'input str {
        self.input.get(self.offset..).unwrap_or("")
    }

    /// Returns the input between two offsets.
    fn slice(&self, start: usize, end: usize) -> &'input str {
        self.input.get(start..end).unwrap_or("")
    }

    /// Returns the byte at the current offset.
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.offset).copied()
    }

    /// Advances past ASCII whitespace.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.offset += 1;
        }
    }

    /// Consumes `token` when the input continues with it.
    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.offset += token.len();
            true
        } else {
            false
        }
    }

    /// Advances past the next `terminator`, returning the text before it.
    fn take_until(
        &mut self,
        terminator: &str,
        construct: &'static str,
        start: usize,
    ) -> Result<&'input str, XmlError> {
        let rest = self.rest();
        let Some(found) = rest.find(terminator) else {
            return Err(XmlError::Unterminated {
                construct,
                position: start,
            });
        };
        let body = rest.get(..found).unwrap_or("");
        self.offset += found + terminator.len();
        Ok(body)
    }

    /// Runs the parser to completion.
    fn run(mut self) -> Result<Document, XmlError> {
        while self.offset < self.input.len() {
            let start = self.offset;
            if self.peek() != Some(b'<') {
                self.text(start)?;
            } else if self.eat("<?") {
                self.take_until("?>", "processing instruction", start)?;
            } else if self.eat("<!--") {
                let body = self.take_until("-->", "comment", start)?;
                self.comment(body, start)?;
            } else if self.eat("<![CDATA[") {
                let body = self.take_until("]]>", "cdata section", start)?;
                self.character_data(Cow::Borrowed(body), start)?;
            } else if self.eat("<!DOCTYPE") {
                self.skip_doctype(start)?;
            } else if self.eat("</") {
                self.end_tag(start)?;
            } else if self.rest().starts_with("<!") {
                return Err(XmlError::Malformed {
                    expected: "comment, CDATA section or DOCTYPE",
                    position: start,
                });
            } else {
                self.offset += 1;
                self.start_tag(start)?;
            }
        }
        if let Some(open) = self.stack.last() {
            return Err(XmlError::Unclosed {
                name: open.name.clone(),
                depth: self.stack.len(),
            });
        }
        self.document.ok_or(XmlError::MissingRoot)
    }

    /// Reads character data up to the next `<`.
    fn text(&mut self, start: usize) -> Result<(), XmlError> {
        let rest = self.rest();
        let length = rest.find('<').unwrap_or(rest.len());
        let raw = rest.get(..length).unwrap_or("");
        self.offset += length;
        if self.stack.is_empty() {
            if raw.trim().is_empty() {
                return Ok(());
            }
            return Err(XmlError::TextOutsideRoot {
                position: start,
            });
        }
        let decoded = decode_entities(raw, start)?;
        self.character_data(decoded, start)
    }

    /// Appends decoded character data to the innermost open element.
    fn character_data(&mut self, text: Cow<'_, str>, start: usize) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(open) => {
                open.text.push_str(&text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(XmlError::TextOutsideRoot {
                position: start,
            }),
        }
    }

    /// Stores a comment as a `#comment` child or reports it as dropped.
    fn comment(&mut self, body: &str, start: usize) -> Result<(), XmlError> {
        let Some(parent) = self.stack.last().map(|open| open.id) else {
            self.config.sink.record(&PaxEvent::CommentDropped {
                position: start,
            });
            return Ok(());
        };
        let child = self.config.factory.produce_with_value(identity::COMMENT, body);
        self.attach(parent, child, start)?;
        Ok(())
    }

    /// Skips a DOCTYPE declaration, including an internal subset.
    fn skip_doctype(&mut self, start: usize) -> Result<(), XmlError> {
        let mut in_subset = false;
        while let Some(byte) = self.peek() {
            self.offset += 1;
            match byte {
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Ok(()),
                _ => {}
            }
        }
        Err(XmlError::Unterminated {
            construct: "doctype",
            position: start,
        })
    }

    /// Reads a name made of characters other than whitespace and delimiters.
    fn name(&mut self) -> &'input str {
        let start = self.offset;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace()
                || matches!(byte, b'/' | b'>' | b'<' | b'=' | b'"' | b'\'' | b'&' | b';')
            {
                break;
            }
            self.offset += 1;
        }
        self.slice(start, self.offset)
    }

    /// Reads a start tag after its `<`.
    fn start_tag(&mut self, start: usize) -> Result<(), XmlError> {
        let name = self.name();
        if name.is_empty() {
            return Err(XmlError::Malformed {
                expected: "element name",
                position: self.offset,
            });
        }
        let attributes = self.attributes(start)?;
        let self_closing = if self.eat("/>") {
            true
        } else if self.eat(">") {
            false
        } else {
            return Err(XmlError::Malformed {
                expected: "'>' or '/>'",
                position: self.offset,
            });
        };
        if self.stack.len() >= self.config.limits.max_depth {
            return Err(XmlError::NestingTooDeep {
                max_depth: self.config.limits.max_depth,
                position: start,
            });
        }

        let mut produced = self.config.factory.produce(name);
        {
            let mut root = produced.root_mut();
            for (attribute, value) in &attributes {
                root.attributes_mut().add(attribute, Some(value));
            }
        }
        let id = match self.stack.last().map(|open| open.id) {
            Some(parent) => self.attach(parent, produced, start)?,
            None if self.document.is_some() => {
                return Err(XmlError::SecondRoot {
                    name: name.to_string(),
                    position: start,
                });
            }
            None => {
                let id = produced.root();
                self.document = Some(produced);
                id
            }
        };
        if !self_closing {
            self.stack.push(OpenElement {
                id,
                name: name.to_string(),
                text: String::new(),
            });
        }
        Ok(())
    }

    /// Reads attributes up to the end of a start tag.
    fn attributes(&mut self, start: usize) -> Result<Vec<(&'input str, String)>, XmlError> {
        let mut attributes: Vec<(&'input str, String)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(XmlError::Unterminated {
                        construct: "start tag",
                        position: start,
                    });
                }
                Some(b'>' | b'/') => return Ok(attributes),
                Some(_) => {}
            }
            let name_at = self.offset;
            let name = self.name();
            if name.is_empty() {
                return Err(XmlError::Malformed {
                    expected: "attribute name",
                    position: name_at,
                });
            }
            self.skip_whitespace();
            if !self.eat("=") {
                return Err(XmlError::Malformed {
                    expected: "'=' after attribute name",
                    position: self.offset,
                });
            }
            self.skip_whitespace();
            let quote = match self.peek() {
                Some(quote @ (b'"' | b'\'')) => quote,
                _ => {
                    return Err(XmlError::Malformed {
                        expected: "quoted attribute value",
                        position: self.offset,
                    });
                }
            };
            self.offset += 1;
            let value_at = self.offset;
            let rest = self.rest();
            let Some(length) = rest.bytes().position(|byte| byte == quote) else {
                return Err(XmlError::Unterminated {
                    construct: "attribute value",
                    position: value_at,
                });
            };
            let raw = rest.get(..length).unwrap_or("");
            if let Some(angle) = raw.find('<') {
                return Err(XmlError::Malformed {
                    expected: "attribute value without '<'",
                    position: value_at + angle,
                });
            }
            self.offset += length + 1;
            if attributes.iter().any(|(existing, _)| *existing == name) {
                return Err(XmlError::DuplicateAttribute {
                    name: name.to_string(),
                    position: name_at,
                });
            }
            let value = decode_entities(raw, value_at)?.into_owned();
            attributes.push((name, value));
        }
    }

    /// Reads an end tag after its `</` and finalizes the element.
    fn end_tag(&mut self, start: usize) -> Result<(), XmlError> {
        let name = self.name();
        self.skip_whitespace();
        if !self.eat(">") {
            return Err(XmlError::Malformed {
                expected: "'>' after closing tag name",
                position: self.offset,
            });
        }
        let Some(open) = self.stack.pop() else {
            return Err(XmlError::UnexpectedClose {
                name: name.to_string(),
                position: start,
            });
        };
        if open.name != name {
            return Err(XmlError::MismatchedTag {
                expected: open.name,
                found: name.to_string(),
                position: start,
            });
        }
        if let Some(mut node) = self.document.as_mut().and_then(|doc| doc.node_mut(open.id)) {
            node.set_value(&open.text);
        }
        Ok(())
    }

    /// Attaches `child` under `parent` in the document under construction.
    fn attach(&mut self, parent: NodeId, child: Document, start: usize) -> Result<NodeId, XmlError> {
        self.document
            .as_mut()
            .and_then(|doc| doc.node_mut(parent))
            .map(|mut node| node.attach(child))
            .ok_or(XmlError::Malformed {
                expected: "open parent element",
                position: start,
            })
    }
}

// ============================================================================
// SECTION: Entities
// ============================================================================

/// Longest entity body accepted between `&` and `;`.
const MAX_ENTITY_LENGTH: usize = 16;

/// Decodes predefined entities and character references in `raw`.
fn decode_entities(raw: &str, base: usize) -> Result<Cow<'_, str>, XmlError> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut consumed = 0;
    while let Some(amp) = rest.find('&') {
        out.push_str(rest.get(..amp).unwrap_or(""));
        let position = base + consumed + amp;
        let after = rest.get(amp + 1..).unwrap_or("");
        let Some(semi) = after.find(';').filter(|semi| *semi <= MAX_ENTITY_LENGTH) else {
            return Err(XmlError::Malformed {
                expected: "';' closing the entity reference",
                position,
            });
        };
        let body = after.get(..semi).unwrap_or("");
        out.push(resolve_entity(body, position)?);
        let advance = amp + 1 + semi + 1;
        consumed += advance;
        rest = rest.get(advance..).unwrap_or("");
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

/// Resolves one entity body to its character.
fn resolve_entity(body: &str, position: usize) -> Result<char, XmlError> {
    match body {
        "lt" => return Ok('<'),
        "gt" => return Ok('>'),
        "amp" => return Ok('&'),
        "quot" => return Ok('"'),
        "apos" => return Ok('\''),
        _ => {}
    }
    let Some(reference) = body.strip_prefix('#') else {
        return Err(XmlError::UnknownEntity {
            name: body.to_string(),
            position,
        });
    };
    let code = match reference.strip_prefix('x').or_else(|| reference.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => reference.parse::<u32>().ok(),
    };
    code.and_then(char::from_u32).ok_or_else(|| XmlError::InvalidCharacterReference {
        raw: body.to_string(),
        position,
    })
}
