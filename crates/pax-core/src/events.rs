// crates/pax-core/src/events.rs
// ============================================================================
// Module: PAX Events
// Description: Structured event records emitted by readers, writers and tools.
// Purpose: Provide logging hooks without tying the library to a backend.
// Dependencies: serde, serde_json, std
// ============================================================================

//! ## Overview
//! Components report what they did as [`PaxEvent`] values handed to an
//! [`EventSink`]. [`NoopSink`] discards them, [`LogSink`] writes one JSON
//! object per line and [`RecordingSink`] keeps them in memory.
//!
//! Sinks never fail the operation that emitted the event. [`LogSink`] counts
//! records it could not write instead.
//!
//! Security posture: events carry counts, offsets and paths, never document
//! content.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Serialize;
use serde_json::json;

// ============================================================================
// SECTION: Event Model
// ============================================================================

/// Serialization format of a document.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// XML text.
    Xml,
    /// Self-describing JSON text.
    Json,
}

impl DocumentFormat {
    /// Returns a stable label for the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

/// Event reported to an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaxEvent {
    /// A document was parsed.
    DocumentParsed {
        /// Source format.
        format: DocumentFormat,
        /// Number of nodes in the parsed tree.
        nodes: usize,
        /// Input size in bytes.
        bytes: usize,
    },
    /// A document was rendered to text.
    DocumentGenerated {
        /// Target format.
        format: DocumentFormat,
        /// Number of nodes rendered.
        nodes: usize,
        /// Output size in bytes.
        bytes: usize,
    },
    /// A document was written to a file.
    DocumentWritten {
        /// Target format.
        format: DocumentFormat,
        /// Destination path.
        path: String,
        /// Bytes written.
        bytes: usize,
    },
    /// A comment outside the root element was dropped while reading XML.
    CommentDropped {
        /// Byte offset of the comment.
        position: usize,
    },
    /// A path search completed.
    SearchResolved {
        /// Searched path.
        path: String,
        /// Whether a node was found.
        found: bool,
    },
}

impl PaxEvent {
    /// Returns a stable label for the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DocumentParsed { .. } => "document_parsed",
            Self::DocumentGenerated { .. } => "document_generated",
            Self::DocumentWritten { .. } => "document_written",
            Self::CommentDropped { .. } => "comment_dropped",
            Self::SearchResolved { .. } => "search_resolved",
        }
    }

    /// Returns the event as a flat JSON record.
    #[must_use]
    pub fn to_record(&self) -> serde_json::Value {
        match self {
            Self::DocumentParsed {
                format,
                nodes,
                bytes,
            }
            | Self::DocumentGenerated {
                format,
                nodes,
                bytes,
            } => json!({
                "event": self.kind(),
                "format": format,
                "nodes": nodes,
                "bytes": bytes,
            }),
            Self::DocumentWritten {
                format,
                path,
                bytes,
            } => json!({
                "event": self.kind(),
                "format": format,
                "path": path,
                "bytes": bytes,
            }),
            Self::CommentDropped {
                position,
            } => json!({
                "event": self.kind(),
                "position": position,
            }),
            Self::SearchResolved {
                path,
                found,
            } => json!({
                "event": self.kind(),
                "path": path,
                "found": found,
            }),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Receiver of [`PaxEvent`] values.
pub trait EventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &PaxEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &PaxEvent) {}
}

/// Shared no-op sink used when no sink is configured.
pub(crate) static NOOP_SINK: NoopSink = NoopSink;

/// Sink writing one JSON record per line.
pub struct LogSink<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
    /// Records that could not be written.
    dropped: AtomicU64,
}

impl<W: Write + Send> LogSink<W> {
    /// Creates a log sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns the number of records that failed to write.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Consumes the sink and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns the poison error when a writer panicked while holding the lock.
    pub fn into_inner(self) -> Result<W, std::sync::PoisonError<W>> {
        self.writer.into_inner()
    }

    /// Writes one record, reporting failures as strings.
    fn write_record(&self, event: &PaxEvent) -> Result<(), String> {
        let record = event.to_record();
        let mut guard =
            self.writer.lock().map_err(|_| "log writer mutex poisoned".to_string())?;
        serde_json::to_writer(&mut *guard, &record).map_err(|err| err.to_string())?;
        guard.write_all(b"\n").map_err(|err| err.to_string())?;
        guard.flush().map_err(|err| err.to_string())?;
        drop(guard);
        Ok(())
    }
}

impl<W: Write + Send> EventSink for LogSink<W> {
    fn record(&self, event: &PaxEvent) {
        if self.write_record(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Sink keeping events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<PaxEvent>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PaxEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &PaxEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn record(&self, event: &PaxEvent) {
        (**self).record(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn record(&self, event: &PaxEvent) {
        (**self).record(event);
    }
}
