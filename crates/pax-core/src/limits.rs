// crates/pax-core/src/limits.rs
// ============================================================================
// Module: Read Limits
// Description: Size and nesting bounds applied to untrusted input.
// Purpose: Fail closed on oversized or pathologically nested documents.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every reader checks input size before parsing and nesting depth while
//! parsing. Readers over `io::Read` stop consuming input once the byte limit
//! is exceeded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Read;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum input size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;
/// Default maximum element nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Bounds applied by the XML and JSON readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Maximum accepted input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum accepted element nesting depth.
    pub max_depth: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Failure of a bounded read.
#[derive(Debug)]
pub(crate) enum BoundedReadError {
    /// Underlying reader failed.
    Io(io::Error),
    /// Input exceeded the limit; `actual` is a lower bound.
    TooLarge {
        /// Bytes observed before stopping.
        actual: usize,
    },
}

/// Reads at most `limit` bytes from `reader`, failing when more are available.
pub(crate) fn read_bounded<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, BoundedReadError> {
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(cap).read_to_end(&mut bytes).map_err(BoundedReadError::Io)?;
    if bytes.len() > limit {
        return Err(BoundedReadError::TooLarge {
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}
