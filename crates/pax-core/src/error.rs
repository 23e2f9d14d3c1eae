// crates/pax-core/src/error.rs
// ============================================================================
// Module: PAX Errors
// Description: Aggregate error over the codec and file modules.
// Purpose: Give callers one error type when they mix formats.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Each module owns its error enum; [`PaxError`] wraps them for callers that
//! handle several formats at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::io::IoError;
use crate::json::JsonError;
use crate::xml::XmlError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Any error raised by `pax-core`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaxError {
    /// XML reading failed.
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// JSON generation or reading failed.
    #[error(transparent)]
    Json(#[from] JsonError),
    /// Writing a file failed.
    #[error(transparent)]
    Io(#[from] IoError),
}
