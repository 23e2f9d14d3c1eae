// crates/pax-config/src/lib.rs
// ============================================================================
// Module: PAX Config Library
// Description: Configuration model and validation for PAX tooling.
// Purpose: Single source of truth for pax.toml semantics.
// Dependencies: pax-core, serde, toml
// ============================================================================

//! ## Overview
//! `pax-config` loads `pax.toml`, validates it fail-closed and converts the
//! result into the option types used by `pax-core` readers and writers.
//!
//! Security posture: config inputs are untrusted; loading enforces path and
//! size limits before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
