//! Common types and utilities for the tsu script analysis service.
//!
//! This crate provides foundational types used across all tsu crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, message chains) and the
//!   single-line formatter used on the wire
//! - Position/line-map types for converting byte offsets to line/column
//! - Path helpers shared by the registry, the program builder, and the protocol
//! - Centralized recursion limits

// Diagnostics and the wire formatter
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessageChain, diagnostic_codes,
    flatten_message_text, format_diagnostic, format_message,
};

// Centralized limits and thresholds
pub mod limits;

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Path normalization and classification
pub mod paths;
