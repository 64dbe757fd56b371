//! Shared foundation types: exact rational time, frame rate, canvas, errors.

/// Core value types (time, frame rate, canvas, re-exported kurbo geometry).
pub mod core;
/// Engine-wide error taxonomy and result alias.
pub mod error;
