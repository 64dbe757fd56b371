//! The top-level merge operation and the process-wide capability check.

/// Argument validation and pipeline orchestration.
pub mod controller;
