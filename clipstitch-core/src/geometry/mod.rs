//! Display geometry: rotation handling, canvas aggregation, fit placement.

/// Pure fit-inside placement planning.
pub mod placement;
/// Per-clip display geometry and shared canvas resolution.
pub mod resolver;
