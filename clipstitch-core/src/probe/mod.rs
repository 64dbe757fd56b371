//! Source clip inspection via the system `ffprobe` binary.

/// ffprobe subprocess runner and JSON document parser.
pub mod ffprobe;
