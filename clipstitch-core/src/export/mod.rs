//! Export: ffmpeg invocation planning and the asynchronous encode session.

/// Pure construction of the ffmpeg argv and filter graph.
pub mod graph;
/// Worker-thread encode session with single-shot completion and cancellation.
pub mod session;
