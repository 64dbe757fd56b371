//! Clipstitch is a cross-clip video concatenation engine.
//!
//! It merges N source clips into a single MP4: each clip's display geometry
//! is probed with `ffprobe`, every clip is uniformly scaled and centered onto
//! a shared canvas sized to the largest display bounds, segments are laid
//! back-to-back on an exact rational timeline, and the sealed timeline is
//! encoded in one pass through the system `ffmpeg` binary.
//!
//! # Pipeline overview
//!
//! 1. **Probe**: `ffprobe` JSON -> [`ClipProbe`] (natural size, rotation
//!    metadata, exact duration, audio presence)
//! 2. **Resolve**: rotation affine + display bounds per clip -> shared
//!    [`Canvas`] (componentwise max)
//! 3. **Place**: pure fit-inside scale + centering translate ([`Placement`])
//! 4. **Build**: contiguous segments at an exact [`MediaTime`] cursor ->
//!    sealed [`Timeline`]
//! 5. **Export**: one `ffmpeg` scale/pad/concat pass with single-shot
//!    completion and cooperative cancellation
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Exact timeline arithmetic**: segment starts and the total duration
//!   are rational sums; no floating-point drift accumulates across appends.
//! - **All-or-nothing merges**: any fatal per-clip failure aborts the run;
//!   only per-clip audio trouble degrades (to a silent segment).
//! - **No partial outputs**: encoding targets a temporary sibling path that
//!   is renamed over the output only on success.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod export;
mod foundation;
mod geometry;
mod merge;
mod probe;
mod timeline;

pub use export::graph::{encode_dims, export_args, filter_graph};
pub use export::session::{
    CancelFlag, ExportHandle, begin_export, ensure_parent_dir, export_blocking,
};
pub use foundation::core::{Affine, Canvas, Fps, MediaTime, Point, Rect, Size, Vec2};
pub use foundation::error::{StitchError, StitchResult};
pub use geometry::placement::{Placement, plan_placement};
pub use geometry::resolver::{
    ClipGeometry, ClipResolution, ResolvedClips, aggregate_canvas, display_size,
    geometry_from_probe, resolve_clips, rotation_affine,
};
pub use merge::controller::{MergeOptions, is_merge_supported, merge_videos, merge_videos_with};
pub use probe::ffprobe::{
    AudioProbe, ClipProbe, MIX_SAMPLE_RATE, VideoStreamInfo, parse_probe_output, probe_clip,
};
pub use timeline::builder::{
    SegmentAudio, Timeline, TimelineBuilder, TimelineSegment, TimelineState,
};
