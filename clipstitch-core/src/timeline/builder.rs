use std::path::PathBuf;

use kurbo::Size;

use crate::foundation::core::{Canvas, Fps, MediaTime};
use crate::foundation::error::{StitchError, StitchResult};
use crate::geometry::placement::Placement;
use crate::geometry::resolver::ClipGeometry;
use crate::probe::ffprobe::AudioProbe;

/// Lifecycle of a timeline under construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineState {
    /// No segment appended yet; no tracks exist.
    Empty,
    /// At least one segment appended; the video track exists.
    Building,
    /// Sealed. Terminal: no further mutation is accepted.
    Sealed,
}

/// How one segment fills the shared audio track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SegmentAudio {
    /// The clip's own audio, truncated to the video duration.
    Mapped,
    /// Silence for the whole segment (clip had no usable audio).
    Silent,
}

/// One clip placed on the timeline.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimelineSegment {
    /// Zero-based position in the input list.
    pub clip_index: usize,
    /// Source file feeding this segment.
    pub source_path: PathBuf,
    /// Exact start on the shared timeline.
    pub start: MediaTime,
    /// Exact segment duration (the clip's video duration).
    pub duration: MediaTime,
    /// The clip's display bounds, pre-fit.
    pub display_size: Size,
    /// Fit-inside placement on the canvas.
    pub placement: Placement,
    /// Audio mapping for this span.
    pub audio: SegmentAudio,
}

/// Builds a [`Timeline`] segment by segment.
///
/// The builder is a runtime state machine: `Empty` until the first segment
/// lands (which is when the video track comes into existence), `Building`
/// while appends are accepted, `Sealed` forever after [`seal`]. Appending a
/// segment whose clip has usable audio lazily brings the audio track into
/// existence; audio trouble never aborts the build, it only degrades the
/// affected span to silence.
///
/// [`seal`]: TimelineBuilder::seal
#[derive(Debug)]
pub struct TimelineBuilder {
    state: TimelineState,
    cursor: MediaTime,
    canvas: Canvas,
    fps: Fps,
    segments: Vec<TimelineSegment>,
    audio_mapped: bool,
    audio_dropped: Vec<usize>,
}

impl TimelineBuilder {
    /// Start an empty timeline over the given canvas and output frame rate.
    pub fn new(canvas: Canvas, fps: Fps) -> StitchResult<Self> {
        if canvas.is_degenerate() {
            return Err(StitchError::no_playable("timeline canvas has zero area"));
        }
        Ok(Self {
            state: TimelineState::Empty,
            cursor: MediaTime::ZERO,
            canvas,
            fps,
            segments: Vec::new(),
            audio_mapped: false,
            audio_dropped: Vec::new(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// The insertion cursor: exactly the sum of appended durations.
    pub fn cursor(&self) -> MediaTime {
        self.cursor
    }

    /// Append one clip at the insertion cursor.
    ///
    /// Video placement is fatal on failure. Audio is not: an unreadable
    /// audio stream logs a warning, records the clip index, and leaves the
    /// segment silent.
    pub fn append(&mut self, clip: &ClipGeometry, placement: Placement) -> StitchResult<()> {
        if self.state == TimelineState::Sealed {
            return Err(StitchError::sealed("cannot append to a sealed timeline"));
        }
        if !clip.duration.is_positive() {
            return Err(StitchError::segment_insert(
                clip.clip_index,
                format!(
                    "clip duration {:.6}s is not positive",
                    clip.duration.as_secs_f64()
                ),
            ));
        }

        let start = self.cursor;
        let end = start.checked_add(clip.duration).ok_or_else(|| {
            StitchError::segment_insert(clip.clip_index, "insertion cursor overflow")
        })?;

        let audio = match &clip.audio {
            AudioProbe::Present { .. } => {
                if !self.audio_mapped {
                    tracing::debug!(clip_index = clip.clip_index, "Audio track opened");
                    self.audio_mapped = true;
                }
                SegmentAudio::Mapped
            }
            AudioProbe::Missing => SegmentAudio::Silent,
            AudioProbe::Unreadable(reason) => {
                let err = StitchError::audio_insert(clip.clip_index, reason.clone());
                tracing::warn!(
                    clip_index = clip.clip_index,
                    error = %err,
                    "Audio skipped for segment; continuing video-only"
                );
                self.audio_dropped.push(clip.clip_index);
                SegmentAudio::Silent
            }
        };

        self.segments.push(TimelineSegment {
            clip_index: clip.clip_index,
            source_path: clip.source_path.clone(),
            start,
            duration: clip.duration,
            display_size: clip.display_size,
            placement,
            audio,
        });
        self.cursor = end;
        if self.state == TimelineState::Empty {
            self.state = TimelineState::Building;
            tracing::debug!("Video track opened");
        }
        Ok(())
    }

    /// Seal the timeline. Terminal: a sealed builder rejects both further
    /// appends and a second seal.
    pub fn seal(&mut self) -> StitchResult<Timeline> {
        match self.state {
            TimelineState::Sealed => Err(StitchError::sealed("timeline was already sealed")),
            TimelineState::Empty => Err(StitchError::no_playable("timeline has no segments")),
            TimelineState::Building => {
                self.state = TimelineState::Sealed;
                tracing::debug!(
                    segments = self.segments.len(),
                    duration_secs = self.cursor.as_secs_f64(),
                    has_audio = self.audio_mapped,
                    "Timeline sealed"
                );
                Ok(Timeline {
                    canvas: self.canvas,
                    fps: self.fps,
                    segments: self.segments.clone(),
                    duration: self.cursor,
                    has_audio: self.audio_mapped,
                    audio_dropped: self.audio_dropped.clone(),
                })
            }
        }
    }
}

/// A sealed, immutable edit ready for export.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Shared output canvas.
    pub canvas: Canvas,
    /// Fixed output frame rate.
    pub fps: Fps,
    /// Contiguous segments in input order.
    pub segments: Vec<TimelineSegment>,
    /// Total duration: exactly the sum of segment durations.
    pub duration: MediaTime,
    /// Whether any segment mapped real audio (the audio track exists).
    pub has_audio: bool,
    /// Clip indices whose audio was dropped as unreadable.
    pub audio_dropped: Vec<usize>,
}

impl Timeline {
    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
