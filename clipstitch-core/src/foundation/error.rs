use std::path::PathBuf;

/// Convenience result type used across the engine.
pub type StitchResult<T> = Result<T, StitchError>;

/// Top-level error taxonomy for merge operations.
///
/// Every variant carries a stable machine-readable code (see
/// [`StitchError::code`]) so embedding layers can dispatch on outcomes
/// without matching display strings.
#[derive(thiserror::Error, Debug)]
pub enum StitchError {
    /// Caller-supplied arguments are unusable (empty clip list, blank output
    /// path, malformed rationals).
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// An input path does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// The missing input path.
        path: PathBuf,
    },

    /// The merge capability is absent from this environment.
    #[error("merge unsupported: {0}")]
    Unsupported(String),

    /// No input produced a playable video track, or the canvas they imply
    /// has zero area.
    #[error("no playable video track: {0}")]
    NoPlayableVideoTrack(String),

    /// A clip's display geometry collapsed to zero area.
    #[error("degenerate geometry for clip {clip_index}")]
    DegenerateClipGeometry {
        /// Zero-based position of the clip in the input list.
        clip_index: usize,
    },

    /// A clip's video segment could not be placed on the timeline. Fatal:
    /// the whole merge aborts.
    #[error("video segment insert failed for clip {clip_index}: {reason}")]
    SegmentInsertFailed {
        /// Zero-based position of the clip in the input list.
        clip_index: usize,
        /// What went wrong for this clip.
        reason: String,
    },

    /// A clip's audio could not be carried over. Non-fatal: the merge
    /// continues with a silent span for that segment.
    #[error("audio insert failed for clip {clip_index}: {reason}")]
    AudioInsertFailed {
        /// Zero-based position of the clip in the input list.
        clip_index: usize,
        /// What went wrong for this clip's audio.
        reason: String,
    },

    /// A mutation was attempted on a sealed timeline.
    #[error("timeline already sealed: {0}")]
    TimelineAlreadySealed(String),

    /// The export pass terminated unsuccessfully (includes cancellation).
    #[error("export failed: {0}")]
    ExportFailed(String),

    /// The export pass ended in a state that is neither success nor a
    /// reportable failure.
    #[error("export ended in an unknown state")]
    ExportUnknown,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StitchError {
    /// Build a [`StitchError::BadArguments`] value.
    pub fn bad_arguments(msg: impl Into<String>) -> Self {
        Self::BadArguments(msg.into())
    }

    /// Build a [`StitchError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`StitchError::NoPlayableVideoTrack`] value.
    pub fn no_playable(msg: impl Into<String>) -> Self {
        Self::NoPlayableVideoTrack(msg.into())
    }

    /// Build a [`StitchError::SegmentInsertFailed`] value.
    pub fn segment_insert(clip_index: usize, reason: impl Into<String>) -> Self {
        Self::SegmentInsertFailed {
            clip_index,
            reason: reason.into(),
        }
    }

    /// Build a [`StitchError::AudioInsertFailed`] value.
    pub fn audio_insert(clip_index: usize, reason: impl Into<String>) -> Self {
        Self::AudioInsertFailed {
            clip_index,
            reason: reason.into(),
        }
    }

    /// Build a [`StitchError::TimelineAlreadySealed`] value.
    pub fn sealed(msg: impl Into<String>) -> Self {
        Self::TimelineAlreadySealed(msg.into())
    }

    /// Build a [`StitchError::ExportFailed`] value.
    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::ExportFailed(msg.into())
    }

    /// Stable machine-readable code for embedding boundaries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadArguments(_) => "BAD_ARGS",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::NoPlayableVideoTrack(_) => "NO_VIDEO_TRACK",
            Self::DegenerateClipGeometry { .. } => "DEGENERATE_GEOMETRY",
            Self::SegmentInsertFailed { .. } => "VIDEO_INSERT_ERROR",
            Self::AudioInsertFailed { .. } => "AUDIO_INSERT_ERROR",
            Self::TimelineAlreadySealed(_) => "TIMELINE_SEALED",
            Self::ExportFailed(_) => "EXPORT_FAILED",
            Self::ExportUnknown => "EXPORT_UNKNOWN",
            Self::Other(_) => "INTERNAL",
        }
    }

    /// Whether the error aborts a merge. Audio insert failures do not; they
    /// degrade the affected segment to silence.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AudioInsertFailed { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
