use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use crate::export::session;
use crate::foundation::core::Fps;
use crate::foundation::error::{StitchError, StitchResult};
use crate::geometry::placement;
use crate::geometry::resolver::{self, ClipResolution};
use crate::timeline::builder::TimelineBuilder;

/// Knobs for a merge run.
#[derive(Clone, Copy, Debug)]
pub struct MergeOptions {
    /// Output frame rate. Defaults to 30 fps (a 1/30 s frame duration).
    pub fps: Fps,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
        }
    }
}

/// Merge `clip_paths` into a single MP4 at `output_path` with default
/// options. Returns the output path on success.
pub fn merge_videos(clip_paths: &[PathBuf], output_path: &Path) -> StitchResult<PathBuf> {
    merge_videos_with(clip_paths, output_path, MergeOptions::default())
}

/// Merge `clip_paths` into a single MP4 at `output_path`.
///
/// The run is all-or-nothing: arguments are validated before any engine
/// work, every clip must yield a playable video segment, and the output path
/// only ever holds a finished file. The single tolerated degradation is
/// per-clip audio: unreadable audio leaves that segment silent and the merge
/// proceeds.
#[tracing::instrument(skip_all, fields(clips = clip_paths.len(), out = %output_path.display()))]
pub fn merge_videos_with(
    clip_paths: &[PathBuf],
    output_path: &Path,
    options: MergeOptions,
) -> StitchResult<PathBuf> {
    validate_args(clip_paths, output_path)?;
    if !is_merge_supported() {
        return Err(StitchError::unsupported(
            "merging requires ffmpeg and ffprobe on PATH",
        ));
    }

    let resolved = resolver::resolve_clips(clip_paths)?;
    tracing::info!(
        canvas_width = resolved.canvas.width,
        canvas_height = resolved.canvas.height,
        "Resolved output canvas"
    );

    let mut builder = TimelineBuilder::new(resolved.canvas, options.fps)?;
    for (clip_index, resolution) in resolved.clips.iter().enumerate() {
        match resolution {
            ClipResolution::Resolved(clip) => {
                let plan = placement::plan_placement(
                    clip.clip_index,
                    clip.display_size,
                    resolved.canvas,
                    clip.rotation,
                )?;
                builder.append(clip, plan)?;
            }
            // Never silently skip a clip: an unreadable input among playable
            // ones fails the whole merge, pointing at the offender.
            ClipResolution::Unreadable { reason } => {
                return Err(StitchError::segment_insert(clip_index, reason.clone()));
            }
        }
    }
    let timeline = builder.seal()?;
    if !timeline.audio_dropped.is_empty() {
        tracing::warn!(
            clips = ?timeline.audio_dropped,
            "Merging with silent segments for clips whose audio was unreadable"
        );
    }

    session::export_blocking(&timeline, output_path)
}

fn validate_args(clip_paths: &[PathBuf], output_path: &Path) -> StitchResult<()> {
    if clip_paths.is_empty() {
        return Err(StitchError::bad_arguments(
            "at least one input clip is required",
        ));
    }
    if output_path.as_os_str().is_empty() {
        return Err(StitchError::bad_arguments("output path must not be empty"));
    }
    for path in clip_paths {
        if !path.is_file() {
            return Err(StitchError::FileNotFound { path: path.clone() });
        }
    }
    Ok(())
}

fn tool_answers_version(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Whether this process can merge at all: both `ffmpeg` and `ffprobe` must
/// answer `-version`. Resolved once and cached for the life of the process,
/// so callers may treat the answer as immutable.
pub fn is_merge_supported() -> bool {
    static SUPPORTED: OnceLock<bool> = OnceLock::new();
    *SUPPORTED.get_or_init(|| {
        let supported = tool_answers_version("ffmpeg") && tool_answers_version("ffprobe");
        tracing::debug!(supported, "Probed merge capability");
        supported
    })
}

#[cfg(test)]
#[path = "../../tests/unit/merge/controller.rs"]
mod tests;
