use std::path::PathBuf;

use kurbo::{Affine, Point, Rect, Size};

use crate::foundation::core::{Canvas, MediaTime};
use crate::foundation::error::{StitchError, StitchResult};
use crate::probe::ffprobe::{self, AudioProbe, ClipProbe};

/// Display geometry of one resolved clip.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipGeometry {
    /// Zero-based position in the input list.
    pub clip_index: usize,
    /// Source file.
    pub source_path: PathBuf,
    /// Stored frame size before any rotation.
    pub natural_size: Size,
    /// Base transform from container metadata. Identity when the container
    /// carries no rotation.
    pub rotation: Affine,
    /// Natural bounds run through `rotation`; what a player shows.
    pub display_size: Size,
    /// Exact clip duration.
    pub duration: MediaTime,
    /// Audio stream classification, carried through to the timeline.
    pub audio: AudioProbe,
}

/// One slot per input clip, in input order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ClipResolution {
    /// The clip has a usable video track.
    Resolved(ClipGeometry),
    /// The clip could not be probed or has no usable video track.
    Unreadable {
        /// Why the clip was rejected.
        reason: String,
    },
}

impl ClipResolution {
    /// The resolved geometry, if this slot has one.
    pub fn geometry(&self) -> Option<&ClipGeometry> {
        match self {
            ClipResolution::Resolved(geometry) => Some(geometry),
            ClipResolution::Unreadable { .. } => None,
        }
    }
}

/// All inputs resolved against the shared output canvas.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ResolvedClips {
    /// Per-input resolution slots, input order preserved.
    pub clips: Vec<ClipResolution>,
    /// Componentwise max over resolved display sizes.
    pub canvas: Canvas,
}

impl ResolvedClips {
    /// Iterate the successfully resolved geometries, input order preserved.
    pub fn resolved(&self) -> impl Iterator<Item = &ClipGeometry> {
        self.clips.iter().filter_map(ClipResolution::geometry)
    }
}

/// Rotation metadata as a composable affine map.
///
/// Quarter turns are by far the common case in container metadata; they are
/// built with exact coefficients so downstream bounds stay integral. Any
/// other angle falls back to the trigonometric form.
pub fn rotation_affine(degrees: f64) -> Affine {
    let turns = degrees.rem_euclid(360.0);
    if turns == 0.0 {
        Affine::IDENTITY
    } else if turns == 90.0 {
        Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0])
    } else if turns == 180.0 {
        Affine::new([-1.0, 0.0, 0.0, -1.0, 0.0, 0.0])
    } else if turns == 270.0 {
        Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, 0.0])
    } else {
        Affine::rotate(degrees.to_radians())
    }
}

/// Bounds of the natural size run through the base transform. Width and
/// height are absolute by construction (a bounding box cannot be negative).
pub fn display_size(natural: Size, rotation: Affine) -> Size {
    let bounds = Rect::from_origin_size(Point::ORIGIN, natural);
    rotation.transform_rect_bbox(bounds).size()
}

/// Build geometry for one probed clip. `None` when the probe saw no usable
/// video stream.
pub fn geometry_from_probe(clip_index: usize, probe: &ClipProbe) -> Option<ClipGeometry> {
    let video = probe.video.as_ref()?;
    let natural_size = Size::new(f64::from(video.width), f64::from(video.height));
    let rotation = rotation_affine(video.rotation_degrees);
    Some(ClipGeometry {
        clip_index,
        source_path: probe.source_path.clone(),
        natural_size,
        rotation,
        display_size: display_size(natural_size, rotation),
        duration: video.duration,
        audio: probe.audio.clone(),
    })
}

/// Componentwise max over display sizes, ceiled to whole pixels so no clip
/// is cropped when rotation metadata produces fractional bounds.
pub fn aggregate_canvas<'a>(geometries: impl IntoIterator<Item = &'a ClipGeometry>) -> Canvas {
    let mut width = 0.0f64;
    let mut height = 0.0f64;
    for geometry in geometries {
        width = width.max(geometry.display_size.width);
        height = height.max(geometry.display_size.height);
    }
    Canvas {
        width: ceil_px(width),
        height: ceil_px(height),
    }
}

fn ceil_px(v: f64) -> u32 {
    // Snap near-integers down first so exact quarter-turn bounds that picked
    // up a ulp of noise do not ceil to the next pixel.
    (v - 1e-6).ceil().max(0.0) as u32
}

/// Probe every input and resolve display geometry plus the shared canvas.
///
/// Unreadable clips stay in the result as [`ClipResolution::Unreadable`]
/// slots: they are excluded from canvas aggregation but the caller decides
/// what their failure means.
#[tracing::instrument(skip(paths), fields(clips = paths.len()))]
pub fn resolve_clips(paths: &[PathBuf]) -> StitchResult<ResolvedClips> {
    let mut clips = Vec::with_capacity(paths.len());
    for (clip_index, path) in paths.iter().enumerate() {
        let resolution = match ffprobe::probe_clip(path) {
            Ok(probe) => match geometry_from_probe(clip_index, &probe) {
                Some(geometry) => {
                    tracing::debug!(
                        clip_index,
                        display_width = geometry.display_size.width,
                        display_height = geometry.display_size.height,
                        duration_secs = geometry.duration.as_secs_f64(),
                        "Resolved clip geometry"
                    );
                    ClipResolution::Resolved(geometry)
                }
                None => ClipResolution::Unreadable {
                    reason: format!("no usable video stream in '{}'", path.display()),
                },
            },
            Err(err) => {
                tracing::debug!(clip_index, error = %err, "Clip failed to probe");
                ClipResolution::Unreadable {
                    reason: err.to_string(),
                }
            }
        };
        clips.push(resolution);
    }

    let canvas = aggregate_canvas(clips.iter().filter_map(ClipResolution::geometry));
    if canvas.is_degenerate() {
        return Err(StitchError::no_playable(
            "no input clip provided a playable video track",
        ));
    }
    Ok(ResolvedClips { clips, canvas })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolver.rs"]
mod tests;
