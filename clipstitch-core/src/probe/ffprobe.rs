use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::core::MediaTime;
use crate::foundation::error::{StitchError, StitchResult};

/// Audio mixdown sample rate used for exported audio.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Container metadata for one source clip.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipProbe {
    /// The probed path.
    pub source_path: PathBuf,
    /// First usable video stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// Audio stream classification.
    pub audio: AudioProbe,
}

/// Metadata of the clip's primary video stream.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VideoStreamInfo {
    /// Stored (pre-rotation) width in pixels.
    pub width: u32,
    /// Stored (pre-rotation) height in pixels.
    pub height: u32,
    /// Rotation from container metadata, in degrees. 0 when absent.
    pub rotation_degrees: f64,
    /// Exact stream duration.
    pub duration: MediaTime,
}

/// What the probe saw of the clip's audio.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AudioProbe {
    /// A decodable audio stream exists.
    Present {
        /// Channel count.
        channels: u16,
        /// Sample rate in Hz.
        sample_rate: u32,
    },
    /// The clip has no audio stream at all.
    Missing,
    /// An audio stream is listed but its parameters are unusable.
    Unreadable(String),
}

impl AudioProbe {
    /// True when a decodable audio stream exists.
    pub fn is_present(&self) -> bool {
        matches!(self, AudioProbe::Present { .. })
    }
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    time_base: Option<String>,
    duration_ts: Option<i64>,
    duration: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    side_data_type: Option<String>,
    rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe one clip through `ffprobe`.
///
/// The subprocess is the only handle on the file and ends inside this call;
/// nothing stays open between probing and export.
pub fn probe_clip(source_path: &Path) -> StitchResult<ClipProbe> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| StitchError::Other(anyhow::anyhow!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(StitchError::no_playable(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_output(source_path, &out.stdout)
}

/// Parse a raw ffprobe JSON document into a [`ClipProbe`].
///
/// Split out from [`probe_clip`] so the parse rules are testable without the
/// binary on PATH.
pub fn parse_probe_output(source_path: &Path, bytes: &[u8]) -> StitchResult<ClipProbe> {
    let parsed: ProbeOut = serde_json::from_slice(bytes).map_err(|e| {
        StitchError::no_playable(format!(
            "ffprobe output for '{}' did not parse: {e}",
            source_path.display()
        ))
    })?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| video_stream_info(s, parsed.format.as_ref()));
    if video.is_none() {
        tracing::debug!(source = %source_path.display(), "No usable video stream in probe output");
    }

    Ok(ClipProbe {
        source_path: source_path.to_path_buf(),
        video,
        audio: classify_audio(&parsed.streams),
    })
}

fn video_stream_info(stream: &ProbeStream, format: Option<&ProbeFormat>) -> Option<VideoStreamInfo> {
    let width = stream.width.filter(|w| *w > 0)?;
    let height = stream.height.filter(|h| *h > 0)?;
    let duration = stream_duration(stream, format)?;
    Some(VideoStreamInfo {
        width,
        height,
        rotation_degrees: stream_rotation_degrees(stream),
        duration,
    })
}

/// Duration resolution chain, most exact form first: integer ticks against
/// the stream time base, then the stream's decimal field, then the
/// container-level decimal field.
fn stream_duration(stream: &ProbeStream, format: Option<&ProbeFormat>) -> Option<MediaTime> {
    if let (Some(ticks), Some(tb)) = (stream.duration_ts, stream.time_base.as_deref()) {
        if let Some((num, den)) = parse_time_base(tb) {
            if let Some(value) = ticks.checked_mul(i64::from(num)) {
                return Some(MediaTime {
                    value,
                    timescale: den,
                });
            }
        }
    }
    if let Some(text) = stream.duration.as_deref() {
        if let Some(t) = MediaTime::from_decimal_seconds(text) {
            return Some(t);
        }
    }
    format
        .and_then(|f| f.duration.as_deref())
        .and_then(MediaTime::from_decimal_seconds)
}

fn parse_time_base(text: &str) -> Option<(u32, u32)> {
    let (num, den) = text.split_once('/')?;
    let num: u32 = num.trim().parse().ok()?;
    let den: u32 = den.trim().parse().ok()?;
    if num == 0 || den == 0 {
        return None;
    }
    Some((num, den))
}

/// Rotation in degrees: Display Matrix side data wins, the legacy `rotate`
/// tag is the fallback.
fn stream_rotation_degrees(stream: &ProbeStream) -> f64 {
    for side_data in &stream.side_data_list {
        if side_data.side_data_type.as_deref() == Some("Display Matrix") {
            if let Some(rotation) = side_data.rotation {
                return rotation;
            }
        }
    }
    if let Some(tags) = &stream.tags {
        if let Some(rotate) = &tags.rotate {
            if let Ok(value) = rotate.trim().parse::<f64>() {
                return value;
            }
        }
    }
    0.0
}

fn classify_audio(streams: &[ProbeStream]) -> AudioProbe {
    let Some(audio) = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
    else {
        return AudioProbe::Missing;
    };
    let sample_rate = audio
        .sample_rate
        .as_deref()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|sr| *sr > 0);
    let channels = audio.channels.filter(|ch| *ch > 0);
    match (sample_rate, channels) {
        (Some(sample_rate), Some(channels)) => AudioProbe::Present {
            channels,
            sample_rate,
        },
        _ => AudioProbe::Unreadable(
            "audio stream is missing a usable sample rate or channel count".to_string(),
        ),
    }
}

// probe_clip shells out and is covered by the integration tests; the parse
// rules below it are unit tested against captured ffprobe documents.
#[cfg(test)]
#[path = "../../tests/unit/probe/ffprobe.rs"]
mod tests;
