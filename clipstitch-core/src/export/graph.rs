use std::path::Path;

use crate::foundation::core::{Canvas, MediaTime};
use crate::probe::ffprobe::MIX_SAMPLE_RATE;
use crate::timeline::builder::{SegmentAudio, Timeline, TimelineSegment};

/// Encoder target dimensions: the canvas rounded up to even numbers.
///
/// libx264 yuv420p output needs even dimensions; the model canvas stays the
/// exact componentwise max and only the encode target grows by at most one
/// pixel per axis.
pub fn encode_dims(canvas: Canvas) -> (u32, u32) {
    (
        canvas.width + (canvas.width & 1),
        canvas.height + (canvas.height & 1),
    )
}

fn seconds_arg(t: MediaTime) -> String {
    format!("{:.6}", t.as_secs_f64())
}

/// The planner's fit realized in encoder integer space: scaled size rounded
/// to pixels and clamped to the target, centered with integer offsets.
fn scaled_rect(segment: &TimelineSegment, target_w: u32, target_h: u32) -> (u32, u32, u32, u32) {
    let scaled = segment.placement.scaled_size(segment.display_size);
    let w = (scaled.width.round() as u32).clamp(1, target_w);
    let h = (scaled.height.round() as u32).clamp(1, target_h);
    ((target_w - w) / 2, (target_h - h) / 2, w, h)
}

fn video_chain(input: usize, segment: &TimelineSegment, timeline: &Timeline) -> String {
    let (target_w, target_h) = encode_dims(timeline.canvas);
    let (x, y, w, h) = scaled_rect(segment, target_w, target_h);
    format!(
        "[{input}:v]setpts=PTS-STARTPTS,scale={w}:{h}:flags=lanczos,setsar=1,\
         pad={target_w}:{target_h}:{x}:{y},fps={}/{},format=yuv420p[v{input}]",
        timeline.fps.num, timeline.fps.den
    )
}

fn audio_chain(input: usize, segment: &TimelineSegment) -> String {
    let duration = seconds_arg(segment.duration);
    match segment.audio {
        // atrim cuts audio that outlives the video; apad stretches shorter
        // audio with silence to exactly the video duration.
        SegmentAudio::Mapped => format!(
            "[{input}:a]aresample={MIX_SAMPLE_RATE},\
             aformat=sample_fmts=fltp:channel_layouts=stereo,\
             atrim=duration={duration},asetpts=PTS-STARTPTS,\
             apad=whole_dur={duration}[a{input}]"
        ),
        SegmentAudio::Silent => format!(
            "anullsrc=channel_layout=stereo:sample_rate={MIX_SAMPLE_RATE},\
             atrim=duration={duration},asetpts=PTS-STARTPTS[a{input}]"
        ),
    }
}

/// Build the complete `-filter_complex` graph for a sealed timeline: one
/// letterbox chain per video input, one audio chain per input when the
/// timeline carries audio, and a trailing concat.
pub fn filter_graph(timeline: &Timeline) -> String {
    let mut chains = Vec::with_capacity(timeline.segments.len() * 2 + 1);
    for (input, segment) in timeline.segments.iter().enumerate() {
        chains.push(video_chain(input, segment, timeline));
        if timeline.has_audio {
            chains.push(audio_chain(input, segment));
        }
    }

    let mut tail = String::new();
    for input in 0..timeline.segments.len() {
        tail.push_str(&format!("[v{input}]"));
        if timeline.has_audio {
            tail.push_str(&format!("[a{input}]"));
        }
    }
    tail.push_str(&format!(
        "concat=n={}:v=1:a={}[vout]",
        timeline.segments.len(),
        u8::from(timeline.has_audio)
    ));
    if timeline.has_audio {
        tail.push_str("[aout]");
    }
    chains.push(tail);
    chains.join(";")
}

/// Full ffmpeg argv (without the program name) encoding `timeline` to
/// `out_path` as H.264 + AAC MP4 with faststart.
pub fn export_args(timeline: &Timeline, out_path: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "error".into()];
    for segment in &timeline.segments {
        args.push("-i".into());
        args.push(segment.source_path.display().to_string());
    }
    args.push("-filter_complex".into());
    args.push(filter_graph(timeline));
    args.push("-map".into());
    args.push("[vout]".into());
    if timeline.has_audio {
        args.push("-map".into());
        args.push("[aout]".into());
    } else {
        args.push("-an".into());
    }
    args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p"].map(String::from));
    if timeline.has_audio {
        args.extend(["-c:a", "aac"].map(String::from));
    }
    args.extend(["-movflags", "+faststart"].map(String::from));
    args.push(out_path.display().to_string());
    args
}

#[cfg(test)]
#[path = "../../tests/unit/export/graph.rs"]
mod tests;
