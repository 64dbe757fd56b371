use super::*;

use std::path::PathBuf;

use kurbo::{Affine, Size};

use crate::foundation::core::Fps;
use crate::geometry::placement::plan_placement;
use crate::geometry::resolver::ClipGeometry;
use crate::probe::ffprobe::AudioProbe;
use crate::timeline::builder::TimelineBuilder;

fn geometry(clip_index: usize, w: f64, h: f64, audio: AudioProbe) -> ClipGeometry {
    ClipGeometry {
        clip_index,
        source_path: PathBuf::from(format!("clip-{clip_index}.mp4")),
        natural_size: Size::new(w, h),
        rotation: Affine::IDENTITY,
        display_size: Size::new(w, h),
        duration: MediaTime::new(5, 2).unwrap(),
        audio,
    }
}

fn timeline(clips: &[ClipGeometry], canvas: Canvas, fps: Fps) -> Timeline {
    let mut b = TimelineBuilder::new(canvas, fps).unwrap();
    for c in clips {
        let p = plan_placement(c.clip_index, c.display_size, canvas, c.rotation).unwrap();
        b.append(c, p).unwrap();
    }
    b.seal().unwrap()
}

fn stereo() -> AudioProbe {
    AudioProbe::Present {
        channels: 2,
        sample_rate: 48_000,
    }
}

#[test]
fn encode_dims_round_odd_axes_up() {
    let even = Canvas {
        width: 1920,
        height: 1080,
    };
    assert_eq!(encode_dims(even), (1920, 1080));

    let odd = Canvas {
        width: 1919,
        height: 1081,
    };
    assert_eq!(encode_dims(odd), (1920, 1082));

    let tilted = Canvas {
        width: 141,
        height: 141,
    };
    assert_eq!(encode_dims(tilted), (142, 142));
}

#[test]
fn graph_letterboxes_each_segment_onto_the_canvas() {
    let canvas = Canvas {
        width: 1920,
        height: 1920,
    };
    let clips = [
        geometry(0, 1920.0, 1080.0, stereo()),
        geometry(1, 1080.0, 1920.0, stereo()),
    ];
    let graph = filter_graph(&timeline(&clips, canvas, Fps::new(30, 1).unwrap()));

    // Landscape centers vertically, portrait horizontally.
    assert!(graph.contains("[0:v]setpts=PTS-STARTPTS,scale=1920:1080:flags=lanczos"));
    assert!(graph.contains("pad=1920:1920:0:420"));
    assert!(graph.contains("[1:v]setpts=PTS-STARTPTS,scale=1080:1920:flags=lanczos"));
    assert!(graph.contains("pad=1920:1920:420:0"));
    assert!(graph.contains("fps=30/1"));
    assert!(graph.contains("format=yuv420p"));
    assert!(graph.ends_with("[v0][a0][v1][a1]concat=n=2:v=1:a=1[vout][aout]"));
}

#[test]
fn mapped_audio_is_trimmed_and_padded_to_the_video_duration() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let clips = [geometry(0, 1280.0, 720.0, stereo())];
    let graph = filter_graph(&timeline(&clips, canvas, Fps::new(30, 1).unwrap()));

    assert!(graph.contains("[0:a]aresample=48000"));
    assert!(graph.contains("atrim=duration=2.500000"));
    assert!(graph.contains("apad=whole_dur=2.500000"));
    assert!(graph.ends_with("[v0][a0]concat=n=1:v=1:a=1[vout][aout]"));
}

#[test]
fn silent_segments_draw_from_anullsrc() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let clips = [
        geometry(0, 1280.0, 720.0, stereo()),
        geometry(1, 1280.0, 720.0, AudioProbe::Missing),
    ];
    let graph = filter_graph(&timeline(&clips, canvas, Fps::new(30, 1).unwrap()));

    assert!(graph.contains("anullsrc=channel_layout=stereo:sample_rate=48000"));
    assert!(graph.contains("[a1]"));
    assert!(graph.ends_with("concat=n=2:v=1:a=1[vout][aout]"));
}

#[test]
fn audioless_timeline_concats_video_only() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let clips = [
        geometry(0, 1280.0, 720.0, AudioProbe::Missing),
        geometry(1, 640.0, 480.0, AudioProbe::Missing),
    ];
    let t = timeline(&clips, canvas, Fps::new(30, 1).unwrap());
    let graph = filter_graph(&t);

    assert!(!graph.contains("[a0]"));
    assert!(!graph.contains("aresample"));
    assert!(graph.ends_with("[v0][v1]concat=n=2:v=1:a=0[vout]"));

    let args = export_args(&t, Path::new("out.mp4"));
    assert!(args.contains(&"-an".to_string()));
    assert!(!args.contains(&"aac".to_string()));
}

#[test]
fn fractional_fits_round_to_integer_rects() {
    let canvas = Canvas {
        width: 1920,
        height: 1080,
    };
    let clips = [geometry(0, 721.0, 405.0, AudioProbe::Missing)];
    let graph = filter_graph(&timeline(&clips, canvas, Fps::new(30, 1).unwrap()));

    // 405 * (1920 / 721) rounds to 1079; the leftover pixel sits below.
    assert!(graph.contains("scale=1920:1079:flags=lanczos"));
    assert!(graph.contains("pad=1920:1080:0:0"));
}

#[test]
fn ntsc_rate_is_emitted_as_a_rational() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let clips = [geometry(0, 1280.0, 720.0, AudioProbe::Missing)];
    let graph = filter_graph(&timeline(&clips, canvas, Fps::new(30000, 1001).unwrap()));
    assert!(graph.contains("fps=30000/1001"));
}

#[test]
fn argv_reads_inputs_in_order_and_ends_with_the_output() {
    let canvas = Canvas {
        width: 1920,
        height: 1920,
    };
    let clips = [
        geometry(0, 1920.0, 1080.0, stereo()),
        geometry(1, 1080.0, 1920.0, stereo()),
    ];
    let t = timeline(&clips, canvas, Fps::new(30, 1).unwrap());
    let args = export_args(&t, Path::new("/tmp/out/final.mp4"));

    assert_eq!(&args[0..3], &["-y", "-loglevel", "error"]);
    let inputs: Vec<&String> = args
        .iter()
        .zip(args.iter().skip(1))
        .filter(|(flag, _)| *flag == "-i")
        .map(|(_, path)| path)
        .collect();
    assert_eq!(inputs, ["clip-0.mp4", "clip-1.mp4"]);

    let map_targets: Vec<&String> = args
        .iter()
        .zip(args.iter().skip(1))
        .filter(|(flag, _)| *flag == "-map")
        .map(|(_, target)| target)
        .collect();
    assert_eq!(map_targets, ["[vout]", "[aout]"]);

    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
    assert!(args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "aac"));
    assert!(
        args.windows(2)
            .any(|w| w[0] == "-movflags" && w[1] == "+faststart")
    );
    assert_eq!(args.last().map(String::as_str), Some("/tmp/out/final.mp4"));
}
