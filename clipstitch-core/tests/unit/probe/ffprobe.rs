use super::*;

fn parse(doc: &str) -> ClipProbe {
    parse_probe_output(Path::new("clip.mp4"), doc.as_bytes()).unwrap()
}

#[test]
fn parses_size_duration_and_audio() {
    let doc = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30/1",
                "time_base": "1/15360",
                "duration_ts": 61440,
                "duration": "4.000000"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000",
                "channels": 2,
                "time_base": "1/48000",
                "duration_ts": 192000,
                "duration": "4.000000"
            }
        ],
        "format": { "duration": "4.023000" }
    }"#;

    let probe = parse(doc);
    let video = probe.video.unwrap();
    assert_eq!(video.width, 1920);
    assert_eq!(video.height, 1080);
    assert_eq!(video.rotation_degrees, 0.0);
    // 61440 ticks against 1/15360 is exactly four seconds.
    assert_eq!(video.duration, MediaTime::new(4, 1).unwrap());
    assert_eq!(video.duration.timescale, 15360);
    assert_eq!(
        probe.audio,
        AudioProbe::Present {
            channels: 2,
            sample_rate: 48_000
        }
    );
}

#[test]
fn display_matrix_rotation_wins_over_rotate_tag() {
    let doc = r#"{
        "streams": [
            {
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "time_base": "1/90000",
                "duration_ts": 180000,
                "tags": { "rotate": "180" },
                "side_data_list": [
                    {
                        "side_data_type": "Display Matrix",
                        "displaymatrix": "\n00000000:            0       65536           0\n",
                        "rotation": -90
                    }
                ]
            }
        ]
    }"#;

    let video = parse(doc).video.unwrap();
    assert_eq!(video.rotation_degrees, -90.0);
}

#[test]
fn rotate_tag_is_the_fallback() {
    let doc = r#"{
        "streams": [
            {
                "codec_type": "video",
                "width": 1080,
                "height": 1920,
                "time_base": "1/12800",
                "duration_ts": 32000,
                "tags": { "rotate": "90" }
            }
        ]
    }"#;

    let video = parse(doc).video.unwrap();
    assert_eq!(video.rotation_degrees, 90.0);
    // 32000 / 12800 reduces to 2.5 seconds.
    assert_eq!(video.duration, MediaTime::new(5, 2).unwrap());
}

#[test]
fn clip_without_audio_stream_is_missing() {
    let doc = r#"{
        "streams": [
            {
                "codec_type": "video",
                "width": 640,
                "height": 480,
                "time_base": "1/15360",
                "duration_ts": 30720
            }
        ]
    }"#;

    let probe = parse(doc);
    assert!(probe.video.is_some());
    assert_eq!(probe.audio, AudioProbe::Missing);
    assert!(!probe.audio.is_present());
}

#[test]
fn audio_stream_without_parameters_is_unreadable() {
    // A listed audio stream whose header never decoded: video must still
    // come through so the clip can merge with silence in that span.
    let doc = r#"{
        "streams": [
            {
                "codec_type": "video",
                "width": 1280,
                "height": 720,
                "time_base": "1/15360",
                "duration_ts": 46080
            },
            {
                "codec_type": "audio",
                "channels": 2
            }
        ]
    }"#;

    let probe = parse(doc);
    assert!(probe.video.is_some());
    assert!(matches!(probe.audio, AudioProbe::Unreadable(_)));
    assert!(!probe.audio.is_present());
}

#[test]
fn audio_only_clip_has_no_video_geometry() {
    let doc = r#"{
        "streams": [
            {
                "codec_type": "audio",
                "sample_rate": "44100",
                "channels": 1
            }
        ],
        "format": { "duration": "3.000000" }
    }"#;

    let probe = parse(doc);
    assert!(probe.video.is_none());
    assert_eq!(
        probe.audio,
        AudioProbe::Present {
            channels: 1,
            sample_rate: 44_100
        }
    );
}

#[test]
fn duration_falls_back_to_decimal_then_container() {
    let stream_decimal = r#"{
        "streams": [
            {
                "codec_type": "video",
                "width": 320,
                "height": 240,
                "duration": "2.500000"
            }
        ]
    }"#;
    let video = parse(stream_decimal).video.unwrap();
    assert_eq!(video.duration, MediaTime::new(5, 2).unwrap());

    let container_only = r#"{
        "streams": [
            { "codec_type": "video", "width": 320, "height": 240 }
        ],
        "format": { "duration": "1.250000" }
    }"#;
    let video = parse(container_only).video.unwrap();
    assert_eq!(video.duration, MediaTime::new(5, 4).unwrap());
}

#[test]
fn zero_sized_video_stream_is_unusable() {
    let doc = r#"{
        "streams": [
            {
                "codec_type": "video",
                "width": 0,
                "height": 1080,
                "time_base": "1/15360",
                "duration_ts": 15360
            }
        ]
    }"#;

    assert!(parse(doc).video.is_none());
}

#[test]
fn undecodable_document_is_no_playable_track() {
    let err = parse_probe_output(Path::new("clip.mp4"), b"moov atom not found").unwrap_err();
    assert_eq!(err.code(), "NO_VIDEO_TRACK");
    assert!(err.to_string().contains("clip.mp4"));
}
