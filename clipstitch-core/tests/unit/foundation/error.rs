use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StitchError::bad_arguments("x")
            .to_string()
            .contains("bad arguments:")
    );
    assert!(
        StitchError::no_playable("x")
            .to_string()
            .contains("no playable video track:")
    );
    assert!(
        StitchError::sealed("x")
            .to_string()
            .contains("timeline already sealed:")
    );
    assert!(
        StitchError::export_failed("x")
            .to_string()
            .contains("export failed:")
    );
    assert!(
        StitchError::segment_insert(3, "why")
            .to_string()
            .contains("clip 3")
    );
}

#[test]
fn codes_are_stable() {
    assert_eq!(StitchError::bad_arguments("x").code(), "BAD_ARGS");
    assert_eq!(
        StitchError::FileNotFound {
            path: std::path::PathBuf::from("a.mp4")
        }
        .code(),
        "FILE_NOT_FOUND"
    );
    assert_eq!(StitchError::unsupported("x").code(), "UNSUPPORTED");
    assert_eq!(StitchError::no_playable("x").code(), "NO_VIDEO_TRACK");
    assert_eq!(
        StitchError::DegenerateClipGeometry { clip_index: 0 }.code(),
        "DEGENERATE_GEOMETRY"
    );
    assert_eq!(
        StitchError::segment_insert(0, "x").code(),
        "VIDEO_INSERT_ERROR"
    );
    assert_eq!(
        StitchError::audio_insert(0, "x").code(),
        "AUDIO_INSERT_ERROR"
    );
    assert_eq!(StitchError::sealed("x").code(), "TIMELINE_SEALED");
    assert_eq!(StitchError::export_failed("x").code(), "EXPORT_FAILED");
    assert_eq!(StitchError::ExportUnknown.code(), "EXPORT_UNKNOWN");
}

#[test]
fn audio_insert_is_the_only_nonfatal_kind() {
    assert!(!StitchError::audio_insert(1, "x").is_fatal());
    assert!(StitchError::segment_insert(1, "x").is_fatal());
    assert!(StitchError::bad_arguments("x").is_fatal());
    assert!(StitchError::ExportUnknown.is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StitchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.code(), "INTERNAL");
}
