use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FramemarkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FramemarkError::timeout("text generation timed out")
            .to_string()
            .contains("text generation timed out")
    );
    assert!(
        FramemarkError::not_initialized("x")
            .to_string()
            .contains("job not initialized:")
    );
}

#[test]
fn codec_preserves_source() {
    let src = image::ImageError::IoError(std::io::Error::other("truncated"));
    let err = FramemarkError::codec("decode layer", src);
    assert!(err.to_string().contains("decode layer"));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("truncated"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FramemarkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_timeouts_report_is_timeout() {
    assert!(FramemarkError::timeout("x").is_timeout());
    assert!(!FramemarkError::validation("x").is_timeout());
}
