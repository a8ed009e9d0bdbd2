use super::*;

#[test]
fn fps_ceil_covers_partial_frames() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(1.0), 24);
    assert_eq!(fps.secs_to_frames_ceil(1.01), 25);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
    assert!((fps.frame_time_secs(FrameIndex(12)) - 0.5).abs() < 1e-12);
}

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_covering_rounds_up_to_even() {
    let c = Canvas::covering(101.2, 40.0).unwrap();
    assert_eq!(c, Canvas { width: 102, height: 40 });
    let c = Canvas::covering(0.0, 1.0).unwrap();
    assert_eq!(c, Canvas { width: 2, height: 2 });
    assert!(Canvas::covering(f64::NAN, 1.0).is_err());
}

#[test]
fn rgb_deserializes_from_triple() {
    let c: Rgb8 = serde_json::from_str("[1, 2, 3]").unwrap();
    assert_eq!(c, Rgb8::new(1, 2, 3));
    assert!(serde_json::from_str::<Rgb8>("[1, 2, 300]").is_err());
    assert!(serde_json::from_str::<Rgb8>("[1, 2]").is_err());
}
