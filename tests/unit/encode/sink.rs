use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(24, 1).unwrap(),
    }
}

#[test]
fn captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::solid(4, 2, [1, 2, 3]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &FrameRGBA::solid(4, 2, [4, 5, 6]))
        .unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(cfg()));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
    assert_eq!(&sink.frames()[1].1.data[..4], &[4, 5, 6, 255]);
}

#[test]
fn rejects_out_of_order_and_unstarted_pushes() {
    let mut sink = InMemorySink::new();
    let frame = FrameRGBA::solid(4, 2, [0, 0, 0]);
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());

    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame).is_err());
    assert!(sink.push_frame(FrameIndex(2), &frame).is_err());
}

#[test]
fn rejects_wrong_frame_size() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let err = sink
        .push_frame(FrameIndex(0), &FrameRGBA::solid(2, 2, [0, 0, 0]))
        .unwrap_err();
    assert!(matches!(err, FamflowError::Validation(_)));
}

#[test]
fn begin_resets_previous_capture() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::solid(4, 2, [0, 0, 0]))
        .unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}
