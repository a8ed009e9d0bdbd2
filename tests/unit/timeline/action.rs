use super::*;
use crate::foundation::core::Point;
use crate::layout::graph::NodeKey;

fn edge() -> EdgeLayout {
    EdgeLayout {
        tail: NodeKey::Person(PersonId(1)),
        head: NodeKey::Person(PersonId(2)),
        points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
    }
}

#[test]
fn start_times_accumulate() {
    let tl = Timeline::new(
        vec![
            AnimAction::Appear {
                persons: vec![PersonId(1)],
            },
            AnimAction::DrawLine {
                duration: 0.5,
                edges: vec![EdgeId(0)],
            },
            AnimAction::Pause { duration: 0.25 },
            AnimAction::Pause { duration: 2.0 },
        ],
        vec![edge()],
    )
    .unwrap();
    assert_eq!(tl.starts(), &[0.0, 0.0, 0.5, 0.75]);
    assert_eq!(tl.total_duration(), 2.75);
    assert_eq!(tl.edge(EdgeId(0)), Some(&edge()));
    assert_eq!(tl.edge(EdgeId(1)), None);
}

#[test]
fn empty_or_zero_length_is_rejected() {
    let err = Timeline::new(Vec::new(), Vec::new()).unwrap_err();
    assert!(matches!(err, FamflowError::Timeline(_)));

    let only_appear = vec![AnimAction::Appear {
        persons: vec![PersonId(1)],
    }];
    assert!(Timeline::new(only_appear, Vec::new()).is_err());
}

#[test]
fn bad_durations_are_rejected() {
    assert!(Timeline::new(vec![AnimAction::Pause { duration: -1.0 }], Vec::new()).is_err());
    assert!(Timeline::new(vec![AnimAction::Pause { duration: f64::NAN }], Vec::new()).is_err());
}

#[test]
fn dangling_edge_is_rejected() {
    let err = Timeline::new(
        vec![AnimAction::DrawLine {
            duration: 1.0,
            edges: vec![EdgeId(3)],
        }],
        vec![edge()],
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown edge 3"));
}
