use super::*;

fn node(cx: f64, cy: f64, w: f64, h: f64) -> NodeGeometry {
    NodeGeometry {
        cx,
        cy,
        width: w,
        height: h,
    }
}

fn p(id: u32) -> NodeKey {
    NodeKey::Person(PersonId(id))
}

fn j(a: u32, b: u32) -> NodeKey {
    NodeKey::Junction(CoupleKey::new(PersonId(a), PersonId(b)))
}

#[test]
fn node_keys_print_and_parse() {
    assert_eq!(p(12).to_string(), "12");
    assert_eq!(j(5, 2).to_string(), "couple_2_5");
    assert_eq!("12".parse::<NodeKey>().unwrap(), p(12));
    assert_eq!("couple_2_5".parse::<NodeKey>().unwrap(), j(2, 5));
    assert_eq!("\"7\"".parse::<NodeKey>().unwrap(), p(7));
    assert!("couple_2".parse::<NodeKey>().is_err());
    assert!("alice".parse::<NodeKey>().is_err());
}

#[test]
fn border_point_uses_dominant_axis() {
    let n = node(100.0, 100.0, 40.0, 20.0);
    assert_eq!(n.border_point_toward(Point::new(100.0, 300.0)), Point::new(100.0, 110.0));
    assert_eq!(n.border_point_toward(Point::new(90.0, -50.0)), Point::new(100.0, 90.0));
    assert_eq!(n.border_point_toward(Point::new(300.0, 120.0)), Point::new(120.0, 100.0));
    assert_eq!(n.border_point_toward(Point::new(0.0, 100.0)), Point::new(80.0, 100.0));
}

fn sample_layout() -> GraphLayout {
    let mut nodes = BTreeMap::new();
    nodes.insert(p(1), node(100.0, 100.0, 80.0, 40.0));
    nodes.insert(p(2), node(300.0, 100.0, 80.0, 40.0));
    nodes.insert(j(1, 2), node(200.0, 100.0, 0.5, 0.5));
    nodes.insert(p(3), node(200.0, 300.0, 80.0, 40.0));
    GraphLayout {
        width: 400.0,
        height: 400.0,
        nodes,
        edges: vec![
            EdgeLayout {
                tail: p(1),
                head: j(1, 2),
                points: vec![Point::new(130.0, 101.0), Point::new(201.0, 99.0)],
            },
            EdgeLayout {
                tail: j(1, 2),
                head: p(3),
                points: vec![
                    Point::new(200.0, 103.0),
                    Point::new(200.0, 180.0),
                    Point::new(199.0, 260.0),
                    Point::new(200.0, 285.0),
                ],
            },
        ],
    }
}

#[test]
fn endpoints_snap_to_box_sides_and_junction_centers() {
    let mut layout = sample_layout();
    layout.fix_edge_endpoints();

    let marriage = &layout.edges[0];
    assert_eq!(marriage.points[0], Point::new(140.0, 100.0));
    assert_eq!(marriage.points[1], Point::new(200.0, 100.0));

    let child = &layout.edges[1];
    assert_eq!(child.points[0], Point::new(200.0, 100.0));
    assert_eq!(child.points[3], Point::new(200.0, 280.0));
    assert_eq!(child.points[1], Point::new(200.0, 180.0));
}

#[test]
fn endpoint_correction_is_idempotent() {
    let mut once = sample_layout();
    once.fix_edge_endpoints();
    let mut twice = once.clone();
    twice.fix_edge_endpoints();
    assert_eq!(once, twice);
}

#[test]
fn two_point_edge_between_boxes_is_stable() {
    let mut nodes = BTreeMap::new();
    nodes.insert(p(1), node(0.0, 0.0, 10.0, 10.0));
    nodes.insert(p(2), node(100.0, 30.0, 10.0, 10.0));
    let mut layout = GraphLayout {
        width: 120.0,
        height: 50.0,
        nodes,
        edges: vec![EdgeLayout {
            tail: p(1),
            head: p(2),
            points: vec![Point::new(0.0, 40.0), Point::new(100.0, -40.0)],
        }],
    };
    layout.fix_edge_endpoints();
    let first = layout.clone();
    assert_eq!(layout.edges[0].points, vec![Point::new(5.0, 0.0), Point::new(95.0, 30.0)]);
    layout.fix_edge_endpoints();
    assert_eq!(layout, first);
}

#[test]
fn unknown_nodes_leave_endpoints_untouched() {
    let mut layout = GraphLayout {
        width: 10.0,
        height: 10.0,
        nodes: BTreeMap::new(),
        edges: vec![EdgeLayout {
            tail: p(1),
            head: p(2),
            points: vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)],
        }],
    };
    layout.fix_edge_endpoints();
    assert_eq!(layout.edges[0].points, vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
}

#[test]
fn width_rescale_keeps_centers_and_re_anchors() {
    let mut layout = sample_layout();
    layout.fix_edge_endpoints();
    layout.scale_node_widths(1.5).unwrap();

    let n1 = layout.person(PersonId(1)).unwrap();
    assert_eq!(n1.cx, 100.0);
    assert_eq!(n1.width, 120.0);
    assert_eq!(layout.node(j(1, 2)).unwrap().width, 0.5);
    assert_eq!(layout.edges[0].points[0], Point::new(160.0, 100.0));

    assert!(layout.scale_node_widths(0.0).is_err());
    assert!(layout.scale_node_widths(f64::NAN).is_err());
}

#[test]
fn edges_between_matches_either_direction() {
    let layout = sample_layout();
    assert_eq!(layout.edges_between(j(1, 2), p(1)).count(), 1);
    assert_eq!(layout.edges_between(p(1), p(3)).count(), 0);
    let rev = layout.edges[0].reversed();
    assert_eq!(rev.tail, j(1, 2));
    assert_eq!(rev.points[0], Point::new(201.0, 99.0));
}
