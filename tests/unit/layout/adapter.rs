use super::*;
use crate::family::generation::resolve_generations;
use crate::family::model::{CoupleKey, Person, Sex};
use crate::layout::graph::NodeKey;
use crate::layout::solver::parse_plain;

const PLAIN: &str = "graph 1 3.5 2.25
node 1 0.75 1.875 1.2 0.5 \"A\\n1950-01-01\" filled box black lightblue
node 2 2.75 1.875 1.2 0.5 \"B\\n1952-01-01\" filled box black lightpink
node couple_1_2 1.75 1.875 0.01 0.01 \"\" solid point black lightgrey
node 3 1.75 0.375 1.2 0.5 \"C\\n1980-01-01\" filled box black lightblue
edge 1 couple_1_2 4 1.35 1.875 1.5 1.875 1.6 1.875 1.745 1.875 solid darkred
edge couple_1_2 2 4 1.755 1.875 1.9 1.875 2.0 1.875 2.15 1.875 solid darkred
edge couple_1_2 3 4 1.75 1.87 1.75 1.2 1.75 0.9 1.75 0.63 solid gray30
stop
";

struct FixedSolver(RawLayout);

impl LayoutSolver for FixedSolver {
    fn solve(&self, _: &LayoutRequest, _: &LayoutHints) -> FamflowResult<RawLayout> {
        Ok(self.0.clone())
    }
}

struct BrokenSolver;

impl LayoutSolver for BrokenSolver {
    fn solve(&self, _: &LayoutRequest, _: &LayoutHints) -> FamflowResult<RawLayout> {
        Err(FamflowError::layout("boom"))
    }
}

fn family() -> FamilyGraph {
    let d = chrono::NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
    FamilyGraph::new([
        Person::new(PersonId(1), "A", d, Sex::Male).with_spouse(PersonId(2)),
        Person::new(PersonId(2), "B", d, Sex::Female).with_spouse(PersonId(1)),
        Person::new(PersonId(3), "C", d, Sex::Male).with_parents([PersonId(1), PersonId(2)]),
    ])
    .unwrap()
}

fn junction() -> NodeKey {
    NodeKey::Junction(CoupleKey::new(PersonId(1), PersonId(2)))
}

#[test]
fn raw_layout_is_scaled_and_flipped() {
    let raw = parse_plain(PLAIN).unwrap();
    let layout = GraphLayout::from_raw(&raw, 100.0).unwrap();
    assert_eq!(layout.width, 350.0);
    assert_eq!(layout.height, 225.0);

    let a = layout.person(PersonId(1)).unwrap();
    assert!((a.cx - 75.0).abs() < 1e-9);
    assert!((a.cy - 37.5).abs() < 1e-9);
    assert!((a.width - 120.0).abs() < 1e-9);

    let c = layout.person(PersonId(3)).unwrap();
    assert!((c.cy - 187.5).abs() < 1e-9);
    assert!(layout.node(junction()).unwrap().is_point());
}

#[test]
fn raw_edges_are_flipped_and_anchored() {
    let raw = parse_plain(PLAIN).unwrap();
    let layout = GraphLayout::from_raw(&raw, 100.0).unwrap();

    let marriage = &layout.edges[0];
    assert!((marriage.points[0].x - 135.0).abs() < 1e-9);
    assert!((marriage.points[0].y - 37.5).abs() < 1e-9);
    assert!((marriage.points[3].x - 175.0).abs() < 1e-9);

    let child = &layout.edges[2];
    assert!((child.points[1].y - 105.0).abs() < 1e-9);
    // Top side of node 3: 187.5 - 25.
    assert!((child.points[3].y - 162.5).abs() < 1e-9);
    assert!((child.points[3].x - 175.0).abs() < 1e-9);
}

#[test]
fn non_positive_scale_is_rejected() {
    let raw = parse_plain(PLAIN).unwrap();
    assert!(GraphLayout::from_raw(&raw, 0.0).is_err());
    assert!(GraphLayout::from_raw(&raw, f64::INFINITY).is_err());
}

#[test]
fn compute_layout_applies_width_scale() {
    let g = family();
    let gens = resolve_generations(&g);
    let solver = FixedSolver(parse_plain(PLAIN).unwrap());
    let params = LayoutParams {
        pixels_per_unit: 100.0,
        node_width_scale: 2.0,
        ..LayoutParams::default()
    };
    let layout = compute_full_layout(&g, &gens, &solver, &params).unwrap();
    let a = layout.person(PersonId(1)).unwrap();
    assert!((a.width - 240.0).abs() < 1e-9);
    assert!((layout.edges[0].points[0].x - 195.0).abs() < 1e-9);
}

#[test]
fn solver_failure_is_fatal() {
    let g = family();
    let gens = resolve_generations(&g);
    let err = compute_full_layout(&g, &gens, &BrokenSolver, &LayoutParams::default()).unwrap_err();
    assert!(matches!(err, FamflowError::Layout(_)));
}
