use super::*;
use crate::family::model::{Person, Sex};

fn person(id: u32, parents: &[u32], spouse: Option<u32>) -> Person {
    let date = chrono::NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
    let sex = if id % 2 == 0 { Sex::Female } else { Sex::Male };
    let p = Person::new(PersonId(id), format!("p{id}"), date, sex)
        .with_parents(parents.iter().copied().map(PersonId));
    match spouse {
        Some(s) => p.with_spouse(PersonId(s)),
        None => p,
    }
}

fn depths(g: &GenerationMap) -> Vec<(u32, u32)> {
    g.iter().map(|(id, d)| (id.0, d)).collect()
}

#[test]
fn couple_with_child() {
    let graph = FamilyGraph::new([
        person(1, &[], Some(2)),
        person(2, &[], Some(1)),
        person(3, &[1, 2], None),
    ])
    .unwrap();
    let g = resolve_generations(&graph);
    assert_eq!(depths(&g), vec![(1, 0), (2, 0), (3, 1)]);
    assert_eq!(g.max_depth(), 1);
    assert_eq!(g.members(0), vec![PersonId(1), PersonId(2)]);
}

#[test]
fn single_person_is_depth_zero() {
    let graph = FamilyGraph::new([person(42, &[], None)]).unwrap();
    let g = resolve_generations(&graph);
    assert_eq!(depths(&g), vec![(42, 0)]);
}

#[test]
fn child_takes_deepest_parent() {
    // 1 -> 2 -> 3, and 4 has parents 1 and 3.
    let graph = FamilyGraph::new([
        person(4, &[1, 3], None),
        person(3, &[2], None),
        person(2, &[1], None),
        person(1, &[], None),
    ])
    .unwrap();
    let g = resolve_generations(&graph);
    assert_eq!(depths(&g), vec![(1, 0), (2, 1), (3, 2), (4, 3)]);
}

#[test]
fn married_in_spouse_is_raised() {
    let graph = FamilyGraph::new([
        person(1, &[], Some(2)),
        person(2, &[], Some(1)),
        person(3, &[1, 2], Some(5)),
        person(5, &[], Some(3)),
        person(6, &[3, 5], None),
    ])
    .unwrap();
    let g = resolve_generations(&graph);
    assert_eq!(g.get(PersonId(5)), Some(1));
    assert_eq!(g.get(PersonId(3)), Some(1));
    assert_eq!(g.get(PersonId(6)), Some(2));
}

#[test]
fn equalization_does_not_recascade_to_descendants() {
    // 3 is parentless but marries 2 (depth 1); 4 only lists 3 as parent and keeps depth 1.
    let graph = FamilyGraph::new([
        person(1, &[], None),
        person(2, &[1], Some(3)),
        person(3, &[], Some(2)),
        person(4, &[3], None),
    ])
    .unwrap();
    let g = resolve_generations(&graph);
    assert_eq!(g.get(PersonId(3)), Some(1));
    assert_eq!(g.get(PersonId(4)), Some(1));
}

#[test]
fn empty_graph_has_no_depths() {
    let graph = FamilyGraph::new(Vec::<Person>::new()).unwrap();
    let g = resolve_generations(&graph);
    assert!(g.is_empty());
    assert_eq!(g.max_depth(), 0);
}
