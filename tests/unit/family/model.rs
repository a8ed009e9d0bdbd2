use super::*;

fn person(id: u32, parents: &[u32], spouse: Option<u32>) -> Person {
    Person {
        id: PersonId(id),
        name: format!("p{id}"),
        birth_date: chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        sex: if id % 2 == 0 { Sex::Female } else { Sex::Male },
        parent_ids: parents.iter().copied().map(PersonId).collect(),
        spouse_id: spouse.map(PersonId),
        metadata: BTreeMap::new(),
    }
}

fn two_gen() -> FamilyGraph {
    FamilyGraph::new([
        person(1, &[], Some(2)),
        person(2, &[], Some(1)),
        person(3, &[1, 2], None),
    ])
    .unwrap()
}

#[test]
fn accessors_follow_relations() {
    let g = two_gen();
    assert_eq!(g.len(), 3);
    assert_eq!(g.spouse_of(PersonId(1)).map(|p| p.id), Some(PersonId(2)));
    let kids: Vec<_> = g.children_of(PersonId(2)).iter().map(|p| p.id).collect();
    assert_eq!(kids, vec![PersonId(3)]);
    let parents: Vec<_> = g.parents_of(PersonId(3)).iter().map(|p| p.id).collect();
    assert_eq!(parents, vec![PersonId(1), PersonId(2)]);
    assert_eq!(g.couple_children(PersonId(1), PersonId(2)).len(), 1);
    assert!(g.couple_children(PersonId(1), PersonId(3)).is_empty());
    assert_eq!(g.couples(), vec![CoupleKey::new(PersonId(2), PersonId(1))]);
}

#[test]
fn couple_key_is_order_independent_and_prints_junction_name() {
    let k = CoupleKey::new(PersonId(7), PersonId(3));
    assert_eq!(k, CoupleKey::new(PersonId(3), PersonId(7)));
    assert_eq!(k.to_string(), "couple_3_7");
    assert_eq!(k.partner_of(PersonId(3)), Some(PersonId(7)));
    assert_eq!(k.partner_of(PersonId(4)), None);
}

#[test]
fn persons_keep_ingestion_order() {
    let g = FamilyGraph::new([
        person(5, &[], None),
        person(1, &[], None),
        person(3, &[], None),
    ])
    .unwrap();
    let order: Vec<_> = g.persons().map(|p| p.id.0).collect();
    assert_eq!(order, vec![5, 1, 3]);
    assert_eq!(g.ids(), vec![PersonId(1), PersonId(3), PersonId(5)]);
}

#[test]
fn rejects_duplicate_ids() {
    let err = FamilyGraph::new([person(1, &[], None), person(1, &[], None)]).unwrap_err();
    assert!(matches!(err, FamflowError::Graph(_)));
}

#[test]
fn rejects_unresolved_references() {
    let err = FamilyGraph::new([person(1, &[9], Some(8))]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parent id 9"));
    assert!(msg.contains("spouse id 8"));
}

#[test]
fn rejects_parentage_cycles() {
    let err = FamilyGraph::new([
        person(1, &[3], None),
        person(2, &[1], None),
        person(3, &[2], None),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn rejects_self_parent_and_self_spouse() {
    assert!(FamilyGraph::new([person(1, &[1], None)]).is_err());
    assert!(FamilyGraph::new([person(1, &[], Some(1))]).is_err());
}

#[test]
fn rejects_more_than_two_parents() {
    let err = FamilyGraph::new([
        person(1, &[], None),
        person(2, &[], None),
        person(3, &[], None),
        person(4, &[1, 2, 3], None),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("at most 2"));
}

#[test]
fn parses_json_document_with_defaults() {
    let json = r#"{
        "persons": [
            {"id": 1, "name": "Taro", "birth_date": "1940-01-01", "sex": "M", "spouse_id": 2},
            {"id": 2, "name": "Hana", "birth_date": "1942-03-04", "sex": "F", "spouse_id": 1},
            {"id": 3, "name": "Ichiro", "birth_date": "1965-05-06", "sex": "M",
             "parent_ids": [1, 2], "metadata": {"note": "eldest"}}
        ]
    }"#;
    let g = FamilyGraph::from_json_str(json).unwrap();
    let ichiro = g.get(PersonId(3)).unwrap();
    assert_eq!(ichiro.parent_ids, vec![PersonId(1), PersonId(2)]);
    assert_eq!(ichiro.metadata.get("note").map(String::as_str), Some("eldest"));
    assert_eq!(g.get(PersonId(2)).unwrap().sex, Sex::Female);
}

#[test]
fn json_errors_are_serde_errors() {
    let err = FamilyGraph::from_json_str(r#"{"persons": [{"id": 1}]}"#).unwrap_err();
    assert!(matches!(err, FamflowError::Serde(_)));
    let err = FamilyGraph::from_json_str(
        r#"{"persons": [{"id": 1, "name": "x", "birth_date": "2000-01-01", "sex": "X"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, FamflowError::Serde(_)));
}
