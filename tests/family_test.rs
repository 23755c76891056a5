//! Integration tests for the union-tree (family) builder.

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use vassar::domain::{
    build_family_tree, DomainError, FamilyConfig, FamilyGraph, FamilyNode, Person, Record,
    Union, UnionTreeBuilder,
};

fn people(names: &[(i64, &str)]) -> Vec<Person> {
    names.iter().map(|(id, name)| Person::new(*id, name)).collect()
}

fn person_names(nodes: &[FamilyNode]) -> Vec<&str> {
    nodes.iter().map(FamilyNode::name).collect()
}

#[fixture]
fn alice_bob_carol() -> FamilyGraph {
    FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol")]),
        vec![Union::new(1, 2, 3)],
    )
    .unwrap()
}

/// Three generations: Alice & Bob → Carol; Carol & Dan → Eve, Frank.
#[fixture]
fn three_generations() -> FamilyGraph {
    FamilyGraph::new(
        people(&[
            (1, "Alice"),
            (2, "Bob"),
            (3, "Carol"),
            (4, "Dan"),
            (5, "Eve"),
            (6, "Frank"),
        ]),
        vec![
            Union::new(1, 2, 3),
            Union::new(3, 4, 5),
            Union::new(4, 3, 6),
        ],
    )
    .unwrap()
}

// ============================================================
// Single root
// ============================================================

#[rstest]
fn given_couple_with_child_when_building_then_union_node_holds_child(
    alice_bob_carol: FamilyGraph,
) {
    let tree = build_family_tree(&alice_bob_carol, 1).unwrap();

    let union = tree.as_union().expect("union node");
    assert_eq!(union.name, "Alice & Bob");
    assert_eq!(union.parents[0].name, "Alice");
    assert_eq!(union.parents[1].name, "Bob");
    assert_eq!(union.children.len(), 1);
    let carol = union.children[0].as_person().expect("person node");
    assert_eq!(carol.person_id, 3);
    assert_eq!(carol.name, "Carol");
    assert!(carol.children.is_empty());
}

#[rstest]
fn given_either_parent_as_root_when_building_then_same_union(alice_bob_carol: FamilyGraph) {
    let from_alice = build_family_tree(&alice_bob_carol, 1).unwrap();
    let from_bob = build_family_tree(&alice_bob_carol, 2).unwrap();

    assert_eq!(from_alice, from_bob);
}

#[rstest]
fn given_childless_person_when_building_then_person_leaf(alice_bob_carol: FamilyGraph) {
    let tree = build_family_tree(&alice_bob_carol, 3).unwrap();

    assert_eq!(tree.as_person().map(|p| p.name.as_str()), Some("Carol"));
    assert!(tree.children().is_empty());
}

#[rstest]
fn given_unknown_root_when_building_then_root_not_found(alice_bob_carol: FamilyGraph) {
    let result = build_family_tree(&alice_bob_carol, 42);

    assert_eq!(result, Err(DomainError::RootNotFound(42)));
}

#[rstest]
fn given_three_generations_when_building_then_unions_nest(three_generations: FamilyGraph) {
    let tree = build_family_tree(&three_generations, 1).unwrap();

    assert_eq!(tree.name(), "Alice & Bob");
    let second = &tree.children()[0];
    assert_eq!(second.name(), "Carol & Dan");
    assert_eq!(person_names(second.children()), vec!["Eve", "Frank"]);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn given_person_with_two_partners_when_building_then_person_hub_with_two_unions() {
    let graph = FamilyGraph::new(
        people(&[(1, "Ann"), (2, "Ben"), (3, "Cid"), (4, "Dot"), (5, "Eli")]),
        vec![Union::new(1, 2, 4), Union::new(3, 1, 5)],
    )
    .unwrap();

    let tree = build_family_tree(&graph, 1).unwrap();

    let ann = tree.as_person().expect("person hub");
    assert_eq!(ann.name, "Ann");
    assert_eq!(person_names(&ann.children), vec!["Ann & Ben", "Cid & Ann"]);
    assert_eq!(person_names(ann.children[0].children()), vec!["Dot"]);
    assert_eq!(person_names(ann.children[1].children()), vec!["Eli"]);
}

#[rstest]
#[case::from_first_parent(1)]
#[case::from_second_parent(2)]
fn given_union_recorded_in_reverse_when_building_then_recorded_order_kept(#[case] root: i64) {
    let graph = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol")]),
        vec![Union::new(2, 1, 3)],
    )
    .unwrap();

    let tree = build_family_tree(&graph, root).unwrap();

    let union = tree.as_union().expect("union node");
    assert_eq!(union.name, "Bob & Alice");
    assert_eq!(union.parents[0].name, "Bob");
    assert_eq!(union.parents[1].name, "Alice");
}

#[rstest]
fn given_custom_separator_when_building_then_union_name_uses_it(alice_bob_carol: FamilyGraph) {
    let config = FamilyConfig {
        couple_separator: " + ".to_string(),
        ..FamilyConfig::default()
    };

    let tree = UnionTreeBuilder::new(&alice_bob_carol)
        .with_config(config)
        .build(1)
        .unwrap();

    assert_eq!(tree.name(), "Alice + Bob");
}

// ============================================================
// Forest
// ============================================================

#[rstest]
fn given_one_family_when_building_forest_then_single_tree_unwrapped(
    three_generations: FamilyGraph,
) {
    let forest = UnionTreeBuilder::new(&three_generations)
        .build_forest()
        .unwrap();

    assert_eq!(forest.name(), "Alice & Bob");
    assert_eq!(forest.depth(), 3);
}

#[test]
fn given_two_families_and_a_single_when_building_forest_then_wrapped() {
    let graph = FamilyGraph::new(
        people(&[
            (1, "Alice"),
            (2, "Bob"),
            (3, "Carol"),
            (4, "Xia"),
            (5, "Yan"),
            (6, "Zoe"),
            (7, "Hal"),
        ]),
        vec![Union::new(1, 2, 3), Union::new(4, 5, 6)],
    )
    .unwrap();

    let forest = UnionTreeBuilder::new(&graph).build_forest().unwrap();

    assert_eq!(forest.name(), "Family Tree");
    assert_eq!(
        person_names(forest.children()),
        vec!["Alice & Bob", "Xia & Yan", "Hal"]
    );
}

#[test]
fn given_partner_with_own_ancestry_when_building_forest_then_couple_emitted_once() {
    // Dan marries into the family; the couple appears under Carol's parents only.
    let graph = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol"), (4, "Dan"), (5, "Eve")]),
        vec![Union::new(1, 2, 3), Union::new(3, 4, 5)],
    )
    .unwrap();

    let forest = UnionTreeBuilder::new(&graph).build_forest().unwrap();

    assert_eq!(forest.name(), "Alice & Bob");
    assert_eq!(forest.children()[0].name(), "Carol & Dan");
}

#[test]
fn given_no_people_when_building_forest_then_empty_sentinel() {
    let graph = FamilyGraph::default();

    let forest = UnionTreeBuilder::new(&graph).build_forest().unwrap();

    assert_eq!(forest.name(), "Family Tree");
    assert!(forest.children().is_empty());
}

// ============================================================
// Integrity violations
// ============================================================

#[test]
fn given_two_different_unions_for_one_child_when_building_graph_then_ambiguous() {
    let result = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol"), (4, "Dan")]),
        vec![Union::new(1, 2, 3), Union::new(1, 4, 3)],
    );

    assert_eq!(
        result.unwrap_err(),
        DomainError::AmbiguousUnion {
            child_id: 3,
            first: (1, 2),
            second: (1, 4),
        }
    );
}

#[test]
fn given_repeated_identical_union_when_building_graph_then_tolerated() {
    let graph = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol")]),
        vec![Union::new(1, 2, 3), Union::new(2, 1, 3)],
    )
    .unwrap();

    let tree = build_family_tree(&graph, 1).unwrap();
    assert_eq!(tree.children().len(), 1);
}

#[test]
fn given_union_with_unknown_parent_when_building_graph_then_unresolved_reference() {
    let result = FamilyGraph::new(
        people(&[(1, "Alice"), (3, "Carol")]),
        vec![Union::new(1, 2, 3)],
    );

    assert_eq!(
        result.unwrap_err(),
        DomainError::UnresolvedReference {
            child_id: 3,
            person_id: 2,
        }
    );
}

#[test]
fn given_union_with_same_parent_twice_when_building_graph_then_malformed() {
    let result = FamilyGraph::new(people(&[(1, "Alice"), (3, "Carol")]), vec![Union::new(1, 1, 3)]);

    assert!(matches!(result, Err(DomainError::MalformedRecord { .. })));
}

#[test]
fn given_own_ancestor_when_building_then_cyclic_ancestry() {
    // Alice & Bob → Carol, Carol & Dan → Alice
    let graph = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol"), (4, "Dan")]),
        vec![Union::new(1, 2, 3), Union::new(3, 4, 1)],
    )
    .unwrap();

    assert!(matches!(
        build_family_tree(&graph, 2),
        Err(DomainError::CyclicAncestry(_))
    ));
}

#[test]
fn given_cycle_without_roots_when_building_forest_then_cyclic_ancestry() {
    // Dan is the only candidate and his couple belongs to Carol's ancestry,
    // so nobody in the loop is reachable.
    let graph = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol"), (4, "Dan")]),
        vec![Union::new(1, 2, 3), Union::new(3, 4, 1), Union::new(3, 4, 2)],
    )
    .unwrap();

    assert!(matches!(
        UnionTreeBuilder::new(&graph).build_forest(),
        Err(DomainError::CyclicAncestry(_))
    ));
}

// ============================================================
// Records
// ============================================================

#[test]
fn given_records_when_building_graph_then_attributes_are_parsed() {
    let people = vec![
        Record::new()
            .with("person_id", 1_i64)
            .with("name", "Alice")
            .with("gender", "female")
            .with("birthdate", "1901-02-03"),
        Record::new().with("person_id", 2_i64).with("name", "Bob"),
        Record::new().with("person_id", 3_i64).with("name", "Carol"),
    ];
    let unions = vec![Record::new()
        .with("parent1_id", 1_i64)
        .with("parent2_id", 2_i64)
        .with("child_id", 3_i64)];

    let graph = FamilyGraph::from_records(&people, &unions).unwrap();

    let alice = graph.person(1).unwrap();
    assert_eq!(alice.gender.as_deref(), Some("female"));
    assert_eq!(alice.birthdate, NaiveDate::from_ymd_opt(1901, 2, 3));
    assert_eq!(graph.incoming_union(3).map(Union::couple), Some((1, 2)));
}

#[rstest]
#[case::missing_id(Record::new().with("name", "Alice"), "person_id")]
#[case::bad_date(
    Record::new().with("person_id", 1_i64).with("name", "Alice").with("birthdate", "02/03/1901"),
    "birthdate"
)]
fn given_malformed_person_when_building_graph_then_field_is_named(
    #[case] record: Record,
    #[case] expected_field: &str,
) {
    let err = FamilyGraph::from_records(&[record], &[]).unwrap_err();

    match err {
        DomainError::MalformedRecord { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn given_union_tree_when_serialized_then_tagged_by_type() {
    let graph = FamilyGraph::new(
        people(&[(1, "Alice"), (2, "Bob"), (3, "Carol")]),
        vec![Union::new(1, 2, 3)],
    )
    .unwrap();
    let tree = build_family_tree(&graph, 1).unwrap();

    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["type"], "union");
    assert_eq!(json["name"], "Alice & Bob");
    assert_eq!(json["children"][0]["type"], "person");
    assert_eq!(json["children"][0]["name"], "Carol");
}

#[rstest]
fn given_union_tree_when_serialized_then_people_share_one_identity_field(
    alice_bob_carol: FamilyGraph,
) {
    let tree = build_family_tree(&alice_bob_carol, 1).unwrap();

    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["parents"][0]["person_id"], 1);
    assert_eq!(json["children"][0]["person_id"], 3);
    assert!(json["children"][0].get("id").is_none());
}
