use tagtree_core::{
    count_relations_to, find_by_title, incoming_of, outgoing_of, propagate_rename, Item,
    RelationIndex,
};

fn scenario() -> Vec<Item> {
    vec![
        Item::with_id("risks", "Risks", "", "")
            .with_children([Item::with_id("r1", "R1", "", "high>>Markers:A")]),
        Item::with_id("markers", "Markers:A", "", ""),
    ]
}

#[test]
fn incoming_finds_relation_by_target_title() {
    let tree = scenario();
    let target = find_by_title(&tree, "Markers:A").unwrap();
    let incoming = incoming_of(&tree, target);
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].relation, "high");
    assert_eq!(incoming[0].source_title, "R1");
    assert_eq!(incoming[0].source_id, "r1");
}

#[test]
fn outgoing_reads_own_tags_only() {
    let tree = scenario();
    let r1 = find_by_title(&tree, "R1").unwrap();
    let outgoing = outgoing_of(r1);
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].target, "Markers:A");
    assert!(outgoing_of(&tree[0]).is_empty());
}

#[test]
fn rename_rewrites_exactly_the_matching_relations() {
    let mut tree = vec![
        Item::with_id("old", "Old", "", ""),
        Item::with_id("a", "A", "", "high>>Old, low>>Other, Old")
            .with_children([Item::with_id("b", "B", "", "medium>>Old")]),
        Item::with_id("c", "C", "", "max>>Old, type::Old, 3>>Old Town"),
        Item::with_id("other", "Other", "", ""),
    ];

    assert_eq!(count_relations_to(&tree, "Old"), 3);
    let rewritten = propagate_rename(&mut tree, "Old", "New");
    assert_eq!(count_relations_to(&tree, "Old"), 0);
    assert_eq!(rewritten, 3);
    tree[0].title = "New".to_string();

    let renamed = find_by_title(&tree, "New").unwrap();
    let mut sources: Vec<_> = incoming_of(&tree, renamed)
        .into_iter()
        .map(|relation| relation.source_id)
        .collect();
    sources.sort();
    assert_eq!(sources, vec!["a", "b", "c"]);

    let a = find_by_title(&tree, "A").unwrap();
    assert_eq!(a.tags, "high>>New, low>>Other, Old");
    let c = find_by_title(&tree, "C").unwrap();
    assert_eq!(c.tags, "max>>New, type::Old, 3>>Old Town");
    let other = find_by_title(&tree, "Other").unwrap();
    assert_eq!(incoming_of(&tree, other).len(), 1);
}

#[test]
fn relation_index_matches_full_scan() {
    let tree = scenario();
    let index = RelationIndex::build(&tree);
    let target = find_by_title(&tree, "Markers:A").unwrap();
    assert_eq!(
        index.incoming(&target.title, Some(target.id.as_str())),
        incoming_of(&tree, target)
    );
    assert_eq!(index.len(), 3);
}
