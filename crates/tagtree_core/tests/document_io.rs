use tagtree_core::{Document, DocumentError, Item};

#[test]
fn import_fills_missing_ids_and_defaults() {
    let json = r#"{
        "title": "Doc",
        "items": [
            { "title": "A", "items": [ { "id": "kept", "title": "B", "tags": "x" } ] }
        ]
    }"#;
    let document = Document::from_json(json).unwrap();
    let root = &document.items[0];
    assert!(!root.id.is_empty());
    assert_eq!(root.content, "");
    assert_eq!(root.items[0].id, "kept");
    assert_eq!(root.items[0].tags, "x");
}

#[test]
fn serialization_uses_document_wire_fields() {
    let document = Document::new(
        "Doc",
        vec![Item::with_id("1", "A", "body", "high>>B")],
    );
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["title"], "Doc");
    assert_eq!(json["items"][0]["id"], "1");
    assert_eq!(json["items"][0]["content"], "body");
    assert_eq!(json["items"][0]["tags"], "high>>B");
    assert!(json["items"][0]["items"].as_array().unwrap().is_empty());
}

#[test]
fn save_and_load_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    let document = Document::new(
        "Doc",
        vec![Item::with_id("1", "A", "", "t").with_children([Item::with_id("2", "B", "", "")])],
    );
    document.save_to_path(&path).unwrap();
    assert_eq!(Document::load_from_path(&path).unwrap(), document);
}

#[test]
fn invalid_json_and_missing_file_are_reported() {
    assert!(matches!(
        Document::from_json("{ not json"),
        Err(DocumentError::Json(_))
    ));
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Document::load_from_path(dir.path().join("missing.json")),
        Err(DocumentError::Io(_))
    ));
}
