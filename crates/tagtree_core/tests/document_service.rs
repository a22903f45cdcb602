use tagtree_core::{
    ConfirmationPrompt, Document, DocumentService, DocumentServiceError, FilterMode, Item,
};

fn service() -> DocumentService {
    DocumentService::new(Document::new(
        "Risk register",
        vec![
            Item::with_id("risks", "Risks", "", "").with_children([
                Item::with_id("r1", "R1", "", "risk, high>>Markers:A"),
                Item::with_id("r2", "R2", "", "risk, low>>Markers:A"),
            ]),
            Item::with_id("markers", "Markers", "", "")
                .with_children([Item::with_id("ma", "Markers:A", "", "")]),
            Item::with_id("grid", "Grid", "", "type::matrix"),
        ],
    ))
}

fn child_ids(service: &DocumentService, parent: &str) -> Vec<String> {
    service
        .get_item(parent)
        .unwrap()
        .items
        .iter()
        .map(|item| item.id.clone())
        .collect()
}

#[test]
fn add_item_appends_under_parent_and_rejects_unknown_parent() {
    let mut service = service();
    let id = service.add_item(Some("risks"), "R3", "", "risk").unwrap();
    assert_eq!(child_ids(&service, "risks").last(), Some(&id));

    let err = service.add_item(Some("nope"), "R4", "", "").unwrap_err();
    assert!(matches!(err, DocumentServiceError::ParentNotFound(parent) if parent == "nope"));

    let err = service.add_item(None, "   ", "", "").unwrap_err();
    assert!(matches!(err, DocumentServiceError::InvalidTitle));

    for title in ["R4, extra", "R4>>R5"] {
        let err = service.add_item(None, title, "", "").unwrap_err();
        assert!(matches!(err, DocumentServiceError::TitleHasSeparator(_)));
    }
}

#[test]
fn rename_rejects_titles_that_break_relations() {
    let mut service = service();
    let generation = service.generation();
    let err = service
        .rename_item("ma", "Markers:A, extra", &mut |_: &ConfirmationPrompt| true)
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentServiceError::TitleHasSeparator(title) if title == "Markers:A, extra"
    ));
    assert_eq!(service.generation(), generation);
    assert_eq!(service.get_item("r1").unwrap().tags, "risk, high>>Markers:A");
    assert_eq!(service.incoming_of("ma").unwrap().len(), 2);
}

#[test]
fn snapshot_taken_before_mutation_is_never_changed() {
    let mut service = service();
    let snapshot = service.document().clone();
    service.update_content("r1", "new body").unwrap();
    service.delete_item("r2").unwrap();

    assert_eq!(snapshot.items[0].items.len(), 2);
    assert_eq!(service.get_item("r1").unwrap().content, "new body");
    assert!(service.get_item("r2").is_none());
    assert!(matches!(
        service.delete_item("r2"),
        Err(DocumentServiceError::ItemNotFound(_))
    ));
}

#[test]
fn update_tags_refreshes_incoming_relations() {
    let mut service = service();
    assert_eq!(service.incoming_of("ma").unwrap().len(), 2);
    service.update_tags("r2", "risk").unwrap();
    let incoming = service.incoming_of("ma").unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].source_id, "r1");
}

#[test]
fn confirmed_rename_propagates_to_relations() {
    let mut service = service();
    let mut prompts = Vec::new();
    let outcome = service
        .rename_item("ma", "Markers:Alpha", &mut |prompt: &ConfirmationPrompt| {
            prompts.push(prompt.clone());
            true
        })
        .unwrap();

    assert_eq!(outcome.affected_relations, 2);
    assert_eq!(outcome.rewritten_relations, 2);
    assert!(matches!(
        &prompts[0],
        ConfirmationPrompt::RenameRelations { affected_relations: 2, .. }
    ));
    assert_eq!(service.incoming_of("ma").unwrap().len(), 2);
    assert_eq!(service.get_item("r1").unwrap().tags, "risk, high>>Markers:Alpha");
}

#[test]
fn declined_rename_keeps_relations_on_old_title() {
    let mut service = service();
    let outcome = service
        .rename_item("ma", "Markers:Alpha", &mut |_: &ConfirmationPrompt| false)
        .unwrap();
    assert_eq!(outcome.rewritten_relations, 0);
    assert_eq!(service.get_item("ma").unwrap().title, "Markers:Alpha");
    assert!(service.incoming_of("ma").unwrap().is_empty());
    assert_eq!(service.get_item("r1").unwrap().tags, "risk, high>>Markers:A");
}

#[test]
fn rename_without_relations_does_not_ask() {
    let mut service = service();
    let mut asked = false;
    service
        .rename_item("risks", "Risk list", &mut |_: &ConfirmationPrompt| {
            asked = true;
            true
        })
        .unwrap();
    assert!(!asked);
    assert_eq!(service.id_for_title("Risk list"), Some("risks"));
}

#[test]
fn cancelled_reorder_leaves_document_unchanged() {
    let mut service = service();
    let generation = service.generation();
    let applied = service
        .reorder_item("r2", 0, &mut |_: &ConfirmationPrompt| false)
        .unwrap();
    assert!(!applied);
    assert_eq!(service.generation(), generation);
    assert_eq!(child_ids(&service, "risks"), vec!["r1", "r2"]);

    let applied = service
        .reorder_item("r2", 0, &mut |_: &ConfirmationPrompt| true)
        .unwrap();
    assert!(applied);
    assert_eq!(child_ids(&service, "risks"), vec!["r2", "r1"]);
}

#[test]
fn stale_proposal_is_rejected() {
    let mut service = service();
    let proposal = service.propose_reorder("r2", 0).unwrap();
    assert_eq!(proposal.items()[0].items[0].id, "r2");

    service.update_content("r1", "edited meanwhile").unwrap();
    let err = service.commit_proposal(proposal).unwrap_err();
    assert!(matches!(err, DocumentServiceError::StaleProposal { .. }));
    assert_eq!(child_ids(&service, "risks"), vec!["r1", "r2"]);
}

#[test]
fn filter_and_matrix_run_against_live_document() {
    let mut service = service();
    let filtered = service.filter(&["risk".to_string()], FilterMode::Or, false);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].items.len(), 2);

    assert!(matches!(
        service.commit_matrix("grid"),
        Err(DocumentServiceError::Matrix(_))
    ));
    assert!(service.build_matrix("risks", "markers", &[]).is_some());
    service.set_matrix_cell("r2", "ma", Some("medium")).unwrap();
    let summary = service.commit_matrix("grid").unwrap();
    assert_eq!(summary.relations_written, 2);
    assert_eq!(service.get_item("r2").unwrap().tags, "risk, medium>>Markers:A");
    assert_eq!(
        service.get_item("grid").unwrap().tags,
        "type::matrix, source-item::Risks, target-item::Markers"
    );

    let rebuilt = service.build_matrix_from_config("grid").unwrap();
    assert_eq!(rebuilt.cell("r2", "ma"), Some("medium"));
}

#[test]
fn matrix_built_before_an_edit_cannot_be_committed() {
    let mut service = service();
    assert!(service.build_matrix("risks", "markers", &[]).is_some());
    service
        .rename_item("ma", "Markers:B", &mut |_: &ConfirmationPrompt| true)
        .unwrap();
    let renamed_tags = service.get_item("r1").unwrap().tags.clone();

    let err = service.commit_matrix("grid").unwrap_err();
    assert!(matches!(err, DocumentServiceError::StaleMatrix { .. }));
    assert_eq!(service.get_item("r1").unwrap().tags, renamed_tags);
    assert_eq!(renamed_tags, "risk, high>>Markers:B");

    service.build_matrix("risks", "markers", &[]).unwrap();
    service.commit_matrix("grid").unwrap();
    assert_eq!(service.get_item("r1").unwrap().tags, "risk, high>>Markers:B");
    // A committed matrix stays current and can be committed again.
    service.commit_matrix("grid").unwrap();
}

#[test]
fn duplicate_titles_are_reported() {
    let mut service = service();
    service.add_item(None, "R1", "", "").unwrap();
    let duplicates = service.duplicate_titles();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].title, "R1");
    assert_eq!(service.id_for_title("R1"), Some("r1"));
}
