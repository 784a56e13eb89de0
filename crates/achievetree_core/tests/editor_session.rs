use achievetree_core::{
    default_tree, EditorConfig, EditorSession, NodePatch, NodeStatus, SessionError, ViewMode,
};

#[test]
fn edits_survive_a_share_url_round_trip() {
    let mut session = EditorSession::default();
    let root = session.add_root("Marathon").unwrap();
    let child = session.add_child(&root, "Half marathon").unwrap();
    session
        .set_status(&child, NodeStatus::Done, "2024-04-14")
        .unwrap();
    session
        .update_node(
            &root,
            NodePatch {
                tags: Some(Some(["running".to_string()].into_iter().collect())),
                ..NodePatch::default()
            },
        )
        .unwrap();
    session.set_share_flag(true);

    let reopened = EditorSession::from_query(session.query(), EditorConfig::default());
    assert!(reopened.load_error().is_none());
    assert_eq!(reopened.tree(), session.tree());
    assert!(reopened.share_state().share);
    assert_eq!(reopened.share_state().view, ViewMode::Map);
}

#[test]
fn undo_redo_restore_query_exactly() {
    let mut session = EditorSession::default();
    let original = session.query().to_string();
    session.delete_subtree("c").unwrap();
    let after_delete = session.query().to_string();

    assert!(session.undo());
    assert_eq!(session.query(), original);
    assert!(session.redo());
    assert_eq!(session.query(), after_delete);
    assert!(!session.redo());
}

#[test]
fn view_flags_are_not_history() {
    let mut session = EditorSession::default();
    session.set_view(ViewMode::Explore);
    session.set_json_display(true);
    assert!(!session.can_undo());
    assert!(session.query().ends_with("&view=explore&type=json"));
}

#[test]
fn reload_replaces_document_and_history() {
    let mut session = EditorSession::default();
    session.add_root("temp").unwrap();
    session.select(Some("a")).unwrap();

    session.reload("v=1&d=garbage!!");
    assert_eq!(session.tree(), &default_tree());
    assert!(session.load_error().is_some());
    assert!(!session.can_undo());
    assert_eq!(session.selection(), None);
}

#[test]
fn select_rejects_unknown_ids() {
    let mut session = EditorSession::default();
    assert_eq!(
        session.select(Some("nope")),
        Err(SessionError::NodeNotFound("nope".to_string()))
    );
    session.select(Some("e")).unwrap();
    session.select(None).unwrap();
    assert_eq!(session.selection(), None);
}

#[test]
fn shrunk_query_leaves_document_untouched() {
    let session = EditorSession::default();
    let report = session.shrunk_query();
    assert!(report.fits);
    assert_eq!(report.query, session.query());
    assert_eq!(session.tree(), &default_tree());
}
