use achievetree_core::{ConfigError, EditorConfig, EditorSession};
use std::io::Write;

#[test]
fn config_file_overrides_feed_the_session() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "layout": {{"depth_spacing": 300}},
            "history_limit": 2,
            "shrink": {{"url_budget": 4000}}
        }}"#
    )
    .unwrap();

    let config = EditorConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.layout.depth_spacing, 300.0);
    assert_eq!(config.layout.sibling_spacing, 96.0);
    assert_eq!(config.shrink.url_budget, 4000);

    let mut session = EditorSession::new(config);
    assert_eq!(session.layout().position("d").unwrap().x, 600.0);
    for title in ["one", "two", "three"] {
        session.add_root(title).unwrap();
    }
    assert!(session.undo());
    assert!(session.undo());
    assert!(!session.undo());
    assert_eq!(session.tree().len(), 8);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EditorConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    std::fs::write(&path, r#"{"history_limit": 0}"#).unwrap();
    let err = EditorConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
