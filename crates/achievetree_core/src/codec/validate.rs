//! Payload validation.
//!
//! # Responsibility
//! - Check the raw JSON shape before typed deserialization.
//! - Check forest integrity of the decoded tree.
//!
//! # Invariants
//! - Shape checks: `nodes` array, `meta` object, string `id`/`parentId`/
//!   `title`, `status` in `0..=3`, string `doneDate`, array `tags`.
//! - Structure checks: unique ids, parents exist, no cycles.

use crate::model::node::NodeStatus;
use crate::model::tree::Tree;
use crate::store::tree_ops::parent_of;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a payload is rejected after JSON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotAnObject,
    NodesNotArray,
    MetaNotObject,
    NodeNotObject {
        index: usize,
    },
    /// A field is missing or has the wrong JSON type.
    FieldType {
        index: usize,
        field: &'static str,
    },
    StatusOutOfRange {
        index: usize,
    },
    DuplicateId(String),
    DanglingParent {
        id: String,
        parent_id: String,
    },
    Cycle(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "payload must be a JSON object"),
            Self::NodesNotArray => write!(f, "`nodes` must be an array"),
            Self::MetaNotObject => write!(f, "`meta` must be an object"),
            Self::NodeNotObject { index } => write!(f, "node #{index} must be an object"),
            Self::FieldType { index, field } => {
                write!(f, "node #{index} has missing or mistyped `{field}`")
            }
            Self::StatusOutOfRange { index } => {
                write!(f, "node #{index} has unknown `status` code")
            }
            Self::DuplicateId(id) => write!(f, "duplicate node id `{id}`"),
            Self::DanglingParent { id, parent_id } => {
                write!(f, "node `{id}` references missing parent `{parent_id}`")
            }
            Self::Cycle(id) => write!(f, "node `{id}` is its own ancestor"),
        }
    }
}

impl Error for ValidationError {}

/// Checks the raw JSON shape of a payload.
pub fn validate_shape(value: &Value) -> Result<(), ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or(ValidationError::NodesNotArray)?;
    if !object.get("meta").is_some_and(Value::is_object) {
        return Err(ValidationError::MetaNotObject);
    }

    for (index, node) in nodes.iter().enumerate() {
        let node = node
            .as_object()
            .ok_or(ValidationError::NodeNotObject { index })?;
        for field in ["id", "parentId", "title"] {
            if !node.get(field).is_some_and(Value::is_string) {
                return Err(ValidationError::FieldType { index, field });
            }
        }
        let code = node
            .get("status")
            .and_then(Value::as_u64)
            .ok_or(ValidationError::FieldType {
                index,
                field: "status",
            })?;
        let known = u8::try_from(code)
            .ok()
            .and_then(NodeStatus::from_code)
            .is_some();
        if !known {
            return Err(ValidationError::StatusOutOfRange { index });
        }
        if node.get("doneDate").is_some_and(|value| !value.is_string()) {
            return Err(ValidationError::FieldType {
                index,
                field: "doneDate",
            });
        }
        if node.get("tags").is_some_and(|value| !value.is_array()) {
            return Err(ValidationError::FieldType {
                index,
                field: "tags",
            });
        }
    }
    Ok(())
}

/// Checks that `tree` is a well-formed forest.
pub fn validate_structure(tree: &Tree) -> Result<(), ValidationError> {
    let mut ids = HashSet::with_capacity(tree.len());
    for node in &tree.nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId(node.id.clone()));
        }
    }
    for node in &tree.nodes {
        if !node.is_root() && !ids.contains(node.parent_id.as_str()) {
            return Err(ValidationError::DanglingParent {
                id: node.id.clone(),
                parent_id: node.parent_id.clone(),
            });
        }
    }

    // Every chain must reach a root; `cleared` memoizes ids known to do so.
    let parents = parent_of(&tree.nodes);
    let mut cleared: HashSet<&str> = HashSet::with_capacity(tree.len());
    for node in &tree.nodes {
        let mut path: HashSet<&str> = HashSet::new();
        let mut cursor = node.id.as_str();
        while !cursor.is_empty() && !cleared.contains(cursor) {
            if !path.insert(cursor) {
                return Err(ValidationError::Cycle(node.id.clone()));
            }
            cursor = parents.get(cursor).copied().unwrap_or_default();
        }
        cleared.extend(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_shape, validate_structure, ValidationError};
    use crate::model::node::Node;
    use crate::model::tree::{default_tree, Tree};
    use serde_json::json;

    #[test]
    fn shape_accepts_minimal_payload() {
        validate_shape(&json!({"meta": {}, "nodes": []})).unwrap();
    }

    #[test]
    fn shape_rejects_bad_fields() {
        let cases = [
            (json!([]), ValidationError::NotAnObject),
            (json!({"meta": {}}), ValidationError::NodesNotArray),
            (json!({"nodes": []}), ValidationError::MetaNotObject),
            (
                json!({"meta": {}, "nodes": [{"id": 1, "parentId": "", "title": "", "status": 0}]}),
                ValidationError::FieldType { index: 0, field: "id" },
            ),
            (
                json!({"meta": {}, "nodes": [{"id": "a", "parentId": "", "title": "", "status": 7}]}),
                ValidationError::StatusOutOfRange { index: 0 },
            ),
            (
                json!({"meta": {}, "nodes": [{"id": "a", "parentId": "", "title": "", "status": 0, "tags": "x"}]}),
                ValidationError::FieldType { index: 0, field: "tags" },
            ),
        ];
        for (value, expected) in cases {
            assert_eq!(validate_shape(&value).unwrap_err(), expected);
        }
    }

    #[test]
    fn structure_accepts_default_tree() {
        validate_structure(&default_tree()).unwrap();
    }

    #[test]
    fn structure_rejects_dangling_duplicate_and_cycle() {
        let dangling = Tree::new("t", vec![Node::new("1", "9", "orphan")]);
        assert!(matches!(
            validate_structure(&dangling),
            Err(ValidationError::DanglingParent { .. })
        ));

        let duplicate = Tree::new("t", vec![Node::new("1", "", "a"), Node::new("1", "", "b")]);
        assert_eq!(
            validate_structure(&duplicate),
            Err(ValidationError::DuplicateId("1".to_string()))
        );

        let cycle = Tree::new(
            "t",
            vec![
                Node::new("0", "", "root"),
                Node::new("1", "2", "a"),
                Node::new("2", "1", "b"),
            ],
        );
        assert!(matches!(
            validate_structure(&cycle),
            Err(ValidationError::Cycle(_))
        ));
    }
}
