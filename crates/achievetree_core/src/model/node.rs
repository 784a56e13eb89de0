//! Node domain model.
//!
//! # Responsibility
//! - Define the per-node record persisted in share URLs.
//! - Own the numeric status codes used by the wire format.
//!
//! # Invariants
//! - `status` serializes as its numeric code (`0..=3`).
//! - `tags`, when present, holds no duplicates.
//! - `collapsed` is presentation state only and never hides data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Opaque node identifier.
///
/// By convention ids are base-36 integers (`"a"`, `"1z"`), which lets the
/// store derive fresh ids from existing ones.
pub type NodeId = String;

/// Parent id marker used by root nodes.
pub const ROOT_PARENT: &str = "";

/// Progress state of one achievement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeStatus {
    /// Not started.
    #[default]
    Todo,
    /// In progress.
    Doing,
    /// Achieved.
    Done,
    /// Put on hold.
    Paused,
}

impl NodeStatus {
    /// All statuses in wire-code order.
    pub const ALL: [NodeStatus; 4] = [Self::Todo, Self::Doing, Self::Done, Self::Paused];

    /// Returns the numeric wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::Doing => 1,
            Self::Done => 2,
            Self::Paused => 3,
        }
    }

    /// Maps a wire code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Returns the lowercase label used by host APIs and the CLI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Paused => "paused",
        }
    }

    /// Parses a label, case-insensitive.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }
}

impl Display for NodeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<NodeStatus> for u8 {
    fn from(value: NodeStatus) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for NodeStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or_else(|| format!("unknown node status code `{value}`"))
    }
}

/// One achievement in the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique id, base-36 by convention.
    pub id: NodeId,
    /// Parent id; [`ROOT_PARENT`] for roots.
    pub parent_id: NodeId,
    /// User-facing label.
    pub title: String,
    /// Progress state.
    pub status: NodeStatus,
    /// Free-form completion date, usually `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_date: Option<String>,
    /// Tag set. `None` and an empty set are distinct on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    /// Hides the subtree from layout when set.
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
}

impl Node {
    /// Creates a `Todo` node with no optional fields set.
    pub fn new(
        id: impl Into<NodeId>,
        parent_id: impl Into<NodeId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            title: title.into(),
            status: NodeStatus::Todo,
            done_date: None,
            tags: None,
            collapsed: false,
        }
    }

    /// Returns whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeStatus};

    #[test]
    fn status_codes_round_trip() {
        for status in NodeStatus::ALL {
            assert_eq!(NodeStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(NodeStatus::from_code(4), None);
    }

    #[test]
    fn status_serializes_as_number() {
        let json = serde_json::to_string(&NodeStatus::Done).unwrap();
        assert_eq!(json, "2");
        let err = serde_json::from_str::<NodeStatus>("9").unwrap_err();
        assert!(err.to_string().contains("unknown node status"));
    }

    #[test]
    fn node_omits_unset_optional_fields() {
        let node = Node::new("h", "a", "New");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"id":"h","parentId":"a","title":"New","status":0}"#);
    }
}
