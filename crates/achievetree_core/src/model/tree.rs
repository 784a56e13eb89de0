//! Tree document model.
//!
//! # Responsibility
//! - Hold the flat, ordered node list of one achievement document.
//! - Provide the built-in default document.
//!
//! # Invariants
//! - Node order is meaningful: it is the sibling order used by layout.
//! - Mutations never happen in place; store functions return new trees.

use super::node::{Node, NodeId, NodeStatus, ROOT_PARENT};
use std::collections::BTreeSet;

/// Title used by the default document.
pub const DEFAULT_TREE_TITLE: &str = "My achievements";

/// One achievement document: a titled forest stored as a flat list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Document title, shown in the host chrome.
    pub title: String,
    /// Flat node list, parent links by id.
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree from a title and node list.
    pub fn new(title: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            title: title.into(),
            nodes,
        }
    }

    /// Number of nodes, hidden ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up one node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns whether a node with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Root nodes in list order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_root())
    }

    /// Ids of all nodes in list order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id.clone()).collect()
    }
}

/// Builds the seven-node document shown when no URL state exists.
pub fn default_tree() -> Tree {
    let mut root = Node::new("a", ROOT_PARENT, "Become a developer");
    root.status = NodeStatus::Doing;

    let mut basics = Node::new("b", "a", "Learn the basics");
    basics.status = NodeStatus::Done;
    basics.done_date = Some("2024-01-15".to_string());

    let mut projects = Node::new("c", "a", "Build projects");
    projects.status = NodeStatus::Doing;

    let mut syntax = Node::new("d", "b", "Syntax");
    syntax.status = NodeStatus::Done;
    syntax.done_date = Some("2023-11-02".to_string());
    syntax.tags = Some(BTreeSet::from(["fundamentals".to_string()]));

    let mut tooling = Node::new("e", "b", "Tooling");
    tooling.status = NodeStatus::Done;
    tooling.done_date = Some("2024-01-10".to_string());

    let mut portfolio = Node::new("f", "c", "Portfolio site");
    portfolio.tags = Some(BTreeSet::from(["web".to_string(), "design".to_string()]));

    let mut open_source = Node::new("g", "c", "First open source PR");
    open_source.status = NodeStatus::Paused;

    Tree::new(
        DEFAULT_TREE_TITLE,
        vec![
            root,
            basics,
            projects,
            syntax,
            tooling,
            portfolio,
            open_source,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::default_tree;

    #[test]
    fn default_tree_has_single_root_and_seven_nodes() {
        let tree = default_tree();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.ids(), vec!["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(tree.roots().count(), 1);
        assert!(tree.nodes.iter().all(|node| !node.collapsed));
    }
}
