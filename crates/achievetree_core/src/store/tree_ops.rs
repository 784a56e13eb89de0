//! Structural tree operations.
//!
//! # Responsibility
//! - Build children/parent indices over the flat node list.
//! - Generate fresh base-36 ids.
//! - Add, patch, remove and reveal nodes without mutating the input tree.
//!
//! # Invariants
//! - Generated ids are pure lowercase base-36 and never collide with
//!   existing ids.
//! - Parent walks terminate on missing parents and on cycles.
//! - `add_node` does not validate its parent; the editor session does.

use super::{StoreError, StoreResult};
use crate::model::node::{Node, NodeId, NodeStatus};
use crate::model::tree::Tree;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Partial update applied by [`update_node`].
///
/// `None` leaves a field untouched. For optional node fields the inner
/// `Option` is the new value, so `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub status: Option<NodeStatus>,
    pub done_date: Option<Option<String>>,
    pub tags: Option<Option<BTreeSet<String>>>,
    pub collapsed: Option<bool>,
}

impl NodePatch {
    /// Patch that only replaces the title.
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn apply(&self, node: &mut Node) {
        if let Some(title) = &self.title {
            node.title = title.clone();
        }
        if let Some(status) = self.status {
            node.status = status;
        }
        if let Some(done_date) = &self.done_date {
            node.done_date = done_date.clone();
        }
        if let Some(tags) = &self.tags {
            node.tags = tags.clone();
        }
        if let Some(collapsed) = self.collapsed {
            node.collapsed = collapsed;
        }
    }
}

/// Outcome of [`reveal_ancestors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealOutcome {
    /// Tree with every ancestor expanded.
    pub tree: Tree,
    /// `false` when no ancestor was collapsed and `tree` equals the input.
    pub changed: bool,
}

/// Maps each parent id to its direct children, in node list order.
///
/// Roots are listed under the empty parent id.
pub fn children_of(nodes: &[Node]) -> HashMap<&str, Vec<&Node>> {
    let mut map: HashMap<&str, Vec<&Node>> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        map.entry(node.parent_id.as_str()).or_default().push(node);
    }
    map
}

/// Maps each node id to its parent id.
pub fn parent_of(nodes: &[Node]) -> HashMap<&str, &str> {
    nodes
        .iter()
        .map(|node| (node.id.as_str(), node.parent_id.as_str()))
        .collect()
}

/// Returns `max(base36(id)) + 1` in base-36, or `"0"` when no id parses.
///
/// # Errors
/// - Returns `IdSpaceExhausted` when the maximum id is `u64::MAX`.
pub fn next_id(nodes: &[Node]) -> StoreResult<NodeId> {
    let next = match nodes.iter().filter_map(|node| parse_base36(&node.id)).max() {
        None => 0,
        Some(max) => max.checked_add(1).ok_or(StoreError::IdSpaceExhausted)?,
    };
    Ok(to_base36(next))
}

/// Appends a `Todo` node under `parent_id` and returns the new tree and id.
pub fn add_node(tree: &Tree, parent_id: &str, title: &str) -> StoreResult<(Tree, NodeId)> {
    let id = next_id(&tree.nodes)?;
    let mut next = tree.clone();
    next.nodes.push(Node::new(id.clone(), parent_id, title));
    Ok((next, id))
}

/// Applies `patch` to the node with `id`.
pub fn update_node(tree: &Tree, id: &str, patch: &NodePatch) -> StoreResult<Tree> {
    map_node(tree, id, |node| patch.apply(node))
}

/// Flips the `collapsed` flag of one node.
pub fn toggle_collapsed(tree: &Tree, id: &str) -> StoreResult<Tree> {
    map_node(tree, id, |node| node.collapsed = !node.collapsed)
}

/// Sets the status of one node and keeps `done_date` consistent with it.
///
/// Entering `Done` stamps `today` unless a date is already set; leaving
/// `Done` clears the date.
pub fn set_status(tree: &Tree, id: &str, status: NodeStatus, today: &str) -> StoreResult<Tree> {
    map_node(tree, id, |node| {
        node.status = status;
        if status == NodeStatus::Done {
            if node.done_date.is_none() {
                node.done_date = Some(today.to_string());
            }
        } else {
            node.done_date = None;
        }
    })
}

/// Returns the ids of all transitive descendants of `id`, excluding `id`.
pub fn descendants(nodes: &[Node], id: &str) -> HashSet<NodeId> {
    let children = children_of(nodes);
    let mut found = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        for child in children.get(current).into_iter().flatten() {
            if child.id != id && found.insert(child.id.clone()) {
                stack.push(child.id.as_str());
            }
        }
    }
    found
}

/// Removes `id` and its whole subtree; survivors keep their order.
pub fn remove_subtree(tree: &Tree, id: &str) -> StoreResult<Tree> {
    if !tree.contains(id) {
        return Err(StoreError::NodeNotFound(id.to_string()));
    }
    let mut doomed = descendants(&tree.nodes, id);
    doomed.insert(id.to_string());

    Ok(Tree {
        title: tree.title.clone(),
        nodes: tree
            .nodes
            .iter()
            .filter(|node| !doomed.contains(&node.id))
            .cloned()
            .collect(),
    })
}

/// Walks parent links upward from `id`, returning visited ids starting with
/// `id` itself.
///
/// A missing parent counts as reaching a root. A repeated id stops the walk.
pub fn ancestor_chain(nodes: &[Node], id: &str) -> Vec<NodeId> {
    let parents = parent_of(nodes);
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if current.is_empty() || !visited.insert(current) {
            break;
        }
        chain.push(current.to_string());
        cursor = parents.get(current).copied();
    }
    chain
}

/// Clears `collapsed` on every strict ancestor of `id`.
pub fn reveal_ancestors(tree: &Tree, id: &str) -> RevealOutcome {
    let ancestors: HashSet<NodeId> = ancestor_chain(&tree.nodes, id)
        .into_iter()
        .skip(1)
        .collect();
    let needs_reveal = tree
        .nodes
        .iter()
        .any(|node| node.collapsed && ancestors.contains(&node.id));
    if !needs_reveal {
        return RevealOutcome {
            tree: tree.clone(),
            changed: false,
        };
    }

    let mut next = tree.clone();
    for node in &mut next.nodes {
        if ancestors.contains(&node.id) {
            node.collapsed = false;
        }
    }
    RevealOutcome {
        tree: next,
        changed: true,
    }
}

pub(crate) fn parse_base36(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    u64::from_str_radix(value, 36).ok()
}

pub(crate) fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn map_node(tree: &Tree, id: &str, f: impl FnOnce(&mut Node)) -> StoreResult<Tree> {
    let mut next = tree.clone();
    let node = next
        .nodes
        .iter_mut()
        .find(|node| node.id == id)
        .ok_or_else(|| StoreError::NodeNotFound(id.to_string()))?;
    f(node);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::{ancestor_chain, children_of, next_id, parse_base36, to_base36};
    use crate::model::node::Node;

    #[test]
    fn base36_round_trips() {
        for value in [0_u64, 1, 35, 36, 1295, u64::MAX] {
            assert_eq!(parse_base36(&to_base36(value)), Some(value));
        }
        assert_eq!(to_base36(17), "h");
    }

    #[test]
    fn parse_base36_rejects_signs_and_symbols() {
        assert_eq!(parse_base36("+a"), None);
        assert_eq!(parse_base36("node-1"), None);
        assert_eq!(parse_base36(""), None);
    }

    #[test]
    fn next_id_skips_non_numeric_ids() {
        let nodes = vec![Node::new("node-x", "", "x"), Node::new("z", "", "z")];
        assert_eq!(next_id(&nodes).unwrap(), "10");
        assert_eq!(next_id(&[]).unwrap(), "0");
    }

    #[test]
    fn children_of_keeps_list_order() {
        let nodes = vec![
            Node::new("1", "", "root"),
            Node::new("3", "1", "late"),
            Node::new("2", "1", "early"),
        ];
        let map = children_of(&nodes);
        let ids: Vec<&str> = map["1"].iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn ancestor_chain_stops_on_cycle() {
        let nodes = vec![Node::new("1", "2", "one"), Node::new("2", "1", "two")];
        assert_eq!(ancestor_chain(&nodes, "1"), vec!["1", "2"]);
    }
}
