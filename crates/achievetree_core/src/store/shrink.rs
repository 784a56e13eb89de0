//! Size-reducing rewrites of tree data.
//!
//! # Responsibility
//! - Renumber ids into a dense base-36 sequence.
//! - Normalize tag sets.
//! - Truncate long titles (lossy).
//!
//! # Invariants
//! - Renumbering preserves shape: same node count, same parent/child edges.
//!   A parent link naming no node becomes a root link, so it can never
//!   collide with a freshly assigned id.
//! - Truncated titles never exceed the requested character limit.
//! - Normalized tags are trimmed, single-spaced, non-empty and unique; an
//!   empty result removes the field.

use super::tree_ops::{children_of, to_base36};
use crate::model::node::{NodeId, ROOT_PARENT};
use crate::model::tree::Tree;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Default title length limit for [`truncate_titles`].
pub const DEFAULT_TITLE_MAX_CHARS: usize = 16;

const ELLIPSIS: &str = "...";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Reassigns ids `0, 1, 2, …` in pre-order (roots first, then children in
/// list order) and remaps parent links through the same table.
///
/// Nodes unreachable from a root keep their relative order and are numbered
/// after the reachable ones. Parent links that name no node in the tree are
/// rewritten to the root marker.
pub fn renumber_ids(tree: &Tree) -> Tree {
    let children = children_of(&tree.nodes);
    let mut order: Vec<&str> = Vec::with_capacity(tree.nodes.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(tree.nodes.len());

    let mut stack: Vec<&str> = children
        .get(ROOT_PARENT)
        .map(|roots| roots.iter().rev().map(|node| node.id.as_str()).collect())
        .unwrap_or_default();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(kids) = children.get(id) {
            stack.extend(kids.iter().rev().map(|node| node.id.as_str()));
        }
    }
    for node in &tree.nodes {
        if seen.insert(node.id.as_str()) {
            order.push(node.id.as_str());
        }
    }

    let remap: HashMap<&str, NodeId> = order
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, to_base36(index as u64)))
        .collect();

    let mut next = tree.clone();
    for node in &mut next.nodes {
        if let Some(id) = remap.get(node.id.as_str()) {
            node.id = id.clone();
        }
        if node.parent_id == ROOT_PARENT {
            continue;
        }
        node.parent_id = match remap.get(node.parent_id.as_str()) {
            Some(parent) => parent.clone(),
            None => ROOT_PARENT.to_string(),
        };
    }
    next
}

/// Normalizes one tag; returns `None` when nothing is left.
pub fn normalize_tag(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Normalizes a tag list into a set.
pub fn normalize_tag_set<'a>(values: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    values.into_iter().filter_map(normalize_tag).collect()
}

/// Normalizes every node's tags and drops empty tag sets.
pub fn normalize_tags(tree: &Tree) -> Tree {
    let mut next = tree.clone();
    for node in &mut next.nodes {
        if let Some(tags) = node.tags.take() {
            let normalized = normalize_tag_set(tags.iter().map(String::as_str));
            node.tags = (!normalized.is_empty()).then_some(normalized);
        }
    }
    next
}

/// Shortens titles longer than `max_chars` to `max_chars - 3` characters
/// followed by `...`.
///
/// Limits of 3 or less leave no room for the marker; titles are then cut to
/// `max_chars` characters without it.
pub fn truncate_titles(tree: &Tree, max_chars: usize) -> Tree {
    let mut next = tree.clone();
    for node in &mut next.nodes {
        if node.title.chars().count() <= max_chars {
            continue;
        }
        node.title = if max_chars > ELLIPSIS.len() {
            let mut title: String = node
                .title
                .chars()
                .take(max_chars - ELLIPSIS.len())
                .collect();
            title.push_str(ELLIPSIS);
            title
        } else {
            node.title.chars().take(max_chars).collect()
        };
    }
    next
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, renumber_ids, truncate_titles};
    use crate::model::node::{Node, ROOT_PARENT};
    use crate::model::tree::Tree;

    #[test]
    fn normalize_tag_collapses_inner_whitespace() {
        assert_eq!(normalize_tag("  deep \t work\n"), Some("deep work".to_string()));
        assert_eq!(normalize_tag(" \n "), None);
    }

    #[test]
    fn renumber_uses_preorder_across_roots() {
        let tree = Tree::new(
            "t",
            vec![
                Node::new("x", "", "root one"),
                Node::new("y", "", "root two"),
                Node::new("z", "x", "child of one"),
            ],
        );
        let renumbered = renumber_ids(&tree);
        let pairs: Vec<(&str, &str)> = renumbered
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.parent_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("0", ""), ("2", ""), ("1", "0")]);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let tree = Tree::new("t", vec![Node::new("0", "", "ääääääääääääääääää")]);
        let truncated = truncate_titles(&tree, 16);
        assert_eq!(truncated.nodes[0].title.chars().count(), 16);
        assert!(truncated.nodes[0].title.ends_with("..."));
    }

    #[test]
    fn renumber_turns_dangling_parent_into_root() {
        let tree = Tree::new(
            "t",
            vec![Node::new("a", "", "root"), Node::new("b", "1", "orphan")],
        );
        let renumbered = renumber_ids(&tree);
        let orphan = &renumbered.nodes[1];
        assert_eq!(orphan.id, "1");
        assert_eq!(orphan.parent_id, ROOT_PARENT);
        assert_ne!(orphan.id, orphan.parent_id);
    }

    #[test]
    fn renumber_keeps_cycle_links_inside_the_cycle() {
        let tree = Tree::new(
            "t",
            vec![
                Node::new("r", "", "root"),
                Node::new("p", "q", "loop one"),
                Node::new("q", "p", "loop two"),
            ],
        );
        let renumbered = renumber_ids(&tree);
        let pairs: Vec<(&str, &str)> = renumbered
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.parent_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("0", ""), ("1", "2"), ("2", "1")]);
    }

    #[test]
    fn truncate_never_exceeds_tiny_limits() {
        let tree = Tree::new("t", vec![Node::new("0", "", "abcdef")]);
        for max_chars in 0..=4 {
            let truncated = truncate_titles(&tree, max_chars);
            assert!(truncated.nodes[0].title.chars().count() <= max_chars);
        }
        assert_eq!(truncate_titles(&tree, 2).nodes[0].title, "ab");
        assert_eq!(truncate_titles(&tree, 4).nodes[0].title, "a...");
    }
}
