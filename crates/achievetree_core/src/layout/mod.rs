//! Layout engine: visible forest to positioned nodes and edges.
//!
//! # Responsibility
//! - Build the nested visible view, skipping children of collapsed nodes.
//! - Place it with the tidy tree algorithm under a synthetic super-root.
//! - Map depth to the horizontal axis and sibling order to the vertical one.
//!
//! # Invariants
//! - Output holds no persistent state; it is rebuilt from the tree.
//! - The super-root never appears in nodes, edges or positions.
//! - Nodes unreachable from a root are left out, never walked twice.

mod tidy;

use crate::config::LayoutConfig;
use crate::model::node::{Node, NodeId, ROOT_PARENT};
use crate::model::tree::Tree;
use crate::store::tree_ops::children_of;
use std::collections::{HashMap, HashSet};

/// World-space point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of laid-out node anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Smallest box containing every point; `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => Bounds {
                    min: point,
                    max: point,
                },
                Some(Bounds { min, max }) => Bounds {
                    min: Point::new(min.x.min(point.x), min.y.min(point.y)),
                    max: Point::new(max.x.max(point.x), max.y.max(point.y)),
                },
            })
        })
    }
}

/// One visible node with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeId,
    pub data: Node,
    pub x: f64,
    pub y: f64,
    /// 0 for roots.
    pub depth: usize,
    /// `None` for roots.
    pub parent_id: Option<NodeId>,
}

/// Parent to child link between two visible nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Positioned visible forest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    /// Visible nodes in pre-order.
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    positions: HashMap<NodeId, Point>,
}

impl TreeLayout {
    /// Position of a visible node.
    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Id to position lookup for every visible node.
    pub fn positions(&self) -> &HashMap<NodeId, Point> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounding box of all visible nodes.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.nodes.iter().map(|node| Point::new(node.x, node.y)))
    }
}

struct Entry<'a> {
    node: &'a Node,
    depth: usize,
    parent: usize,
}

/// Lays out the visible part of `tree`.
pub fn compute_layout(tree: &Tree, config: &LayoutConfig) -> TreeLayout {
    let children = children_of(&tree.nodes);

    // Index 0 is the synthetic super-root; real entries start at 1.
    let mut entries: Vec<Option<Entry<'_>>> = vec![None];
    let mut child_lists: Vec<Vec<usize>> = vec![Vec::new()];
    let mut visited: HashSet<&str> = HashSet::new();

    let mut stack: Vec<(&Node, usize, usize)> = children
        .get(ROOT_PARENT)
        .map(|roots| roots.iter().rev().map(|node| (*node, 0, 0)).collect())
        .unwrap_or_default();
    while let Some((node, parent, depth)) = stack.pop() {
        if !visited.insert(node.id.as_str()) {
            continue;
        }
        let index = entries.len();
        entries.push(Some(Entry {
            node,
            depth,
            parent,
        }));
        child_lists.push(Vec::new());
        child_lists[parent].push(index);

        if node.collapsed {
            continue;
        }
        if let Some(kids) = children.get(node.id.as_str()) {
            stack.extend(kids.iter().rev().map(|kid| (*kid, index, depth + 1)));
        }
    }

    if entries.len() == 1 {
        return TreeLayout::default();
    }

    let sibling_axis = tidy::tidy_positions(&child_lists);
    let mut layout = TreeLayout {
        nodes: Vec::with_capacity(entries.len() - 1),
        edges: Vec::new(),
        positions: HashMap::with_capacity(entries.len() - 1),
    };

    for (index, entry) in entries.iter().enumerate() {
        let Some(entry) = entry else {
            continue;
        };
        let x = entry.depth as f64 * config.depth_spacing;
        let y = sibling_axis[index] * config.sibling_spacing;
        let parent_id = entries[entry.parent]
            .as_ref()
            .map(|parent| parent.node.id.clone());
        if let Some(source) = &parent_id {
            layout.edges.push(LayoutEdge {
                source: source.clone(),
                target: entry.node.id.clone(),
            });
        }
        layout
            .positions
            .insert(entry.node.id.clone(), Point::new(x, y));
        layout.nodes.push(LayoutNode {
            id: entry.node.id.clone(),
            data: entry.node.clone(),
            x,
            y,
            depth: entry.depth,
            parent_id,
        });
    }
    layout
}
