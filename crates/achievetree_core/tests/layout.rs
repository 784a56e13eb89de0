use achievetree_core::config::LayoutConfig;
use achievetree_core::model::node::Node;
use achievetree_core::store::tree_ops::toggle_collapsed;
use achievetree_core::{compute_layout, default_tree, Tree};

fn y_of(layout: &achievetree_core::TreeLayout, id: &str) -> f64 {
    layout.position(id).unwrap().y
}

#[test]
fn depth_maps_to_x_and_siblings_spread_on_y() {
    let layout = compute_layout(&default_tree(), &LayoutConfig::default());
    assert_eq!(layout.len(), 7);
    assert_eq!(layout.edges.len(), 6);

    assert_eq!(layout.position("a").unwrap().x, 0.0);
    assert_eq!(layout.position("b").unwrap().x, 256.0);
    assert_eq!(layout.position("d").unwrap().x, 512.0);

    // Siblings one unit apart, cousins two.
    assert_eq!(y_of(&layout, "e") - y_of(&layout, "d"), 96.0);
    assert_eq!(y_of(&layout, "f") - y_of(&layout, "e"), 192.0);
    assert_eq!(y_of(&layout, "g") - y_of(&layout, "f"), 96.0);

    // Parents centered over their children.
    assert_eq!(y_of(&layout, "b"), (y_of(&layout, "d") + y_of(&layout, "e")) / 2.0);
    assert_eq!(y_of(&layout, "a"), (y_of(&layout, "b") + y_of(&layout, "c")) / 2.0);
}

#[test]
fn collapsed_subtrees_are_hidden_but_node_stays() {
    let tree = toggle_collapsed(&default_tree(), "b").unwrap();
    let layout = compute_layout(&tree, &LayoutConfig::default());
    assert_eq!(layout.len(), 5);
    assert!(layout.position("b").is_some());
    assert!(layout.position("d").is_none());
    assert!(layout
        .edges
        .iter()
        .all(|edge| edge.source != "b"));
}

#[test]
fn multiple_roots_share_depth_zero() {
    let tree = Tree::new(
        "forest",
        vec![
            Node::new("0", "", "one"),
            Node::new("1", "", "two"),
            Node::new("2", "1", "child"),
        ],
    );
    let layout = compute_layout(&tree, &LayoutConfig::default());
    assert_eq!(layout.position("0").unwrap().x, 0.0);
    assert_eq!(layout.position("1").unwrap().x, 0.0);
    assert!(y_of(&layout, "1") > y_of(&layout, "0"));
    let root = layout.nodes.iter().find(|node| node.id == "1").unwrap();
    assert_eq!(root.depth, 0);
    assert_eq!(root.parent_id, None);
}

#[test]
fn empty_tree_has_no_bounds() {
    let layout = compute_layout(&Tree::default(), &LayoutConfig::default());
    assert!(layout.is_empty());
    assert!(layout.bounds().is_none());
}

#[test]
fn spacing_comes_from_config() {
    let config = LayoutConfig {
        sibling_spacing: 10.0,
        depth_spacing: 100.0,
    };
    let layout = compute_layout(&default_tree(), &config);
    assert_eq!(layout.position("d").unwrap().x, 200.0);
    assert_eq!(y_of(&layout, "e") - y_of(&layout, "d"), 10.0);
}
