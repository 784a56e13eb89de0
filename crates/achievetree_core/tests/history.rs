use achievetree_core::history::DEFAULT_HISTORY_LIMIT;
use achievetree_core::store::tree_ops::add_node;
use achievetree_core::{default_tree, History};

#[test]
fn undo_undo_redo_walks_snapshots() {
    let mut history = History::new("A");
    history.commit("B");
    history.commit("C");

    assert!(history.undo());
    assert_eq!(*history.present(), "B");
    assert!(history.undo());
    assert_eq!(*history.present(), "A");
    assert!(history.redo());
    assert_eq!(*history.present(), "B");
}

#[test]
fn bounded_history_exhausts_before_first_state() {
    let first = default_tree();
    let mut history = History::new(first.clone());
    let mut tree = first.clone();
    for index in 0..DEFAULT_HISTORY_LIMIT + 10 {
        let (next, _) = add_node(&tree, "a", &format!("step {index}")).unwrap();
        history.commit(next.clone());
        tree = next;
    }
    assert_eq!(history.past_len(), DEFAULT_HISTORY_LIMIT);

    let mut undone = 0;
    while history.undo() {
        undone += 1;
    }
    assert_eq!(undone, DEFAULT_HISTORY_LIMIT);
    assert_ne!(history.present(), &first);
    assert_eq!(history.present().len(), first.len() + 10);
    assert!(!history.can_undo());
    assert_eq!(history.future_len(), DEFAULT_HISTORY_LIMIT);
}

#[test]
fn undo_and_redo_at_the_edges_are_noops() {
    let mut history = History::with_limit(1_u32, 3);
    assert!(!history.undo());
    assert!(!history.redo());
    assert_eq!(*history.present(), 1);

    history.commit(2);
    history.undo();
    history.commit(3);
    assert!(!history.can_redo());
    assert_eq!(history.limit(), 3);
}
