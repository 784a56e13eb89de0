//! Achievement tree domain model.
//!
//! # Responsibility
//! - Define the canonical node/tree shapes shared by store, layout and codec.
//! - Provide the built-in default document used on first load and fallback.
//!
//! # Invariants
//! - A tree is a strict forest: every node has at most one parent.
//! - `parent_id == ""` marks a root.
//! - Node ids are unique within one tree.

pub mod node;
pub mod tree;
