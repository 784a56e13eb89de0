//! Tree store: pure structural operations over [`Tree`](crate::model::tree::Tree).
//!
//! # Responsibility
//! - Derive indices (children map, parent map) from the flat node list.
//! - Provide mutation functions that return new trees and never mutate input.
//! - Provide the shrink transforms used to keep share URLs short.
//!
//! # Invariants
//! - Functions hold no hidden state; equal inputs give equal outputs.
//! - Survivor order is preserved by every filtering operation.

pub mod shrink;
pub mod tree_ops;

use crate::model::node::NodeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by tree store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from tree store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Target node does not exist.
    NodeNotFound(NodeId),
    /// The next base-36 id would overflow `u64`.
    IdSpaceExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: `{id}`"),
            Self::IdSpaceExhausted => write!(f, "base-36 node id space exhausted"),
        }
    }
}

impl Error for StoreError {}
