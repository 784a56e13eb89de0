//! Core domain logic for the achievement tree editor.
//! The whole document lives in a share URL; this crate owns the tree
//! invariants, undo history, layout, camera and URL codec.

pub mod camera;
pub mod codec;
pub mod config;
pub mod history;
pub mod layout;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use camera::{CameraController, Transform, Viewport};
pub use codec::share_url::{load_from_query, LoadOutcome, ShareState, ViewMode};
pub use codec::{decode, encode, try_decode, DecodeError};
pub use config::{ConfigError, EditorConfig};
pub use history::History;
pub use layout::{compute_layout, Point, TreeLayout};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::node::{Node, NodeId, NodeStatus};
pub use model::tree::{default_tree, Tree};
pub use service::editor_session::{EditorSession, SessionError, SessionResult};
pub use store::tree_ops::NodePatch;
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
