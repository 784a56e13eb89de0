//! Editor session use-case service.
//!
//! # Responsibility
//! - Validate mutation requests above the pure tree store.
//! - Commit every accepted mutation to history, then re-derive layout and
//!   the share query synchronously.
//! - Own selection, view flags, the sticky load error and the camera.
//!
//! # Invariants
//! - Parents must exist when adding children.
//! - Titles are trimmed and must not be blank.
//! - Selection always names an existing node or nothing.
//! - `query()` always reflects the present tree and view flags.

use crate::camera::animation::{AnimationLoop, FrameQueue};
use crate::camera::CameraController;
use crate::codec::budget::{shrink_to_budget, ShrinkReport};
use crate::codec::share_url::{build_query, load_from_query, ShareState, ViewMode};
use crate::codec::DecodeError;
use crate::config::EditorConfig;
use crate::history::History;
use crate::layout::{compute_layout, Point, TreeLayout};
use crate::model::node::{NodeId, NodeStatus, ROOT_PARENT};
use crate::model::tree::{default_tree, Tree};
use crate::store::shrink::normalize_tag_set;
use crate::store::tree_ops::{self, NodePatch};
use crate::store::StoreError;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by editor session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from editor session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Target node does not exist.
    NodeNotFound(NodeId),
    /// Parent node does not exist.
    ParentNotFound(NodeId),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::NodeNotFound(id) => write!(f, "node not found: `{id}`"),
            Self::ParentNotFound(id) => write!(f, "parent node not found: `{id}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NodeNotFound(id) => Self::NodeNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// One open achievement document with its UI state.
pub struct EditorSession {
    config: EditorConfig,
    history: History<Tree>,
    selection: Option<NodeId>,
    share_state: ShareState,
    load_error: Option<DecodeError>,
    layout: TreeLayout,
    query: String,
    camera: CameraController,
    animation: AnimationLoop<u64>,
    frames: FrameQueue,
}

impl EditorSession {
    /// Opens the default document.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_tree(default_tree(), ShareState::default(), config)
    }

    /// Opens the document carried by a share query.
    ///
    /// A rejected payload opens the default document and leaves a sticky
    /// [`load_error`](Self::load_error).
    pub fn from_query(query: &str, config: EditorConfig) -> Self {
        let outcome = load_from_query(query);
        let mut session = Self::with_tree(outcome.tree, outcome.state, config);
        session.load_error = outcome.error;
        info!(
            "event=session_load module=session status={} nodes={} view={}",
            if session.load_error.is_some() {
                "fallback"
            } else {
                "ok"
            },
            session.tree().len(),
            session.share_state.view
        );
        session
    }

    fn with_tree(tree: Tree, share_state: ShareState, config: EditorConfig) -> Self {
        let mut session = Self {
            config,
            history: History::with_limit(tree, config.history_limit),
            selection: None,
            share_state,
            load_error: None,
            layout: TreeLayout::default(),
            query: String::new(),
            camera: CameraController::new(config.camera),
            animation: AnimationLoop::new(),
            frames: FrameQueue::new(),
        };
        session.refresh();
        session
    }

    /// Replaces the document with a freshly loaded query and drops history.
    pub fn reload(&mut self, query: &str) {
        let outcome = load_from_query(query);
        self.history.reset(outcome.tree);
        self.share_state = outcome.state;
        self.load_error = outcome.error;
        self.selection = None;
        self.refresh();
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Present tree.
    pub fn tree(&self) -> &Tree {
        self.history.present()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn share_state(&self) -> ShareState {
        self.share_state
    }

    /// Current share query, kept in sync with every settled change.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Sticky decode failure from the last load.
    pub fn load_error(&self) -> Option<&DecodeError> {
        self.load_error.as_ref()
    }

    pub fn dismiss_load_error(&mut self) {
        self.load_error = None;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Selects one node, or clears the selection with `None`.
    pub fn select(&mut self, id: Option<&str>) -> SessionResult<()> {
        if let Some(id) = id {
            self.ensure_node(id)?;
        }
        self.selection = id.map(str::to_string);
        Ok(())
    }

    /// Adds a child under `parent_id`, selects it and focuses the camera on
    /// it. A collapsed parent is expanded in the same history step.
    pub fn add_child(&mut self, parent_id: &str, title: &str) -> SessionResult<NodeId> {
        let title = normalize_title(title)?;
        if !self.tree().contains(parent_id) {
            return Err(SessionError::ParentNotFound(parent_id.to_string()));
        }
        let (mut next, id) = tree_ops::add_node(self.tree(), parent_id, &title)?;
        if next.node(parent_id).is_some_and(|parent| parent.collapsed) {
            next = tree_ops::update_node(
                &next,
                parent_id,
                &NodePatch {
                    collapsed: Some(false),
                    ..NodePatch::default()
                },
            )?;
        }
        self.commit(next, "node_add", &id);
        self.selection = Some(id.clone());
        self.focus_camera(&id);
        Ok(id)
    }

    /// Adds a new root and selects it.
    pub fn add_root(&mut self, title: &str) -> SessionResult<NodeId> {
        let title = normalize_title(title)?;
        let (next, id) = tree_ops::add_node(self.tree(), ROOT_PARENT, &title)?;
        self.commit(next, "root_add", &id);
        self.selection = Some(id.clone());
        self.focus_camera(&id);
        Ok(id)
    }

    /// Applies a patch. Titles are trimmed and tags normalized first.
    ///
    /// An empty patch is accepted and records nothing.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> SessionResult<()> {
        self.ensure_node(id)?;
        if patch.is_empty() {
            return Ok(());
        }
        let mut patch = patch;
        if let Some(title) = patch.title.take() {
            patch.title = Some(normalize_title(&title)?);
        }
        patch.tags = patch.tags.take().map(|tags| {
            tags.map(|tags| normalize_tag_set(tags.iter().map(String::as_str)))
                .filter(|tags| !tags.is_empty())
        });
        let next = tree_ops::update_node(self.tree(), id, &patch)?;
        self.commit(next, "node_update", id);
        Ok(())
    }

    /// Renames one node.
    pub fn rename(&mut self, id: &str, title: &str) -> SessionResult<()> {
        self.update_node(id, NodePatch::title(title))
    }

    /// Changes status; `today` stamps `done_date` when entering `Done`.
    pub fn set_status(&mut self, id: &str, status: NodeStatus, today: &str) -> SessionResult<()> {
        let next = tree_ops::set_status(self.tree(), id, status, today)?;
        self.commit(next, "node_status", id);
        Ok(())
    }

    /// Deletes `id` with its subtree. Returns the number of removed nodes.
    pub fn delete_subtree(&mut self, id: &str) -> SessionResult<usize> {
        let before = self.tree().len();
        let next = tree_ops::remove_subtree(self.tree(), id)?;
        let removed = before - next.len();
        self.commit(next, "subtree_delete", id);
        Ok(removed)
    }

    /// Collapses or expands one node.
    pub fn toggle_collapse(&mut self, id: &str) -> SessionResult<()> {
        let next = tree_ops::toggle_collapsed(self.tree(), id)?;
        self.commit(next, "node_toggle", id);
        Ok(())
    }

    /// Focus request from any view: expands hidden ancestors (one history
    /// step, only if something was collapsed), selects the node and centers
    /// the camera on it.
    ///
    /// Returns whether the camera moved.
    pub fn focus_node(&mut self, id: &str) -> SessionResult<bool> {
        self.ensure_node(id)?;
        let revealed = tree_ops::reveal_ancestors(self.tree(), id);
        if revealed.changed {
            self.commit(revealed.tree, "node_reveal", id);
        }
        self.selection = Some(id.to_string());
        Ok(self.focus_camera(id))
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            self.refresh();
        }
        moved
    }

    /// Changes the active view without recording history.
    pub fn set_view(&mut self, view: ViewMode) {
        self.share_state.view = view;
        self.refresh_query();
    }

    pub fn set_json_display(&mut self, enabled: bool) {
        self.share_state.json_display = enabled;
        self.refresh_query();
    }

    pub fn set_share_flag(&mut self, enabled: bool) {
        self.share_state.share = enabled;
        self.refresh_query();
    }

    /// Share query shrunk to the configured URL budget. The open document
    /// is left untouched.
    pub fn shrunk_query(&self) -> ShrinkReport {
        shrink_to_budget(self.tree(), &self.share_state, &self.config.shrink)
    }

    /// Viewport size change; may trigger the one-time auto-fit.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
        self.try_auto_fit();
    }

    pub fn pointer_down(&mut self, on_node: bool) -> bool {
        self.camera.pointer_down(on_node)
    }

    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        self.camera.pointer_move(dx, dy);
        self.kick_animation();
    }

    pub fn pointer_up(&mut self) {
        self.camera.pointer_up();
        self.kick_animation();
    }

    pub fn wheel(&mut self, delta_y: f64, anchor: Point) {
        self.camera.wheel(delta_y, anchor);
        self.kick_animation();
    }

    /// Returns whether the host should deliver another animation frame.
    pub fn wants_frame(&self) -> bool {
        !self.frames.queued().is_empty()
    }

    /// Delivers one animation frame. Returns whether another is wanted.
    pub fn run_frame(&mut self) -> bool {
        if self.frames.take_next().is_some() {
            self.animation.on_frame(&mut self.camera, &mut self.frames);
        }
        self.wants_frame()
    }

    /// Cancels pending frames, e.g. when the host view goes away.
    pub fn stop_animation(&mut self) {
        self.animation.stop(&mut self.frames);
    }

    fn ensure_node(&self, id: &str) -> SessionResult<()> {
        if self.tree().contains(id) {
            Ok(())
        } else {
            Err(SessionError::NodeNotFound(id.to_string()))
        }
    }

    fn commit(&mut self, next: Tree, event: &str, node_id: &str) {
        self.history.commit(next);
        debug!(
            "event={} module=session status=ok node_id={} nodes={} undo_depth={}",
            event,
            node_id,
            self.tree().len(),
            self.history.past_len()
        );
        self.refresh();
    }

    fn refresh(&mut self) {
        self.layout = compute_layout(self.history.present(), &self.config.layout);
        let selection_gone = self
            .selection
            .as_deref()
            .is_some_and(|id| !self.history.present().contains(id));
        if selection_gone {
            self.selection = None;
        }
        self.refresh_query();
        self.try_auto_fit();
    }

    fn refresh_query(&mut self) {
        self.query = build_query(self.history.present(), &self.share_state);
        debug!(
            "event=url_rebuild module=session status=ok query_len={}",
            self.query.len()
        );
    }

    fn focus_camera(&mut self, id: &str) -> bool {
        let moved = self.camera.focus_node(id, self.layout.positions());
        self.kick_animation();
        moved
    }

    fn try_auto_fit(&mut self) {
        if self.camera.auto_fit(self.layout.positions().values()) {
            self.kick_animation();
        }
    }

    fn kick_animation(&mut self) {
        self.animation.ensure_running(&self.camera, &mut self.frames);
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn normalize_title(value: &str) -> SessionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}
