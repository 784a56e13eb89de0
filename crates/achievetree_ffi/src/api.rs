//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the editor session to Dart via FRB as sync, use-case level calls.
//! - Convert core errors into response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide session; calls are serialized by a mutex.
//! - Every mutating call returns the fresh share query.

use achievetree_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    EditorConfig, EditorSession, NodePatch, NodeStatus, Point, ViewMode,
};
use log::warn;
use once_cell::sync::OnceCell;
use std::sync::Mutex;

const CONFIG_PATH_ENV: &str = "ACHIEVETREE_CONFIG";

static SESSION: Mutex<Option<EditorSession>> = Mutex::new(None);
static SESSION_CONFIG: OnceCell<EditorConfig> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic response envelope for session calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Node created or focused by the call, when any.
    pub node_id: Option<String>,
    /// Current share query (`v=..&d=..`), without leading `?`.
    pub query: String,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

/// One visible node, positioned in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNodeItem {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    /// `todo|doing|done|paused`.
    pub status: String,
    pub done_date: Option<String>,
    pub tags: Vec<String>,
    pub collapsed: bool,
    pub selected: bool,
    pub x: f64,
    pub y: f64,
    pub depth: u32,
}

/// Layout snapshot for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResponse {
    pub title: String,
    pub nodes: Vec<LayoutNodeItem>,
    /// Sticky load error, until the host dismisses it.
    pub load_error: Option<String>,
}

/// Camera state after one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub x: f64,
    pub y: f64,
    pub k: f64,
    /// Whether the host should schedule another frame.
    pub wants_frame: bool,
}

/// Replaces the session with the document carried by `query`.
///
/// A rejected payload still opens (the default tree) with `ok=false` and the
/// decode error as message; `session_layout` keeps reporting it.
#[flutter_rust_bridge::frb(sync)]
pub fn session_load(query: String) -> SessionResponse {
    let config = resolve_session_config();
    match SESSION.lock() {
        Ok(mut guard) => {
            let session = EditorSession::from_query(&query, config);
            let message = match session.load_error() {
                Some(err) => format!("session_load fell back to default tree: {err}"),
                None => "Loaded.".to_string(),
            };
            let ok = session.load_error().is_none();
            let response = snapshot(&session, ok, None, message);
            *guard = Some(session);
            response
        }
        Err(_) => lock_failure("session_load"),
    }
}

/// Adds a child under `parent_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_add_child(parent_id: String, title: String) -> SessionResponse {
    with_session("session_add_child", |session| {
        session
            .add_child(&parent_id, &title)
            .map(|id| (Some(id), "Node added.".to_string()))
    })
}

/// Adds a new root.
#[flutter_rust_bridge::frb(sync)]
pub fn session_add_root(title: String) -> SessionResponse {
    with_session("session_add_root", |session| {
        session
            .add_root(&title)
            .map(|id| (Some(id), "Root added.".to_string()))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_rename(node_id: String, title: String) -> SessionResponse {
    with_session("session_rename", |session| {
        session
            .rename(&node_id, &title)
            .map(|()| (Some(node_id.clone()), "Node renamed.".to_string()))
    })
}

/// Sets status by label. `today` (`YYYY-MM-DD`) stamps completion.
#[flutter_rust_bridge::frb(sync)]
pub fn session_set_status(node_id: String, status: String, today: String) -> SessionResponse {
    let Some(status) = NodeStatus::parse_label(&status) else {
        return failure_with_session(
            "session_set_status",
            format!("unknown status `{}`; expected todo|doing|done|paused", status.trim()),
        );
    };
    with_session("session_set_status", |session| {
        session
            .set_status(&node_id, status, today.trim())
            .map(|()| (Some(node_id.clone()), "Status updated.".to_string()))
    })
}

/// Patches tags, completion date and collapse flag of one node.
///
/// Input semantics:
/// - `None` leaves a field untouched.
/// - `tags`: replaces the tag set; an empty or all-blank list removes it.
/// - `done_date`: replaces the date; a blank string removes it.
/// - Status changes go through `session_set_status`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_update_node(
    node_id: String,
    title: Option<String>,
    tags: Option<Vec<String>>,
    done_date: Option<String>,
    collapsed: Option<bool>,
) -> SessionResponse {
    let patch = NodePatch {
        title,
        status: None,
        done_date: done_date.map(|value| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }),
        tags: tags.map(|tags| Some(tags.into_iter().collect())),
        collapsed,
    };
    with_session("session_update_node", |session| {
        session
            .update_node(&node_id, patch)
            .map(|()| (Some(node_id.clone()), "Node updated.".to_string()))
    })
}

/// Selects `node_id`, or clears the selection for `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_select(node_id: Option<String>) -> SessionResponse {
    with_session("session_select", |session| {
        session
            .select(node_id.as_deref())
            .map(|()| (node_id.clone(), "Selection updated.".to_string()))
    })
}

/// Deletes a node with its whole subtree.
#[flutter_rust_bridge::frb(sync)]
pub fn session_delete(node_id: String) -> SessionResponse {
    with_session("session_delete", |session| {
        session
            .delete_subtree(&node_id)
            .map(|removed| (None, format!("Deleted {removed} node(s).")))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_toggle_collapse(node_id: String) -> SessionResponse {
    with_session("session_toggle_collapse", |session| {
        session
            .toggle_collapse(&node_id)
            .map(|()| (Some(node_id.clone()), "Toggled.".to_string()))
    })
}

/// Focus request: reveals, selects and centers the node.
#[flutter_rust_bridge::frb(sync)]
pub fn session_focus(node_id: String) -> SessionResponse {
    with_session("session_focus", |session| {
        session
            .focus_node(&node_id)
            .map(|_| (Some(node_id.clone()), "Focused.".to_string()))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_undo() -> SessionResponse {
    with_session("session_undo", |session| {
        let message = if session.undo() {
            "Undone."
        } else {
            "Nothing to undo."
        };
        Ok((None, message.to_string()))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_redo() -> SessionResponse {
    with_session("session_redo", |session| {
        let message = if session.redo() {
            "Redone."
        } else {
            "Nothing to redo."
        };
        Ok((None, message.to_string()))
    })
}

/// Switches the view mode (`map|explore|timeline`).
#[flutter_rust_bridge::frb(sync)]
pub fn session_set_view(view: String) -> SessionResponse {
    let Some(mode) = ViewMode::parse(view.trim()) else {
        return failure_with_session(
            "session_set_view",
            format!("unknown view `{}`; expected map|explore|timeline", view.trim()),
        );
    };
    with_session("session_set_view", |session| {
        session.set_view(mode);
        Ok((None, "View updated.".to_string()))
    })
}

/// Sets the JSON-display and share flags carried by the query.
#[flutter_rust_bridge::frb(sync)]
pub fn session_set_flags(json_display: bool, share: bool) -> SessionResponse {
    with_session("session_set_flags", |session| {
        session.set_json_display(json_display);
        session.set_share_flag(share);
        Ok((None, "Flags updated.".to_string()))
    })
}

/// Clears the sticky load error reported by `session_layout`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_dismiss_load_error() -> SessionResponse {
    with_session("session_dismiss_load_error", |session| {
        session.dismiss_load_error();
        Ok((None, "Load error dismissed.".to_string()))
    })
}

/// Share query shrunk to the configured URL budget.
///
/// `ok=false` when even the fully shrunk query exceeds the budget; the
/// query is returned anyway.
#[flutter_rust_bridge::frb(sync)]
pub fn session_share_url() -> SessionResponse {
    match SESSION.lock() {
        Ok(mut guard) => {
            let session = guard.get_or_insert_with(new_session);
            let report = session.shrunk_query();
            let steps: Vec<&str> = report.applied.iter().map(|step| step.as_str()).collect();
            let message = if report.fits {
                format!("Share URL ready (steps: {}).", steps.join(","))
            } else {
                format!(
                    "session_share_url exceeds budget of {} bytes",
                    session.config().shrink.url_budget
                )
            };
            SessionResponse {
                ok: report.fits,
                node_id: None,
                query: report.query,
                can_undo: session.can_undo(),
                can_redo: session.can_redo(),
                message,
            }
        }
        Err(_) => lock_failure("session_share_url"),
    }
}

/// Visible nodes with positions, for rendering.
#[flutter_rust_bridge::frb(sync)]
pub fn session_layout() -> LayoutResponse {
    match SESSION.lock() {
        Ok(mut guard) => {
            let session = guard.get_or_insert_with(new_session);
            let selection = session.selection();
            let nodes = session
                .layout()
                .nodes
                .iter()
                .map(|node| LayoutNodeItem {
                    id: node.id.clone(),
                    parent_id: node.parent_id.clone(),
                    title: node.data.title.clone(),
                    status: node.data.status.label().to_string(),
                    done_date: node.data.done_date.clone(),
                    tags: node
                        .data
                        .tags
                        .iter()
                        .flatten()
                        .cloned()
                        .collect(),
                    collapsed: node.data.collapsed,
                    selected: selection == Some(node.id.as_str()),
                    x: node.x,
                    y: node.y,
                    depth: u32::try_from(node.depth).unwrap_or(u32::MAX),
                })
                .collect();
            LayoutResponse {
                title: session.tree().title.clone(),
                nodes,
                load_error: session.load_error().map(ToString::to_string),
            }
        }
        Err(_) => LayoutResponse {
            title: String::new(),
            nodes: Vec::new(),
            load_error: Some("session lock poisoned".to_string()),
        },
    }
}

/// Records the viewport size; the first call with a non-empty tree fits it
/// into view.
#[flutter_rust_bridge::frb(sync)]
pub fn session_set_viewport(width: f64, height: f64) -> CameraFrame {
    camera_call(|session| session.set_viewport(width, height))
}

/// Pointer press on the canvas. Presses on a node never start a drag.
#[flutter_rust_bridge::frb(sync)]
pub fn session_pointer_down(on_node: bool) -> CameraFrame {
    camera_call(|session| {
        session.pointer_down(on_node);
    })
}

/// Pointer delta in screen pixels; pans only while dragging.
#[flutter_rust_bridge::frb(sync)]
pub fn session_pointer_move(dx: f64, dy: f64) -> CameraFrame {
    camera_call(|session| session.pointer_move(dx, dy))
}

/// Ends a drag; momentum keeps frames coming until it decays.
#[flutter_rust_bridge::frb(sync)]
pub fn session_pointer_up() -> CameraFrame {
    camera_call(|session| session.pointer_up())
}

/// Wheel zoom around the screen point `(anchor_x, anchor_y)`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_wheel(delta_y: f64, anchor_x: f64, anchor_y: f64) -> CameraFrame {
    camera_call(|session| session.wheel(delta_y, Point::new(anchor_x, anchor_y)))
}

/// Runs one animation frame and returns the transform to render.
#[flutter_rust_bridge::frb(sync)]
pub fn session_camera_frame() -> CameraFrame {
    camera_call(|session| {
        session.run_frame();
    })
}

/// Cancels the pending animation frame, e.g. when the view is hidden.
#[flutter_rust_bridge::frb(sync)]
pub fn session_stop_animation() -> CameraFrame {
    camera_call(|session| session.stop_animation())
}

fn camera_call(f: impl FnOnce(&mut EditorSession)) -> CameraFrame {
    match SESSION.lock() {
        Ok(mut guard) => {
            let session = guard.get_or_insert_with(new_session);
            f(session);
            let current = session.camera().current();
            CameraFrame {
                x: current.x,
                y: current.y,
                k: current.k,
                wants_frame: session.wants_frame(),
            }
        }
        Err(_) => CameraFrame {
            x: 0.0,
            y: 0.0,
            k: 1.0,
            wants_frame: false,
        },
    }
}

fn with_session(
    op: &str,
    f: impl FnOnce(
        &mut EditorSession,
    ) -> achievetree_core::SessionResult<(Option<String>, String)>,
) -> SessionResponse {
    match SESSION.lock() {
        Ok(mut guard) => {
            let session = guard.get_or_insert_with(new_session);
            match f(session) {
                Ok((node_id, message)) => snapshot(session, true, node_id, message),
                Err(err) => snapshot(session, false, None, format!("{op} failed: {err}")),
            }
        }
        Err(_) => lock_failure(op),
    }
}

fn failure_with_session(op: &str, message: String) -> SessionResponse {
    match SESSION.lock() {
        Ok(mut guard) => {
            let session = guard.get_or_insert_with(new_session);
            snapshot(session, false, None, format!("{op} failed: {message}"))
        }
        Err(_) => lock_failure(op),
    }
}

fn snapshot(
    session: &EditorSession,
    ok: bool,
    node_id: Option<String>,
    message: String,
) -> SessionResponse {
    SessionResponse {
        ok,
        node_id,
        query: session.query().to_string(),
        can_undo: session.can_undo(),
        can_redo: session.can_redo(),
        message,
    }
}

fn lock_failure(op: &str) -> SessionResponse {
    SessionResponse {
        ok: false,
        node_id: None,
        query: String::new(),
        can_undo: false,
        can_redo: false,
        message: format!("{op} failed: session lock poisoned"),
    }
}

fn new_session() -> EditorSession {
    EditorSession::new(resolve_session_config())
}

fn resolve_session_config() -> EditorConfig {
    *SESSION_CONFIG.get_or_init(|| {
        let Ok(raw) = std::env::var(CONFIG_PATH_ENV) else {
            return EditorConfig::default();
        };
        let path = raw.trim();
        if path.is_empty() {
            return EditorConfig::default();
        }
        EditorConfig::from_json_file(path).unwrap_or_else(|err| {
            warn!(
                "event=config_load module=ffi status=fallback env={} error={}",
                CONFIG_PATH_ENV, err
            );
            EditorConfig::default()
        })
    })
}
