//! Share URL query assembly and loading.
//!
//! # Responsibility
//! - Build the flat query string `v=..&d=..[&view=..][&type=json][&share=1]`.
//! - Parse a query back into schema version, payload and view flags.
//! - Turn a query into a tree, falling back to the default tree on failure.
//!
//! # Invariants
//! - Default-valued flags are omitted from built queries.
//! - A payload without a matching `v` never decodes.
//! - Unknown keys and unknown `view` values are ignored, not fatal.

use super::{encode, try_decode, DecodeError};
use crate::model::tree::{default_tree, Tree};
use log::warn;
use std::fmt::{Display, Formatter};

/// Current share schema version.
pub const SCHEMA_VERSION: u32 = 1;

pub const KEY_VERSION: &str = "v";
pub const KEY_DATA: &str = "d";
pub const KEY_VIEW: &str = "view";
pub const KEY_TYPE: &str = "type";
pub const KEY_SHARE: &str = "share";

/// Which editor view the URL opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Zoomable tree map.
    #[default]
    Map,
    Explore,
    Timeline,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Explore => "explore",
            Self::Timeline => "timeline",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "map" => Some(Self::Map),
            "explore" => Some(Self::Explore),
            "timeline" => Some(Self::Timeline),
            _ => None,
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View flags carried next to the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareState {
    pub view: ViewMode,
    /// `type=json`: show the raw JSON document.
    pub json_display: bool,
    /// `share=1`: opened from a shared link.
    pub share: bool,
}

/// Raw query fields, before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareQuery {
    pub version: Option<String>,
    pub data: Option<String>,
    pub state: ShareState,
}

/// Result of loading a tree from a query.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Decoded tree, or the default tree on failure or when absent.
    pub tree: Tree,
    pub state: ShareState,
    /// Why the payload was rejected, when it was.
    pub error: Option<DecodeError>,
}

/// Builds a query string from an already-encoded payload.
pub fn build_query_with_payload(payload: &str, state: &ShareState) -> String {
    let mut query = format!("{KEY_VERSION}={SCHEMA_VERSION}&{KEY_DATA}={payload}");
    if state.view != ViewMode::Map {
        query.push_str(&format!("&{KEY_VIEW}={}", state.view));
    }
    if state.json_display {
        query.push_str(&format!("&{KEY_TYPE}=json"));
    }
    if state.share {
        query.push_str(&format!("&{KEY_SHARE}=1"));
    }
    query
}

/// Encodes `tree` and builds the full query string.
pub fn build_query(tree: &Tree, state: &ShareState) -> String {
    build_query_with_payload(&encode(tree), state)
}

/// Splits a query (with or without leading `?`) into share fields.
///
/// Later duplicates of a key win.
pub fn parse_query(query: &str) -> ShareQuery {
    let mut parsed = ShareQuery::default();
    let query = query.trim().trim_start_matches('?');
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            KEY_VERSION => parsed.version = Some(value.to_string()),
            KEY_DATA => parsed.data = Some(value.to_string()),
            KEY_VIEW => parsed.state.view = ViewMode::parse(value).unwrap_or_default(),
            KEY_TYPE => parsed.state.json_display = value == "json",
            KEY_SHARE => parsed.state.share = value == "1",
            _ => {}
        }
    }
    parsed
}

/// Decodes the tree carried by parsed query fields.
///
/// Returns `Ok(None)` when the query carries no payload at all.
pub fn decode_query(query: &ShareQuery) -> Result<Option<Tree>, DecodeError> {
    let Some(data) = &query.data else {
        return Ok(None);
    };
    let version_ok = query
        .version
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        == Some(SCHEMA_VERSION);
    if !version_ok {
        return Err(DecodeError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: query.version.clone(),
        });
    }
    try_decode(data).map(Some)
}

/// Loads a query into a tree, falling back to [`default_tree`].
pub fn load_from_query(query: &str) -> LoadOutcome {
    let parsed = parse_query(query);
    match decode_query(&parsed) {
        Ok(Some(tree)) => LoadOutcome {
            tree,
            state: parsed.state,
            error: None,
        },
        Ok(None) => LoadOutcome {
            tree: default_tree(),
            state: parsed.state,
            error: None,
        },
        Err(err) => {
            warn!(
                "event=url_load module=codec status=fallback error_code={} query_len={} error={}",
                err.code(),
                query.len(),
                err
            );
            LoadOutcome {
                tree: default_tree(),
                state: parsed.state,
                error: Some(err),
            }
        }
    }
}
