//! Serialization protocol for URL-resident trees.
//!
//! # Responsibility
//! - Encode a tree as `JSON -> DEFLATE -> base64url` and decode it back.
//! - Validate decoded payloads before they become a [`Tree`].
//! - Assemble and parse the share query string (`v`, `d`, `view`, `type`,
//!   `share`).
//!
//! # Invariants
//! - Encoding never panics; failure yields an empty payload.
//! - Decoding is all-or-nothing; no partial tree is ever returned.
//! - `try_decode(&encode(t)) == Ok(t)` for every valid tree.

pub mod budget;
pub mod share_url;
pub mod validate;

use crate::model::node::Node;
use crate::model::tree::Tree;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use validate::ValidationError;

/// Upper bound on inflated payload size.
const MAX_INFLATED_BYTES: u64 = 4 * 1024 * 1024;

/// Errors from decoding a share payload.
#[derive(Debug)]
pub enum DecodeError {
    /// Payload string is empty.
    Empty,
    /// Payload is not base64url.
    Base64(base64::DecodeError),
    /// Payload bytes are not a DEFLATE stream.
    Inflate(std::io::Error),
    /// Inflated payload exceeds the size bound.
    TooLarge,
    /// Inflated payload is not the expected JSON.
    Json(serde_json::Error),
    /// JSON shape or tree structure is invalid.
    Invalid(ValidationError),
    /// Schema version is missing or unsupported.
    VersionMismatch {
        expected: u32,
        found: Option<String>,
    },
}

impl DecodeError {
    /// Stable short code for logs and host envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "payload_empty",
            Self::Base64(_) => "payload_base64",
            Self::Inflate(_) => "payload_inflate",
            Self::TooLarge => "payload_too_large",
            Self::Json(_) => "payload_json",
            Self::Invalid(_) => "payload_invalid",
            Self::VersionMismatch { .. } => "version_mismatch",
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "share payload is empty"),
            Self::Base64(err) => write!(f, "share payload is not base64url: {err}"),
            Self::Inflate(err) => write!(f, "share payload failed to decompress: {err}"),
            Self::TooLarge => write!(
                f,
                "share payload inflates beyond {MAX_INFLATED_BYTES} bytes"
            ),
            Self::Json(err) => write!(f, "share payload is not valid JSON: {err}"),
            Self::Invalid(err) => write!(f, "share payload is invalid: {err}"),
            Self::VersionMismatch { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "unsupported schema version `{found}`; expected {expected}"
                ),
                None => write!(f, "missing schema version; expected {expected}"),
            },
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Base64(err) => Some(err),
            Self::Inflate(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Invalid(err) => Some(err),
            Self::Empty | Self::TooLarge | Self::VersionMismatch { .. } => None,
        }
    }
}

impl From<base64::DecodeError> for DecodeError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Base64(value)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ValidationError> for DecodeError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Wire shape of a tree.
#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    meta: PayloadMeta,
    nodes: Vec<Node>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PayloadMeta {
    #[serde(default)]
    title: String,
}

impl From<&Tree> for Payload {
    fn from(tree: &Tree) -> Self {
        Self {
            meta: PayloadMeta {
                title: tree.title.clone(),
            },
            nodes: tree.nodes.clone(),
        }
    }
}

/// Encodes `tree` into a URL-safe payload.
///
/// Returns an empty string when serialization or compression fails.
pub fn encode(tree: &Tree) -> String {
    match try_encode(tree) {
        Ok(payload) => payload,
        Err(err) => {
            error!(
                "event=payload_encode module=codec status=error nodes={} error={}",
                tree.len(),
                err
            );
            String::new()
        }
    }
}

fn try_encode(tree: &Tree) -> Result<String, std::io::Error> {
    let json = serde_json::to_vec(&Payload::from(tree))?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decodes a payload, reporting why it failed.
pub fn try_decode(payload: &str) -> Result<Tree, DecodeError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    let compressed = URL_SAFE_NO_PAD.decode(payload)?;

    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_INFLATED_BYTES + 1)
        .read_to_end(&mut json)
        .map_err(DecodeError::Inflate)?;
    if json.len() as u64 > MAX_INFLATED_BYTES {
        return Err(DecodeError::TooLarge);
    }

    let value: serde_json::Value = serde_json::from_slice(&json)?;
    validate::validate_shape(&value)?;
    let payload: Payload = serde_json::from_value(value)?;
    let tree = Tree::new(payload.meta.title, payload.nodes);
    validate::validate_structure(&tree)?;
    Ok(tree)
}

/// Decodes a payload; any failure yields `None` and a warning log.
pub fn decode(payload: &str) -> Option<Tree> {
    match try_decode(payload) {
        Ok(tree) => Some(tree),
        Err(err) => {
            warn!(
                "event=payload_decode module=codec status=error error_code={} payload_len={} error={}",
                err.code(),
                payload.len(),
                err
            );
            None
        }
    }
}

/// Pretty JSON of the wire payload, for the JSON display mode.
pub fn to_pretty_json(tree: &Tree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Payload::from(tree))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, try_decode, DecodeError};
    use crate::model::tree::default_tree;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate_b64(raw: &str) -> String {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw.as_bytes()).unwrap();
        URL_SAFE_NO_PAD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn payload_is_url_safe() {
        let payload = encode(&default_tree());
        assert!(!payload.is_empty());
        assert!(payload
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'));
    }

    #[test]
    fn default_tree_round_trips() {
        let tree = default_tree();
        assert_eq!(try_decode(&encode(&tree)).unwrap(), tree);
    }

    #[test]
    fn garbage_is_rejected_at_each_stage() {
        assert!(matches!(try_decode("  "), Err(DecodeError::Empty)));
        assert!(matches!(try_decode("***"), Err(DecodeError::Base64(_))));
        assert!(matches!(
            try_decode(&URL_SAFE_NO_PAD.encode(b"not deflate at all, really")),
            Err(DecodeError::Inflate(_))
        ));
        assert!(matches!(
            try_decode(&deflate_b64("{nope")),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            try_decode(&deflate_b64(r#"{"meta":{},"nodes":{}}"#)),
            Err(DecodeError::Invalid(_))
        ));
        assert!(decode("***").is_none());
    }

    #[test]
    fn missing_meta_title_defaults_to_empty() {
        let tree = try_decode(&deflate_b64(
            r#"{"meta":{},"nodes":[{"id":"0","parentId":"","title":"x","status":1}]}"#,
        ))
        .unwrap();
        assert_eq!(tree.title, "");
        assert_eq!(tree.len(), 1);
    }
}
