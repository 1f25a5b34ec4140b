//! Asset keys and the identity codec.
//!
//! An [`AssetKey`] is an ordered list of path segments such as
//! `["warehouse", "orders"]`. Everything that needs to compare assets by
//! identity goes through [`to_graph_id`], which renders the path as a
//! canonical JSON array of string literals:
//!
//! ```text
//! ["warehouse","orders"]
//! ```
//!
//! Every segment is quoted and escaped, so keys whose segments contain `/`,
//! `,`, `"` or `]` can never collide. The `/`-joined token returned by
//! [`token_for_asset_key`] is for display and lookup only: `["a/b"]` and
//! `["a", "b"]` share the token `a/b`.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AssetKey
// ---------------------------------------------------------------------------

/// Hierarchical asset name. Two keys are equal iff their segment lists are
/// equal element-wise, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetKey {
    pub path: Vec<String>,
}

impl AssetKey {
    /// Build a key from any sequence of segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Canonical identifier for this key. See [`to_graph_id`].
    #[must_use]
    pub fn graph_id(&self) -> GraphId {
        to_graph_id(self)
    }

    /// `/`-joined display token. See [`token_for_asset_key`].
    #[must_use]
    pub fn token(&self) -> String {
        token_for_asset_key(self)
    }

    /// `" / "`-joined label. See [`display_name_for_asset_key`].
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name_for_asset_key(self)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

// ---------------------------------------------------------------------------
// GraphId
// ---------------------------------------------------------------------------

/// Canonical, collision-free identifier derived from an [`AssetKey`].
///
/// Only [`to_graph_id`] (and deserialization of a previously emitted id)
/// produces values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(String);

impl GraphId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the id back into its key.
    ///
    /// Returns `None` only for a value that did not come from
    /// [`to_graph_id`] (e.g. a hand-edited document).
    #[must_use]
    pub fn to_asset_key(&self) -> Option<AssetKey> {
        serde_json::from_str::<Vec<String>>(&self.0)
            .ok()
            .map(|path| AssetKey { path })
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&AssetKey> for GraphId {
    fn from(key: &AssetKey) -> Self {
        to_graph_id(key)
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Encode a key as its canonical [`GraphId`].
///
/// Output is a compact JSON array of JSON string literals, byte-for-byte
/// what `serde_json` emits for the same `Vec<String>`. The encoder is
/// written out here so identity does not depend on any serializer's
/// formatting choices. Total: the empty key encodes as `[]`.
#[must_use]
pub fn to_graph_id(key: &AssetKey) -> GraphId {
    let mut buf = String::with_capacity(2 + key.path.iter().map(|s| s.len() + 3).sum::<usize>());
    buf.push('[');
    for (i, segment) in key.path.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        write_json_string(segment, &mut buf);
    }
    buf.push(']');
    GraphId(buf)
}

/// `/`-joined display token, e.g. `warehouse/orders`. Lossy.
#[must_use]
pub fn token_for_asset_key(key: &AssetKey) -> String {
    key.path.join("/")
}

/// Human-facing label, e.g. `warehouse / orders`.
#[must_use]
pub fn display_name_for_asset_key(key: &AssetKey) -> String {
    key.path.join(" / ")
}

fn write_json_string(s: &str, buf: &mut String) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            '\u{08}' => buf.push_str("\\b"),
            '\u{0c}' => buf.push_str("\\f"),
            c if c < ' ' => buf.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => buf.push(c),
        }
    }
    buf.push('"');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
