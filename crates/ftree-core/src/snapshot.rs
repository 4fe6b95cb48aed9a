//! Immutable node/connection snapshot handed over by the tree editor.
//!
//! ## Cache Invalidation
//!
//! [`Snapshot::content_hash`] is a BLAKE3 hash over the canonical JSON of
//! the nodes and connections. Collaborators compare it against a stored
//! value to decide whether a tree needs re-analysis.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::FtaError;
use crate::model::{Connection, Node};

/// A complete fault tree as drawn: flat node and connection lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Snapshot {
    #[must_use]
    pub const fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self { nodes, connections }
    }

    /// Parse a snapshot from its JSON document.
    ///
    /// Unknown node fields (positions, colours, …) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FtaError::SnapshotParse`] if the document is not valid
    /// JSON or lacks node ids.
    #[instrument(skip(json), fields(bytes = json.len()))]
    pub fn from_json(json: &str) -> Result<Self, FtaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// BLAKE3 hash of the snapshot, formatted as `blake3:<hex>`.
    ///
    /// Node and connection order are significant: both influence the
    /// analysis (root tie-breaks, child order).
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for node in &self.nodes {
            // Serializing a Node cannot fail: every field is a plain
            // string, number or JSON value.
            if let Ok(bytes) = serde_json::to_vec(node) {
                hasher.update(&bytes);
            }
            hasher.update(b"\n");
        }
        hasher.update(b"--\n");
        for conn in &self.connections {
            hasher.update(conn.from.as_bytes());
            hasher.update(b"\x00");
            hasher.update(conn.to.as_bytes());
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}
