//! Command handlers for the `ftree` binary.

use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use ftree_core::Snapshot;
use ftree_core::config::FtreeConfig;
use tracing::debug;

use crate::output::OutputMode;

pub mod analyze;
pub mod check;
pub mod completions;
pub mod cut_sets;
pub mod importance;

/// State shared by every analysis command.
#[derive(Debug)]
pub struct CommandContext {
    pub output: OutputMode,
    pub config: FtreeConfig,
}

/// Context attached to snapshot read failures, so reporting can tell them
/// apart from other I/O errors such as a closed stdout.
#[derive(Debug)]
pub struct SnapshotReadFailed(pub String);

impl fmt::Display for SnapshotReadFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read snapshot {}", self.0)
    }
}

/// Read and parse a snapshot file, or stdin when `path` is `-`.
///
/// # Errors
///
/// Fails with [`SnapshotReadFailed`] context when the file cannot be read,
/// and with [`ftree_core::FtaError::SnapshotParse`] when it is not a
/// snapshot.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .with_context(|| SnapshotReadFailed("from stdin".to_string()))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| SnapshotReadFailed(path.display().to_string()))?
    };

    let snapshot = Snapshot::from_json(&json)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    debug!(
        path = %path.display(),
        nodes = snapshot.nodes.len(),
        connections = snapshot.connections.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
