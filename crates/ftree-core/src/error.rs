use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for tooling that consumes CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SnapshotParseError,
    SnapshotReadFailed,
    ConfigReadFailed,
    ConfigParseError,
    CutSetLimitExceeded,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SnapshotParseError => "E1001",
            Self::SnapshotReadFailed => "E1002",
            Self::ConfigReadFailed => "E2001",
            Self::ConfigParseError => "E2002",
            Self::CutSetLimitExceeded => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SnapshotParseError => "Fault tree snapshot is not valid JSON",
            Self::SnapshotReadFailed => "Fault tree snapshot could not be read",
            Self::ConfigReadFailed => "Config file could not be read",
            Self::ConfigParseError => "Config file parse error",
            Self::CutSetLimitExceeded => "Cut-set limit exceeded",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SnapshotParseError => {
                Some("Export the tree as {\"nodes\": [...], \"connections\": [...]} and retry.")
            }
            Self::SnapshotReadFailed => Some("Check the snapshot path and read permissions."),
            Self::ConfigReadFailed => None,
            Self::ConfigParseError => Some("Fix syntax in ftree.toml and retry."),
            Self::CutSetLimitExceeded => Some(
                "Raise analysis.max_cut_sets in ftree.toml or simplify wide AND gates.",
            ),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised at the crate boundary.
///
/// The analysis itself never fails on malformed trees; these cover
/// loading snapshots and config, plus the opt-in cut-set limit.
#[derive(Debug, thiserror::Error)]
pub enum FtaError {
    #[error("invalid fault tree snapshot: {0}")]
    SnapshotParse(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cut-set limit of {limit} exceeded while expanding node {node}")]
    CutSetLimitExceeded { limit: usize, node: String },
}

impl FtaError {
    /// The stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SnapshotParse(_) => ErrorCode::SnapshotParseError,
            Self::ConfigRead { .. } => ErrorCode::ConfigReadFailed,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::CutSetLimitExceeded { .. } => ErrorCode::CutSetLimitExceeded,
        }
    }
}
