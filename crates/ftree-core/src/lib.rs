#![forbid(unsafe_code)]
//! ftree-core: fault-tree analysis engine.
//!
//! Turns a drawn fault tree (flat node and connection lists) into minimal
//! cut sets, a rare-event top-event probability and a structural importance
//! ranking of its basic events.
//!
//! ```rust
//! use ftree_core::{Connection, FaultTreeAnalyzer, Gate, Node};
//!
//! let analyzer = FaultTreeAnalyzer::new(
//!     vec![
//!         Node::gate("top", Gate::Or),
//!         Node::basic_event("x1", "X1", 0.01),
//!         Node::basic_event("x2", "X2", 0.02),
//!     ],
//!     vec![Connection::new("top", "x1"), Connection::new("top", "x2")],
//! );
//!
//! let result = analyzer.get_analysis_result(None);
//! assert_eq!(result.cut_set_count, 2);
//! assert!((result.top_event_probability - 0.03).abs() < 1e-12);
//! ```
//!
//! # Conventions
//!
//! - **Errors**: analysis never fails on malformed trees; it degrades to
//!   empty output. [`FtaError`] covers loading and opt-in limits only.
//! - **Logging**: Use `tracing` macros (`info!`, `debug!`, `trace!`).

pub mod analysis;
pub mod config;
pub mod cutset;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod index;
pub mod minimize;
pub mod model;
pub mod quantify;
pub mod snapshot;

pub use analysis::{
    AnalysisLimits, AnalysisResult, CutSetRecord, CutSetSummary, FaultTreeAnalyzer,
};
pub use cutset::CutSet;
pub use diagnostics::{SnapshotDiagnostics, diagnose};
pub use error::{ErrorCode, FtaError};
pub use format::format_probability;
pub use model::{Connection, EventKind, Gate, Node, NodeKind, ProbabilityValue};
pub use quantify::{BasicEventProbability, StructuralImportance};
pub use snapshot::Snapshot;
