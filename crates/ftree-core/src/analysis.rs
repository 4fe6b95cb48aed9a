//! Fault-tree analyzer: the entry point tying the phases together.
//!
//! ## Pipeline
//!
//! ```text
//! Snapshot (nodes, connections)
//!        ↓  GraphIndex::build            (once, at construction)
//! GraphIndex (node map, children map)
//!        ↓  CutSetGenerator::generate     (per request, from the root)
//! raw cut sets
//!        ↓  minimize::minimize
//! minimal cut sets
//!        ↓  quantify::*
//! AnalysisResult
//! ```
//!
//! The analyzer owns an immutable snapshot, so it is `Send + Sync` and
//! concurrent analyses (e.g. different roots) need no locking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cutset::{CutSet, CutSetGenerator};
use crate::error::FtaError;
use crate::index::{GraphIndex, find_top_event};
use crate::minimize::minimize;
use crate::model::{Connection, Node};
use crate::quantify::{self, BasicEventProbability, StructuralImportance, descending};
use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A minimal cut set annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutSetRecord {
    /// Event ids, each listed once.
    pub events: Vec<String>,
    /// Event labels, parallel to `events`; ids for unknown or unlabeled events.
    pub event_names: Vec<String>,
    pub probability: f64,
}

impl CutSetRecord {
    /// Number of distinct events in the cut set.
    #[must_use]
    pub fn order(&self) -> usize {
        self.events.len()
    }
}

/// Complete analysis of one top event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Minimal cut sets, most probable first.
    pub minimal_cut_sets: Vec<CutSetRecord>,
    pub cut_set_count: usize,
    /// Rare-event approximation, in `[0, 1]`.
    pub top_event_probability: f64,
    /// The analysed root: the explicit root if one was given, else the
    /// detected top event.
    pub top_event_id: Option<String>,
    pub basic_events_probability: Vec<BasicEventProbability>,
    pub structural_importance: Vec<StructuralImportance>,
}

/// Resource limits for analyses of untrusted trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisLimits {
    /// Maximum length of any intermediate cut-set list.
    pub max_cut_sets: Option<usize>,
}

// ---------------------------------------------------------------------------
// FaultTreeAnalyzer
// ---------------------------------------------------------------------------

/// Analyzer over one immutable fault-tree snapshot.
#[derive(Debug, Clone)]
pub struct FaultTreeAnalyzer {
    snapshot: Snapshot,
    index: GraphIndex,
}

impl FaultTreeAnalyzer {
    /// Build the analyzer and its lookup indexes.
    #[must_use]
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self::from_snapshot(Snapshot::new(nodes, connections))
    }

    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let index = GraphIndex::build(&snapshot.nodes, &snapshot.connections);
        Self { snapshot, index }
    }

    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn index(&self) -> &GraphIndex {
        &self.index
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.resolve(&self.snapshot.nodes, id)
    }

    /// The first node that is never a connection target, if any.
    #[must_use]
    pub fn find_top_event(&self) -> Option<&str> {
        find_top_event(&self.snapshot.nodes, &self.snapshot.connections)
    }

    /// Raw cut sets of the subtree at `node`. See [`CutSetGenerator::generate`].
    #[must_use]
    pub fn traverse(&self, node: Option<&Node>) -> Vec<CutSet> {
        // Generation without a limit has no failure path.
        self.generator().generate(node).unwrap_or_default()
    }

    /// Minimize a raw cut-set list. See [`crate::minimize`].
    #[must_use]
    pub fn minimize_cut_sets(&self, cut_sets: Vec<CutSet>) -> Vec<CutSet> {
        minimize(cut_sets)
    }

    /// Minimal cut sets of `root`, or of the detected top event when
    /// `root` is `None`. Empty when no root resolves.
    #[must_use]
    pub fn calculate_minimal_cut_sets(&self, root: Option<&str>) -> Vec<CutSet> {
        self.try_minimal_cut_sets(root, &AnalysisLimits::default())
            .unwrap_or_default()
    }

    /// Bounded variant of [`Self::calculate_minimal_cut_sets`].
    ///
    /// # Errors
    ///
    /// Returns [`FtaError::CutSetLimitExceeded`] when generation exceeds
    /// `limits.max_cut_sets`.
    pub fn try_minimal_cut_sets(
        &self,
        root: Option<&str>,
        limits: &AnalysisLimits,
    ) -> Result<Vec<CutSet>, FtaError> {
        let Some(root_id) = self.effective_root(root) else {
            debug!("no top event found");
            return Ok(Vec::new());
        };

        let raw = self
            .generator()
            .with_limit(limits.max_cut_sets)
            .generate(self.node(root_id))?;
        debug!(root = %root_id, raw = raw.len(), "generated cut sets");
        Ok(minimize(raw))
    }

    /// Probability of one cut set. See [`quantify::cut_set_probability`].
    #[must_use]
    pub fn calculate_cut_set_probability(&self, cut_set: &[String]) -> f64 {
        quantify::cut_set_probability(cut_set, &self.snapshot.nodes, &self.index)
    }

    /// Rare-event top-event probability. See [`quantify::top_event_probability`].
    #[must_use]
    pub fn calculate_top_event_probability(&self, minimal_cut_sets: &[CutSet]) -> f64 {
        quantify::top_event_probability(minimal_cut_sets, &self.snapshot.nodes, &self.index)
    }

    /// Structural importance ranking. See [`quantify::structural_importance`].
    #[must_use]
    pub fn calculate_structural_importance(
        &self,
        minimal_cut_sets: &[CutSet],
    ) -> Vec<StructuralImportance> {
        quantify::structural_importance(minimal_cut_sets, &self.snapshot.nodes)
    }

    /// Full analysis of `root`, or of the detected top event.
    #[must_use]
    pub fn get_analysis_result(&self, root: Option<&str>) -> AnalysisResult {
        // Unbounded analysis has no failure path; the fallback is unreachable.
        self.try_analysis_result(root, &AnalysisLimits::default())
            .unwrap_or_else(|_| self.empty_result(root))
    }

    /// Bounded variant of [`Self::get_analysis_result`].
    ///
    /// # Errors
    ///
    /// Returns [`FtaError::CutSetLimitExceeded`] when generation exceeds
    /// `limits.max_cut_sets`.
    #[instrument(skip(self, limits), fields(nodes = self.snapshot.nodes.len()))]
    pub fn try_analysis_result(
        &self,
        root: Option<&str>,
        limits: &AnalysisLimits,
    ) -> Result<AnalysisResult, FtaError> {
        let minimal = self.try_minimal_cut_sets(root, limits)?;

        let mut records: Vec<CutSetRecord> = minimal
            .iter()
            .map(|cut_set| CutSetRecord {
                events: cut_set.clone(),
                event_names: cut_set.iter().map(|id| self.event_name(id)).collect(),
                probability: self.calculate_cut_set_probability(cut_set),
            })
            .collect();
        records.sort_by(|a, b| descending(a.probability, b.probability));

        let top_event_probability = self.calculate_top_event_probability(&minimal);
        let top_event_id = self.resolve_top_event_id(root);

        info!(
            top_event = top_event_id.as_deref().unwrap_or("-"),
            cut_sets = minimal.len(),
            probability = top_event_probability,
            "fault tree analysed"
        );

        Ok(AnalysisResult {
            cut_set_count: minimal.len(),
            minimal_cut_sets: records,
            top_event_probability,
            top_event_id,
            basic_events_probability: quantify::basic_events(&self.snapshot.nodes),
            structural_importance: self.calculate_structural_importance(&minimal),
        })
    }

    fn event_name(&self, id: &str) -> String {
        self.node(id)
            .map_or_else(|| id.to_string(), |n| n.display_name().to_string())
    }

    fn generator(&self) -> CutSetGenerator<'_> {
        CutSetGenerator::new(&self.snapshot.nodes, &self.index)
    }

    /// An empty explicit root counts as no root.
    fn effective_root<'a>(&'a self, root: Option<&'a str>) -> Option<&'a str> {
        root.filter(|id| !id.is_empty())
            .or_else(|| self.find_top_event())
    }

    fn resolve_top_event_id(&self, root: Option<&str>) -> Option<String> {
        self.effective_root(root).map(str::to_string)
    }

    fn empty_result(&self, root: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            minimal_cut_sets: Vec::new(),
            cut_set_count: 0,
            top_event_probability: 0.0,
            top_event_id: self.resolve_top_event_id(root),
            basic_events_probability: quantify::basic_events(&self.snapshot.nodes),
            structural_importance: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// CutSetSummary
// ---------------------------------------------------------------------------

/// Report-oriented view of an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutSetSummary {
    /// Number of minimal cut sets per order.
    pub cut_sets_by_order: BTreeMap<usize, usize>,
    pub max_order: usize,
    /// Order-1 cut sets: a single event brings down the top event.
    pub single_point_failures: Vec<CutSetRecord>,
    /// Each cut set's share of the top-event probability, in percent,
    /// parallel to `minimal_cut_sets`. All zero when the top event has
    /// probability zero.
    pub contributions: Vec<f64>,
}

impl CutSetSummary {
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let mut cut_sets_by_order = BTreeMap::new();
        for record in &result.minimal_cut_sets {
            *cut_sets_by_order.entry(record.order()).or_insert(0) += 1;
        }

        let max_order = result
            .minimal_cut_sets
            .iter()
            .map(CutSetRecord::order)
            .max()
            .unwrap_or(0);

        let single_point_failures = result
            .minimal_cut_sets
            .iter()
            .filter(|r| r.order() == 1)
            .cloned()
            .collect();

        let top = result.top_event_probability;
        let contributions = result
            .minimal_cut_sets
            .iter()
            .map(|r| if top > 0.0 { r.probability / top * 100.0 } else { 0.0 })
            .collect();

        Self {
            cut_sets_by_order,
            max_order,
            single_point_failures,
            contributions,
        }
    }
}
