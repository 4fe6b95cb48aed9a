//! Structural diagnostics for fault-tree snapshots.
//!
//! Analysis accepts any snapshot and degrades to empty output on malformed
//! input. These helpers let a caller tell "no failure modes" apart from "the
//! drawing is broken" before trusting a result:
//!
//! - several (or zero) top-event candidates
//! - connections naming nodes that do not exist
//! - duplicate node ids
//! - cycles in the logical (direction-corrected) graph
//!
//! Nothing here feeds back into the analysis.

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::index::GraphIndex;
use crate::snapshot::Snapshot;

/// Structural findings for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDiagnostics {
    pub node_count: usize,
    pub connection_count: usize,
    /// Basic plus conditional events.
    pub basic_event_count: usize,
    /// Nodes that are never a connection target, in node-list order. The
    /// analyzer picks the first.
    pub top_event_candidates: Vec<String>,
    /// Connection endpoints naming no node, sorted and deduplicated.
    pub dangling_endpoints: Vec<String>,
    /// Ids declared by more than one node, sorted.
    pub duplicate_ids: Vec<String>,
    /// Strongly connected components (and self-loops) of the logical graph,
    /// each sorted, the list sorted.
    pub cycles: Vec<Vec<String>>,
}

impl SnapshotDiagnostics {
    /// True when the snapshot has exactly one top event, no dangling
    /// endpoints, no duplicate ids and no cycles.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.top_event_candidates.len() == 1
            && self.dangling_endpoints.is_empty()
            && self.duplicate_ids.is_empty()
            && self.cycles.is_empty()
    }
}

/// Inspect `snapshot` for structural problems.
#[instrument(skip_all, fields(nodes = snapshot.nodes.len()))]
#[must_use]
pub fn diagnose(snapshot: &Snapshot) -> SnapshotDiagnostics {
    let targets: HashSet<&str> = snapshot.connections.iter().map(|c| c.to.as_str()).collect();
    let top_event_candidates = snapshot
        .nodes
        .iter()
        .filter(|n| !targets.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicates: HashSet<&str> = HashSet::new();
    for node in &snapshot.nodes {
        if !seen.insert(node.id.as_str()) {
            duplicates.insert(node.id.as_str());
        }
    }
    let mut duplicate_ids: Vec<String> = duplicates.into_iter().map(str::to_string).collect();
    duplicate_ids.sort_unstable();

    let mut dangling: Vec<String> = snapshot
        .connections
        .iter()
        .flat_map(|c| [c.from.as_str(), c.to.as_str()])
        .filter(|id| !seen.contains(id))
        .map(str::to_string)
        .collect();
    dangling.sort_unstable();
    dangling.dedup();

    SnapshotDiagnostics {
        node_count: snapshot.nodes.len(),
        connection_count: snapshot.connections.len(),
        basic_event_count: snapshot.nodes.iter().filter(|n| n.is_event()).count(),
        top_event_candidates,
        dangling_endpoints: dangling,
        duplicate_ids,
        cycles: find_cycles(snapshot),
    }
}

/// Cycles in the parent → child graph after conditional-event reversal.
fn find_cycles(snapshot: &Snapshot) -> Vec<Vec<String>> {
    let index = GraphIndex::build(&snapshot.nodes, &snapshot.connections);

    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut node_map: HashMap<String, NodeIndex> = HashMap::new();
    let mut intern = |graph: &mut DiGraph<String, ()>, id: &str| -> NodeIndex {
        *node_map
            .entry(id.to_string())
            .or_insert_with(|| graph.add_node(id.to_string()))
    };

    // Sorted parents keep node indices deterministic.
    let mut parents: Vec<&String> = index.children_map().keys().collect();
    parents.sort_unstable();
    for parent in parents {
        let from = intern(&mut graph, parent);
        for child in index.children(parent).unwrap_or_default() {
            let to = intern(&mut graph, child);
            if !graph.contains_edge(from, to) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.contains_edge(idx, idx))
        })
        .map(|component| {
            let mut ids: Vec<String> = component
                .into_iter()
                .filter_map(|idx| graph.node_weight(idx).cloned())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    cycles.sort_unstable();
    cycles
}
