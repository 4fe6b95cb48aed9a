//! Probability and importance measures over minimal cut sets.
//!
//! # Measures
//!
//! - **Cut-set probability**: product of each event's active probability.
//!   Events whose probability is missing, unparsable or ≤ 0 are skipped:
//!   they multiply as 1, not 0, so one bad field does not zero a product.
//! - **Top-event probability**: rare-event approximation, the sum of the
//!   cut-set probabilities clamped to 1.0. This is an upper bound; no
//!   inclusion-exclusion is attempted.
//! - **Structural importance** of event *i*:
//!
//!   ```text
//!   I_i = 1 / 2^(n-1) · Σ_j 1 / |C_j|
//!   ```
//!
//!   where `n` is the number of basic and conditional events in the whole
//!   snapshot and `C_j` ranges over the minimal cut sets containing *i*.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cutset::CutSet;
use crate::format::format_probability;
use crate::index::GraphIndex;
use crate::model::{EventKind, Node};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Structural importance of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralImportance {
    pub event_id: String,
    pub event_name: String,
    pub event_type: EventKind,
    /// Number of minimal cut sets containing this event.
    pub occurrences: usize,
    /// Number of minimal cut sets overall.
    pub total_cut_sets: usize,
    pub structural_importance: f64,
}

/// A basic or conditional event with its stored probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicEventProbability {
    pub event_id: String,
    pub event_name: String,
    /// Active probability field read as a number, `0.0` when missing.
    pub probability: f64,
    pub event_type: EventKind,
}

// ---------------------------------------------------------------------------
// Probabilities
// ---------------------------------------------------------------------------

/// Probability of one cut set: product of active event probabilities,
/// skipping missing or non-positive values.
#[must_use]
pub fn cut_set_probability(cut_set: &[String], nodes: &[Node], index: &GraphIndex) -> f64 {
    let mut probability = 1.0;

    for event_id in cut_set {
        let Some(node) = index.resolve(nodes, event_id) else {
            debug!(event = %event_id, "cut-set event not found, skipping");
            continue;
        };

        match node.effective_probability() {
            Some(p) => {
                probability *= p;
                trace!(
                    event = %node.display_name(),
                    p = %format_probability(Some(p)),
                    running = %format_probability(Some(probability)),
                    "multiplied event probability"
                );
            }
            None => {
                debug!(
                    event = %node.display_name(),
                    stored = ?node.probability_field(),
                    "probability missing or not positive, skipping"
                );
            }
        }
    }

    trace!(
        events = cut_set.len(),
        probability = %format_probability(Some(probability)),
        "cut-set probability"
    );
    probability
}

/// Rare-event approximation of the top-event probability, in `[0, 1]`.
#[must_use]
pub fn top_event_probability(minimal_cut_sets: &[CutSet], nodes: &[Node], index: &GraphIndex) -> f64 {
    if minimal_cut_sets.is_empty() {
        return 0.0;
    }

    let total: f64 = minimal_cut_sets
        .iter()
        .map(|cs| cut_set_probability(cs, nodes, index))
        .sum();

    total.min(1.0)
}

// ---------------------------------------------------------------------------
// Structural importance
// ---------------------------------------------------------------------------

/// Structural importance of every basic and conditional event in `nodes`,
/// sorted descending. Ties keep node-list order.
///
/// Empty when there are no minimal cut sets or no events.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn structural_importance(minimal_cut_sets: &[CutSet], nodes: &[Node]) -> Vec<StructuralImportance> {
    if minimal_cut_sets.is_empty() {
        return Vec::new();
    }

    let events: Vec<&Node> = nodes.iter().filter(|n| n.is_event()).collect();
    let n = events.len();
    if n == 0 {
        return Vec::new();
    }

    let exponent = i32::try_from(n - 1).unwrap_or(i32::MAX);
    let scale = 0.5_f64.powi(exponent);

    let mut ranking: Vec<StructuralImportance> = events
        .into_iter()
        .filter_map(|event| {
            let event_type = event.event_kind()?;
            let containing: Vec<&CutSet> = minimal_cut_sets
                .iter()
                .filter(|cs| cs.iter().any(|id| *id == event.id))
                .collect();
            let sum: f64 = containing.iter().map(|cs| 1.0 / cs.len() as f64).sum();

            Some(StructuralImportance {
                event_id: event.id.clone(),
                event_name: event.display_name().to_string(),
                event_type,
                occurrences: containing.len(),
                total_cut_sets: minimal_cut_sets.len(),
                structural_importance: scale * sum,
            })
        })
        .collect();

    ranking.sort_by(|a, b| descending(a.structural_importance, b.structural_importance));
    ranking
}

/// Every basic and conditional event with its stored probability, ordered
/// by the numeric suffix of its `X<n>` label.
#[must_use]
pub fn basic_events(nodes: &[Node]) -> Vec<BasicEventProbability> {
    let mut events: Vec<(i64, BasicEventProbability)> = nodes
        .iter()
        .filter_map(|node| {
            let event_type = node.event_kind()?;
            Some((
                node.label_ordinal(),
                BasicEventProbability {
                    event_id: node.id.clone(),
                    event_name: node.display_name().to_string(),
                    probability: node.raw_probability(),
                    event_type,
                },
            ))
        })
        .collect();

    events.sort_by_key(|(ordinal, _)| *ordinal);
    events.into_iter().map(|(_, event)| event).collect()
}

/// Descending order for finite and non-finite floats alike.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
