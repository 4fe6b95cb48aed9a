//! Reduction of raw cut sets to the unique, inclusion-minimal antichain.
//!
//! Two stages, in this order:
//!
//! 1. **Minimality.** A cut set is dropped when another cut set with a
//!    strictly smaller element set is contained in it. Equal-size sets never
//!    eliminate each other here, even when identical.
//! 2. **Uniqueness.** Survivors are deduplicated by their sorted,
//!    comma-joined signature, first occurrence kept.
//!
//! Sizes and containment are computed on element *sets*, so `[a, a, b]` has
//! size 2. Repeated ids are removed from every surviving cut set (first
//! occurrence order) before it is returned.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::cutset::CutSet;

/// Minimize `cut_sets`.
///
/// Output order is the relative order of first-kept occurrences. Cost is
/// quadratic in the number of cut sets.
#[must_use]
pub fn minimize(cut_sets: Vec<CutSet>) -> Vec<CutSet> {
    let input_len = cut_sets.len();
    let element_sets: Vec<HashSet<&str>> = cut_sets
        .iter()
        .map(|cs| cs.iter().map(String::as_str).collect())
        .collect();

    let minimal: Vec<usize> = (0..element_sets.len())
        .filter(|&i| {
            let a = &element_sets[i];
            !element_sets
                .iter()
                .enumerate()
                .any(|(j, b)| j != i && b.len() < a.len() && b.is_subset(a))
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(minimal.len());
    let mut result = Vec::with_capacity(minimal.len());
    for i in minimal {
        if seen.insert(signature(&cut_sets[i])) {
            result.push(distinct(&cut_sets[i]));
        }
    }

    debug!(raw = input_len, minimal = result.len(), "minimized cut sets");
    result
}

/// Sorted, comma-joined element signature of a cut set.
#[must_use]
pub fn signature(cut_set: &[String]) -> String {
    let sorted: BTreeSet<&str> = cut_set.iter().map(String::as_str).collect();
    sorted.into_iter().collect::<Vec<_>>().join(",")
}

fn distinct(cut_set: &[String]) -> CutSet {
    let mut seen = HashSet::with_capacity(cut_set.len());
    cut_set
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
