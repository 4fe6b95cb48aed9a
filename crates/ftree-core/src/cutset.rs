//! Cut-set generation by recursive descent from a root node.
//!
//! Each subtree yields the list of cut sets that trigger it. Events are
//! terminal, gates combine their children's lists:
//!
//! ```text
//! AND(a: [[x1]], b: [[x2], [x3]])  →  [[x1, x2], [x1, x3]]
//! OR (a: [[x1]], b: [[x2], [x3]])  →  [[x1], [x2], [x3]]
//! ```
//!
//! ## Cost
//!
//! AND is a Cartesian product: the output length is the product of the
//! children's list lengths, and cut sets grow by concatenation. Wide AND
//! gates over OR subtrees grow exponentially. [`CutSetGenerator::with_limit`]
//! bounds every intermediate list for callers that accept untrusted trees.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::error::FtaError;
use crate::index::GraphIndex;
use crate::model::{Gate, Node};

/// A collection of event ids whose joint occurrence triggers a subtree.
///
/// Raw cut sets may repeat an id; [`crate::minimize`] removes repeats.
pub type CutSet = Vec<String>;

/// Walks a snapshot from a root and produces raw (non-minimal) cut sets.
#[derive(Debug, Clone, Copy)]
pub struct CutSetGenerator<'a> {
    nodes: &'a [Node],
    index: &'a GraphIndex,
    limit: Option<usize>,
}

impl<'a> CutSetGenerator<'a> {
    #[must_use]
    pub const fn new(nodes: &'a [Node], index: &'a GraphIndex) -> Self {
        Self {
            nodes,
            index,
            limit: None,
        }
    }

    /// Fail generation when any intermediate cut-set list would hold more
    /// than `limit` entries.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Cut sets of the subtree rooted at `node`.
    ///
    /// - absent node: no cut sets
    /// - basic or conditional event: `[[id]]`
    /// - node without recorded children: `[[id]]`
    /// - otherwise children are expanded and combined by the node's gate;
    ///   children that fail to resolve, or that close a cycle back to a
    ///   node being expanded, contribute an empty list
    ///
    /// # Errors
    ///
    /// Returns [`FtaError::CutSetLimitExceeded`] only when a limit is set
    /// and exceeded.
    pub fn generate(&self, node: Option<&Node>) -> Result<Vec<CutSet>, FtaError> {
        let mut path = HashSet::new();
        self.expand(node, &mut path)
    }

    /// `path` holds the ids on the current descent. A node reached again
    /// through a cycle contributes no cut sets, like an unresolved child.
    fn expand<'n>(
        &self,
        node: Option<&'n Node>,
        path: &mut HashSet<&'n str>,
    ) -> Result<Vec<CutSet>, FtaError>
    where
        'a: 'n,
    {
        let Some(node) = node else {
            return Ok(Vec::new());
        };

        if node.is_event() {
            return Ok(vec![vec![node.id.clone()]]);
        }

        let children = match self.index.children(&node.id) {
            Some(children) if !children.is_empty() => children,
            _ => return Ok(vec![vec![node.id.clone()]]),
        };

        if !path.insert(node.id.as_str()) {
            debug!(node = %node.id, "cycle in fault tree; branch skipped");
            return Ok(Vec::new());
        }

        let mut child_lists = Vec::with_capacity(children.len());
        for child_id in children {
            let child = self.index.resolve(self.nodes, child_id);
            match self.expand(child, path) {
                Ok(list) => child_lists.push(list),
                Err(err) => {
                    path.remove(node.id.as_str());
                    return Err(err);
                }
            }
        }
        path.remove(node.id.as_str());

        let combined = match node.gate {
            Gate::And => cartesian(child_lists, self.limit.unwrap_or(usize::MAX)),
            Gate::Or => Some(combine_or(child_lists)),
        };

        let Some(combined) = combined else {
            return Err(self.exceeded(node));
        };
        if self.limit.is_some_and(|limit| combined.len() > limit) {
            return Err(self.exceeded(node));
        }

        trace!(
            node = %node.id,
            gate = ?node.gate,
            cut_sets = combined.len(),
            "expanded gate"
        );
        Ok(combined)
    }

    fn exceeded(&self, node: &Node) -> FtaError {
        FtaError::CutSetLimitExceeded {
            limit: self.limit.unwrap_or(usize::MAX),
            node: node.id.clone(),
        }
    }
}

/// AND combination: one cut set from every child, concatenated.
///
/// A child with no cut sets empties the product. Zero children yield an
/// empty list.
#[must_use]
pub fn combine_and(child_lists: Vec<Vec<CutSet>>) -> Vec<CutSet> {
    // With no limit the product can only fail by overflowing usize, which
    // would have exhausted memory long before.
    cartesian(child_lists, usize::MAX).unwrap_or_default()
}

/// OR combination: children's lists flattened one level, order kept, no
/// deduplication.
#[must_use]
pub fn combine_or(child_lists: Vec<Vec<CutSet>>) -> Vec<CutSet> {
    child_lists.into_iter().flatten().collect()
}

/// Cartesian product of `child_lists`, or `None` once a partial product
/// would exceed `limit` entries.
fn cartesian(child_lists: Vec<Vec<CutSet>>, limit: usize) -> Option<Vec<CutSet>> {
    let mut lists = child_lists.into_iter();
    let Some(mut result) = lists.next() else {
        return Some(Vec::new());
    };
    if result.len() > limit {
        return None;
    }

    for alternatives in lists {
        let size = result.len().checked_mul(alternatives.len())?;
        if size > limit {
            return None;
        }

        let mut next = Vec::with_capacity(size);
        for existing in &result {
            for cut_set in &alternatives {
                let mut joined = Vec::with_capacity(existing.len() + cut_set.len());
                joined.extend(existing.iter().cloned());
                joined.extend(cut_set.iter().cloned());
                next.push(joined);
            }
        }
        result = next;
    }

    Some(result)
}
