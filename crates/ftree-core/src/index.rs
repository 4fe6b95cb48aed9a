//! O(1) lookup structures over a snapshot.
//!
//! ## Edge Direction
//!
//! A drawn connection `A → B` normally means "A is the parent of B": B is
//! an input to the gate or event A. The one exception is a connection
//! whose `from` is a conditional event (`event-oval`). Editors draw
//! conditional events pointing at the gate they condition, so for those
//! the logical edge is `B → A`: the oval becomes a child of `to`.
//!
//! Only `event-oval` sources are reversed. A dangling `from` (no such
//! node) is treated as an ordinary parent.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::model::{Connection, Node};

/// Id → node position and parent → ordered children, built once per snapshot.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    /// Node id → position in the snapshot's node list. Last write wins.
    node_map: HashMap<String, usize>,
    /// Parent id → child ids in connection order.
    children_map: HashMap<String, Vec<String>>,
}

impl GraphIndex {
    /// Index `nodes` and `connections` in one pass over each.
    ///
    /// Endpoints that name no node are still recorded; traversal skips
    /// them when they fail to resolve.
    #[instrument(skip_all, fields(nodes = nodes.len(), connections = connections.len()))]
    #[must_use]
    pub fn build(nodes: &[Node], connections: &[Connection]) -> Self {
        let mut node_map: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            node_map.insert(node.id.clone(), pos);
        }

        let mut children_map: HashMap<String, Vec<String>> = HashMap::new();
        let mut reversed = 0_usize;
        for conn in connections {
            let from_is_oval = node_map
                .get(&conn.from)
                .is_some_and(|&pos| nodes[pos].is_conditional());

            let (parent, child) = if from_is_oval {
                reversed += 1;
                (&conn.to, &conn.from)
            } else {
                (&conn.from, &conn.to)
            };

            children_map
                .entry(parent.clone())
                .or_default()
                .push(child.clone());
        }

        debug!(
            parents = children_map.len(),
            reversed, "indexed fault tree"
        );

        Self {
            node_map,
            children_map,
        }
    }

    /// Position of `id` in the node list.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.node_map.get(id).copied()
    }

    /// Resolve `id` against the node list this index was built from.
    #[must_use]
    pub fn resolve<'a>(&self, nodes: &'a [Node], id: &str) -> Option<&'a Node> {
        self.position(id).and_then(|pos| nodes.get(pos))
    }

    /// Recorded children of `id`, `None` when the id has no entry.
    #[must_use]
    pub fn children(&self, id: &str) -> Option<&[String]> {
        self.children_map.get(id).map(Vec::as_slice)
    }

    /// The full parent → children map.
    #[must_use]
    pub const fn children_map(&self) -> &HashMap<String, Vec<String>> {
        &self.children_map
    }

    /// Number of distinct node ids.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_map.len()
    }
}

/// Find the top event: the first node, in list order, that is never the
/// `to` of any connection.
///
/// Uses the drawn direction, not the corrected one. Returns `None` when
/// every node is some connection's target (for example a cycle).
#[must_use]
pub fn find_top_event<'a>(nodes: &'a [Node], connections: &[Connection]) -> Option<&'a str> {
    let targets: HashSet<&str> = connections.iter().map(|c| c.to.as_str()).collect();
    nodes
        .iter()
        .find(|node| !targets.contains(node.id.as_str()))
        .map(|node| node.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gate;

    #[test]
    fn children_follow_connection_order() {
        let nodes = vec![
            Node::gate("g", Gate::Or),
            Node::basic_event("b", "X2", 0.1),
            Node::basic_event("a", "X1", 0.1),
        ];
        let conns = vec![Connection::new("g", "b"), Connection::new("g", "a")];
        let index = GraphIndex::build(&nodes, &conns);
        assert_eq!(index.children("g"), Some(&["b".to_string(), "a".to_string()][..]));
        assert_eq!(index.children("a"), None);
    }

    #[test]
    fn oval_source_is_reversed() {
        let nodes = vec![
            Node::gate("g", Gate::And),
            Node::conditional_event("y1", "Y1", 0.5),
        ];
        let conns = vec![Connection::new("y1", "g")];
        let index = GraphIndex::build(&nodes, &conns);
        assert_eq!(index.children("g"), Some(&["y1".to_string()][..]));
        assert_eq!(index.children("y1"), None);
    }

    #[test]
    fn oval_target_is_not_reversed() {
        let nodes = vec![
            Node::gate("g", Gate::And),
            Node::conditional_event("y1", "Y1", 0.5),
        ];
        let conns = vec![Connection::new("g", "y1")];
        let index = GraphIndex::build(&nodes, &conns);
        assert_eq!(index.children("g"), Some(&["y1".to_string()][..]));
    }

    #[test]
    fn dangling_endpoints_are_recorded() {
        let nodes = vec![Node::gate("g", Gate::Or)];
        let conns = vec![Connection::new("g", "ghost"), Connection::new("nowhere", "g")];
        let index = GraphIndex::build(&nodes, &conns);
        assert_eq!(index.children("g"), Some(&["ghost".to_string()][..]));
        assert_eq!(index.children("nowhere"), Some(&["g".to_string()][..]));
        assert!(index.resolve(&nodes, "ghost").is_none());
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let nodes = vec![
            Node::basic_event("x", "X1", 0.1),
            Node::basic_event("x", "X9", 0.9),
        ];
        let index = GraphIndex::build(&nodes, &[]);
        assert_eq!(index.node_count(), 1);
        assert_eq!(index.resolve(&nodes, "x").map(Node::display_name), Some("X9"));
    }

    #[test]
    fn top_event_is_first_untargeted_node() {
        let nodes = vec![
            Node::basic_event("x1", "X1", 0.1),
            Node::gate("top", Gate::Or),
            Node::gate("other", Gate::Or),
        ];
        let conns = vec![Connection::new("top", "x1")];
        assert_eq!(find_top_event(&nodes, &conns), Some("top"));
    }

    #[test]
    fn cycle_has_no_top_event() {
        let nodes = vec![Node::gate("a", Gate::Or), Node::gate("b", Gate::Or)];
        let conns = vec![Connection::new("a", "b"), Connection::new("b", "a")];
        assert_eq!(find_top_event(&nodes, &conns), None);
    }

    #[test]
    fn empty_tree_has_no_top_event() {
        assert_eq!(find_top_event(&[], &[]), None);
    }
}
