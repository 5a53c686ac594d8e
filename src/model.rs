//! Core data model: nodes, trees, and forests

use std::collections::BTreeMap;

/// Sentinel count meaning "no real count supplied".
///
/// Downstream layers must be able to tell an untouched node apart from one
/// whose count was legitimately set to zero, so unset counts are stored as
/// this near-zero constant instead of `0.0`.
pub const UNSET_COUNT: f64 = 0.000001337;

/// Baseline counterpart of [`UNSET_COUNT`] for the imported-count field.
pub const UNSET_IMPORTED_COUNT: f64 = 1.000001337;

/// Default node color (hex RGB).
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// A node placed in a tree, with its resolved parent and depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Resolved parent id within the same tree; empty for root nodes
    pub parent: String,
    /// Depth from the tree root; the root sits at level 0
    pub level: usize,
    pub label: String,
    pub description: String,
    pub counts: f64,
    pub imported_counts: f64,
    pub color: String,
    /// OBO definition, carried by graph-sourced nodes only
    pub definition: Option<String>,
    /// OBO comment, carried by graph-sourced nodes only
    pub comment: Option<String>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }

    /// Whether a real count was supplied, as opposed to the unset sentinel.
    pub fn has_counts(&self) -> bool {
        self.counts != UNSET_COUNT
    }
}

/// One rooted tree: node id to node.
pub type Tree = BTreeMap<String, Node>;

/// A forest of independent trees: root id to tree.
///
/// Trees never share nodes by identity. A term reachable from several roots
/// is copied into each applicable tree, so mutating one copy is not
/// observable in another.
pub type Forest = BTreeMap<String, Tree>;

/// Uniform node representation produced by the source adapters.
///
/// Carries zero or more unresolved ancestor references; the tree builder
/// turns these into placed [`Node`]s with a single resolved parent each.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub id: String,
    /// Declared ancestor ids: 0..1 for flat sources, 0..N for term graphs
    pub parent_refs: Vec<String>,
    pub label: String,
    pub description: String,
    pub counts: f64,
    pub imported_counts: f64,
    pub color: String,
    pub definition: Option<String>,
    pub comment: Option<String>,
}

impl SourceNode {
    /// First declared ancestor, or empty when the node is a root.
    pub fn primary_parent(&self) -> &str {
        self.parent_refs.first().map(String::as_str).unwrap_or("")
    }

    /// Place this node under `parent` at the given depth.
    pub fn into_node(self, parent: &str, level: usize) -> Node {
        Node {
            id: self.id,
            parent: parent.to_string(),
            level,
            label: self.label,
            description: self.description,
            counts: self.counts,
            imported_counts: self.imported_counts,
            color: self.color,
            definition: self.definition,
            comment: self.comment,
        }
    }
}
