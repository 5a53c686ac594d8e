//! Fixed-point tree reconstruction
//!
//! Turns an unordered collection of [`SourceNode`]s into a forest of rooted
//! trees. Two modes exist: flat mode resolves single explicit parent ids
//! through a deferred-resolution worklist, graph mode closes over `is_a`
//! ancestor sets by repeated full passes until nothing moves. Neither mode
//! recurses, so arbitrarily deep or cyclic chains cannot overflow the stack.

use tracing::{debug, instrument, warn};

use crate::model::{Forest, SourceNode, Tree};
use crate::status::StatusSink;

/// Resolution attempts per node before flat mode gives up on it.
const MAX_ATTEMPTS: u32 = 20;

/// Outcome of one placement attempt for a pending node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Placed under its parent in some tree
    Resolved,
    /// Parent not present in any tree yet, retry next pass
    Pending,
    /// Attempt budget exhausted, node abandoned
    Dropped,
}

/// Build a forest from nodes carrying at most one explicit parent id.
///
/// Parentless nodes seed single-entry trees keyed by their own id. Everything
/// else enters a worklist and is retried once per pass: a node attaches as
/// soon as its parent id shows up as a key in some tree, at
/// `level = parent.level + 1`. Input order does not matter; a child appearing
/// before its parent simply resolves in a later pass. Nodes whose parent
/// never materializes are dropped after [`MAX_ATTEMPTS`] passes, so broken
/// references and reference cycles cannot stall termination. Resolution
/// order across ties is unspecified.
#[instrument(level = "debug", skip(nodes, sink))]
pub fn build_flat_forest(nodes: Vec<SourceNode>, sink: &dyn StatusSink) -> Forest {
    let mut forest = Forest::new();
    let mut pending: Vec<(u32, SourceNode)> = Vec::new();

    for node in nodes {
        if node.parent_refs.is_empty() {
            let mut tree = Tree::new();
            let id = node.id.clone();
            tree.insert(id.clone(), node.into_node("", 0));
            forest.insert(id, tree);
        } else {
            pending.push((0, node));
        }
    }

    while !pending.is_empty() {
        let mut unresolved = Vec::with_capacity(pending.len());
        for (attempts, node) in pending {
            match try_attach(&mut forest, &node, attempts) {
                Resolution::Resolved => {}
                Resolution::Pending => unresolved.push((attempts + 1, node)),
                Resolution::Dropped => {
                    warn!(
                        "dropping node {}: no suitable parent found after {} attempts",
                        node.id, MAX_ATTEMPTS
                    );
                    sink.notify(&format!("Dropping unresolvable node {}", node.id));
                }
            }
        }
        pending = unresolved;
    }

    remove_orphans(&mut forest);
    forest
}

/// Scan every tree for the node's declared parent and attach on the first
/// hit. Each miss costs one unit of the attempt budget.
fn try_attach(forest: &mut Forest, node: &SourceNode, attempts: u32) -> Resolution {
    if attempts >= MAX_ATTEMPTS {
        return Resolution::Dropped;
    }
    let parent = node.primary_parent().to_string();
    for tree in forest.values_mut() {
        if let Some(level) = tree.get(&parent).map(|p| p.level + 1) {
            tree.insert(node.id.clone(), node.clone().into_node(&parent, level));
            return Resolution::Resolved;
        }
    }
    Resolution::Pending
}

/// Build a forest from nodes carrying `is_a` ancestor sets (multi-parent).
///
/// With an explicit `root_id`, the matching node seeds a single tree at
/// level 0; an id matching no node yields an empty forest, which is a valid
/// terminal state, not an error. Without one, every ancestor-less node seeds
/// its own tree.
///
/// Then full passes run to a fixed point: any node not yet in a tree that
/// declares an ancestor already keyed there is copied in with
/// `level = ancestor.level + 1` and `parent = ancestor.id`. A node with
/// several qualifying ancestors inside one tree is inserted once, under the
/// first ancestor encountered in its declaration order. Which ancestor wins
/// therefore depends on input order; callers must not read meaning into it.
/// A node reachable from several root trees is copied once per tree, and the
/// copies are independent values.
#[instrument(level = "debug", skip(nodes, sink))]
pub fn build_graph_forest(
    nodes: &[SourceNode],
    root_id: Option<&str>,
    sink: &dyn StatusSink,
) -> Forest {
    let mut forest = Forest::new();

    match root_id {
        Some(root_id) => {
            if let Some(root) = nodes.iter().find(|n| n.id == root_id) {
                let mut tree = Tree::new();
                tree.insert(root.id.clone(), root.clone().into_node("", 0));
                forest.insert(root.id.clone(), tree);
            } else {
                debug!("root id {root_id} matches no node, forest stays empty");
            }
        }
        None => {
            for node in nodes.iter().filter(|n| n.parent_refs.is_empty()) {
                let mut tree = Tree::new();
                tree.insert(node.id.clone(), node.clone().into_node("", 0));
                forest.insert(node.id.clone(), tree);
            }
        }
    }

    let mut iterations = 0usize;
    loop {
        let mut inserted = 0usize;
        for tree in forest.values_mut() {
            for node in nodes {
                if tree.contains_key(&node.id) {
                    continue;
                }
                let anchor = node
                    .parent_refs
                    .iter()
                    .find_map(|anc| tree.get(anc).map(|p| (anc.clone(), p.level + 1)));
                if let Some((parent, level)) = anchor {
                    tree.insert(node.id.clone(), node.clone().into_node(&parent, level));
                    inserted += 1;
                }
            }
        }
        if inserted == 0 {
            break;
        }
        iterations += 1;
        sink.notify(&format!("Building tree .. iteration #{iterations}"));
    }
    debug!("fixed point after {iterations} iterations");

    remove_orphans(&mut forest);
    forest
}

/// Cleanup pass: delete nodes whose recorded parent id is absent from their
/// own tree's key set, repeating until none remain.
///
/// Removing a node can orphan its children, hence the outer loop; every
/// iteration strictly shrinks at least one tree, so this terminates.
pub fn remove_orphans(forest: &mut Forest) {
    loop {
        let mut orphans: Vec<(String, String)> = Vec::new();
        for (tree_id, tree) in forest.iter() {
            for (id, node) in tree {
                if !node.parent.is_empty() && !tree.contains_key(&node.parent) {
                    orphans.push((tree_id.clone(), id.clone()));
                }
            }
        }
        if orphans.is_empty() {
            break;
        }
        warn!("removing {} nodes with missing parents", orphans.len());
        for (tree_id, id) in orphans {
            if let Some(tree) = forest.get_mut(&tree_id) {
                tree.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use crate::status::NullSink;

    fn flat_node(id: &str, parent: &str) -> SourceNode {
        SourceNode {
            id: id.to_string(),
            parent_refs: if parent.is_empty() {
                Vec::new()
            } else {
                vec![parent.to_string()]
            },
            label: format!("label {id}"),
            description: String::new(),
            counts: 1.0,
            imported_counts: 1.0,
            color: "#FFFFFF".to_string(),
            definition: None,
            comment: None,
        }
    }

    fn graph_node(id: &str, ancestors: &[&str]) -> SourceNode {
        SourceNode {
            parent_refs: ancestors.iter().map(|a| a.to_string()).collect(),
            ..flat_node(id, "")
        }
    }

    #[test]
    fn given_children_before_parents_when_building_flat_then_all_resolve() {
        let nodes = vec![flat_node("C", "B"), flat_node("A", ""), flat_node("B", "A")];

        let forest = build_flat_forest(nodes, &NullSink);

        assert_eq!(forest.len(), 1);
        let tree = &forest["A"];
        assert_eq!(tree["A"].level, 0);
        assert_eq!(tree["B"].level, 1);
        assert_eq!(tree["C"].level, 2);
    }

    #[test]
    fn given_unresolvable_parent_when_building_flat_then_node_is_dropped() {
        let nodes = vec![flat_node("A", ""), flat_node("D", "missing")];

        let forest = build_flat_forest(nodes, &NullSink);

        assert_eq!(forest.len(), 1);
        assert!(!forest["A"].contains_key("D"));
    }

    #[test]
    fn given_reference_cycle_when_building_flat_then_terminates_without_members() {
        // X and Y point at each other; neither can ever anchor to a tree.
        let nodes = vec![flat_node("A", ""), flat_node("X", "Y"), flat_node("Y", "X")];

        let forest = build_flat_forest(nodes, &NullSink);

        assert_eq!(forest["A"].len(), 1);
    }

    #[test]
    fn given_multiple_roots_when_building_flat_then_one_tree_per_root() {
        let nodes = vec![
            flat_node("R1", ""),
            flat_node("R2", ""),
            flat_node("C1", "R1"),
            flat_node("C2", "R2"),
        ];

        let forest = build_flat_forest(nodes, &NullSink);

        assert_eq!(forest.len(), 2);
        assert!(forest["R1"].contains_key("C1"));
        assert!(forest["R2"].contains_key("C2"));
    }

    #[test]
    fn given_explicit_root_when_building_graph_then_single_tree_at_level_zero() {
        let nodes = vec![
            graph_node("R", &[]),
            graph_node("T1", &["R"]),
            graph_node("T2", &["T1"]),
        ];

        let forest = build_graph_forest(&nodes, Some("R"), &NullSink);

        assert_eq!(forest.len(), 1);
        let tree = &forest["R"];
        assert!(tree["R"].is_root());
        assert_eq!(tree["T1"].level, 1);
        assert_eq!(tree["T2"].level, 2);
        assert_eq!(tree["T2"].parent, "T1");
    }

    #[test]
    fn given_unknown_root_when_building_graph_then_forest_is_empty() {
        let nodes = vec![graph_node("R", &[])];

        let forest = build_graph_forest(&nodes, Some("nope"), &NullSink);

        assert!(forest.is_empty());
    }

    #[test]
    fn given_no_root_when_building_graph_then_ancestorless_nodes_seed_trees() {
        let nodes = vec![
            graph_node("R1", &[]),
            graph_node("R2", &[]),
            graph_node("C", &["R1"]),
        ];

        let forest = build_graph_forest(&nodes, None, &NullSink);

        assert_eq!(forest.len(), 2);
        assert!(forest["R1"].contains_key("C"));
        assert!(!forest["R2"].contains_key("C"));
    }

    #[test]
    fn given_two_ancestors_in_one_tree_when_building_graph_then_inserted_once() {
        let nodes = vec![
            graph_node("R", &[]),
            graph_node("T1", &["R"]),
            graph_node("T2", &["R"]),
            graph_node("T3", &["T1", "T2"]),
        ];

        let forest = build_graph_forest(&nodes, Some("R"), &NullSink);

        let tree = &forest["R"];
        assert_eq!(tree.len(), 4);
        // First qualifying ancestor in declaration order wins.
        assert_eq!(tree["T3"].parent, "T1");
        assert_eq!(tree["T3"].level, 2);
    }

    #[test]
    fn given_node_under_two_roots_when_building_graph_then_copied_per_tree() {
        let nodes = vec![
            graph_node("R1", &[]),
            graph_node("R2", &[]),
            graph_node("S", &["R1", "R2"]),
        ];

        let mut forest = build_graph_forest(&nodes, None, &NullSink);

        assert!(forest["R1"].contains_key("S"));
        assert!(forest["R2"].contains_key("S"));

        // Copies are independent values.
        forest.get_mut("R1").unwrap().get_mut("S").unwrap().counts = 42.0;
        assert_ne!(forest["R2"]["S"].counts, 42.0);
    }

    #[test]
    fn given_orphan_chain_when_cleaning_then_removal_cascades() {
        let mut tree = Tree::new();
        for (id, parent, level) in [("R", "", 0), ("A", "gone", 1), ("B", "A", 2)] {
            tree.insert(
                id.to_string(),
                Node {
                    id: id.to_string(),
                    parent: parent.to_string(),
                    level,
                    label: String::new(),
                    description: String::new(),
                    counts: 0.0,
                    imported_counts: 0.0,
                    color: String::new(),
                    definition: None,
                    comment: None,
                },
            );
        }
        let mut forest = Forest::new();
        forest.insert("R".to_string(), tree);

        remove_orphans(&mut forest);

        // A loses its parent, then B loses A.
        assert_eq!(forest["R"].len(), 1);
        assert!(forest["R"].contains_key("R"));
    }

    #[test]
    fn given_closed_tree_when_cleaning_then_nothing_changes() {
        let nodes = vec![flat_node("A", ""), flat_node("B", "A")];
        let mut forest = build_flat_forest(nodes, &NullSink);
        let before = forest.clone();

        remove_orphans(&mut forest);

        assert_eq!(forest, before);
    }
}
