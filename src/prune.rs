//! Subtree pruning by minimum node count

use tracing::{debug, instrument};

use crate::model::Forest;

/// Remove every tree with strictly fewer nodes than `min_node_size`.
///
/// Runs once after the builder's fixed point, never interleaved with it.
/// `None` disables pruning entirely.
#[instrument(level = "debug", skip(forest))]
pub fn prune_small_trees(forest: &mut Forest, min_node_size: Option<usize>) {
    let Some(threshold) = min_node_size else {
        return;
    };
    let before = forest.len();
    forest.retain(|_, tree| tree.len() >= threshold);
    let dropped = before - forest.len();
    if dropped > 0 {
        debug!("pruned {dropped} trees below {threshold} nodes");
    }
}
