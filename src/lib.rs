//! ontoforest: reconstructs rooted ontology forests
//!
//! Ingests hierarchical ontology data, either a tab-separated table with
//! explicit parent ids or OBO term graphs with `is_a` relations, and builds
//! a forest of rooted trees annotated with depth levels, ready for a
//! downstream visualization layer.
//!
//! The pipeline is: source adapter, fixed-point tree builder, orphan
//! cleanup, subtree pruning, metric annotation (graph sources only). All of
//! it is single-threaded batch computation; the only I/O lives in the
//! adapter's file read and the [`fetch`] collaborator.

use std::path::Path;

pub mod adapter;
pub mod annotate;
pub mod builder;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod model;
pub mod obo;
pub mod prune;
pub mod status;
pub mod util;

pub use errors::{OntologyError, OntologyResult};
pub use model::{Forest, Node, SourceNode, Tree};
pub use status::{NullSink, StatusSink};

use obo::TermRecord;

/// Options for graph-mode builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphBuildOptions {
    /// Root term id; `None` lets every ancestor-less term seed a tree
    pub root_id: Option<String>,
    /// Drop trees smaller than this after the fixed point
    pub min_node_size: Option<usize>,
    /// Skip terms flagged `is_obsolete`
    pub exclude_obsolete: bool,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            root_id: None,
            min_node_size: None,
            exclude_obsolete: true,
        }
    }
}

/// Build a forest from flat tab-delimited ontology text.
pub fn forest_from_flat_text(
    text: &str,
    min_node_size: Option<usize>,
    sink: &dyn StatusSink,
) -> Forest {
    let nodes = adapter::nodes_from_flat_text(text, sink);
    let mut forest = builder::build_flat_forest(nodes, sink);
    prune::prune_small_trees(&mut forest, min_node_size);
    forest
}

/// Build a forest from a flat tab-delimited ontology file.
pub fn forest_from_flat_file(
    path: &Path,
    min_node_size: Option<usize>,
    sink: &dyn StatusSink,
) -> OntologyResult<Forest> {
    let nodes = adapter::nodes_from_flat_file(path, sink)?;
    let mut forest = builder::build_flat_forest(nodes, sink);
    prune::prune_small_trees(&mut forest, min_node_size);
    Ok(forest)
}

/// Build a forest from already-parsed OBO term records.
///
/// Pruning runs after the fixed point, annotation last, so annotation cost
/// is bounded by the final forest size, not the raw input size.
pub fn forest_from_terms(
    terms: &[TermRecord],
    options: &GraphBuildOptions,
    sink: &dyn StatusSink,
) -> Forest {
    let nodes = adapter::nodes_from_terms(terms, options.exclude_obsolete);
    let mut forest = builder::build_graph_forest(&nodes, options.root_id.as_deref(), sink);
    prune::prune_small_trees(&mut forest, options.min_node_size);
    annotate::annotate_forest(&mut forest);
    forest
}

/// Build a forest from raw .obo text.
pub fn forest_from_obo_text(
    text: &str,
    options: &GraphBuildOptions,
    sink: &dyn StatusSink,
) -> Forest {
    let terms = obo::parse_terms(text);
    forest_from_terms(&terms, options, sink)
}

/// Build a forest from a local .obo file.
pub fn forest_from_obo_file(
    path: &Path,
    options: &GraphBuildOptions,
    sink: &dyn StatusSink,
) -> OntologyResult<Forest> {
    if !path.exists() {
        return Err(OntologyError::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(forest_from_obo_text(&text, options, sink))
}
