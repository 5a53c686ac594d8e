//! Term source adapter: normalizes heterogeneous ontology inputs
//!
//! Two input shapes are supported: tab-delimited flat rows carrying explicit
//! parent ids, and parsed OBO term records carrying `is_a` ancestor
//! references. Both are normalized into [`SourceNode`]s for the tree builder.

use std::fs;
use std::path::Path;

use tracing::{instrument, warn};

use crate::errors::{OntologyError, OntologyResult};
use crate::model::{SourceNode, DEFAULT_COLOR, UNSET_COUNT, UNSET_IMPORTED_COUNT};
use crate::obo::TermRecord;
use crate::status::StatusSink;

/// Data fields in a flat ontology row: ids, parent, label, description,
/// count, color.
const FLAT_FIELD_COUNT: usize = 6;

/// Normalize flat tab-delimited ontology text.
///
/// The first line is a header and is skipped. A row whose id field joins
/// several ids with `|` expands into one node per id sharing the remaining
/// fields. Rows with too few fields are skipped, not fatal.
#[instrument(level = "debug", skip(text, sink))]
pub fn nodes_from_flat_text(text: &str, sink: &dyn StatusSink) -> Vec<SourceNode> {
    let mut nodes = Vec::new();
    let mut skipped = 0usize;

    for (line_idx, line) in text.lines().enumerate() {
        if line_idx == 0 || line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < FLAT_FIELD_COUNT {
            warn!(
                "skipping row {}: expected {} fields, got {}",
                line_idx + 1,
                FLAT_FIELD_COUNT,
                fields.len()
            );
            skipped += 1;
            continue;
        }

        let parent = fields[1];
        let (counts, imported_counts) = parse_count(fields[4]);
        for id in fields[0].split('|') {
            nodes.push(SourceNode {
                id: id.to_string(),
                parent_refs: if parent.is_empty() {
                    Vec::new()
                } else {
                    vec![parent.to_string()]
                },
                label: fields[2].to_string(),
                description: fields[3].to_string(),
                counts,
                imported_counts,
                color: fields[5].to_string(),
                definition: None,
                comment: None,
            });
        }
    }

    if skipped > 0 {
        sink.notify(&format!("Skipped {skipped} malformed rows"));
    }
    nodes
}

/// Read and normalize a flat ontology file.
pub fn nodes_from_flat_file(path: &Path, sink: &dyn StatusSink) -> OntologyResult<Vec<SourceNode>> {
    if !path.exists() {
        return Err(OntologyError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(nodes_from_flat_text(&text, sink))
}

/// Normalize parsed OBO term records.
///
/// Metric fields start at the unset sentinels; definition and comment are
/// carried along for the annotation pass.
#[instrument(level = "debug", skip(terms))]
pub fn nodes_from_terms(terms: &[TermRecord], exclude_obsolete: bool) -> Vec<SourceNode> {
    terms
        .iter()
        .filter(|term| !(exclude_obsolete && term.is_obsolete))
        .map(|term| SourceNode {
            id: term.id.clone(),
            parent_refs: term.is_a.iter().map(|r| r.id.clone()).collect(),
            label: term.label.clone(),
            description: String::new(),
            counts: UNSET_COUNT,
            imported_counts: UNSET_IMPORTED_COUNT,
            color: DEFAULT_COLOR.to_string(),
            definition: term.definition.clone(),
            comment: term.comment.clone(),
        })
        .collect()
}

/// A zero or malformed count means "unset": both metric fields fall back to
/// their sentinels so later layers can tell unset apart from real data.
fn parse_count(raw: &str) -> (f64, f64) {
    match raw.trim().parse::<i64>() {
        Ok(count) if count != 0 => (count as f64, count as f64),
        _ => (UNSET_COUNT, UNSET_IMPORTED_COUNT),
    }
}
