//! Metric annotation pass

use tracing::instrument;

use crate::model::{Forest, DEFAULT_COLOR, UNSET_COUNT, UNSET_IMPORTED_COUNT};

/// Reset every node's metrics to the unset sentinels and its color to the
/// default, so a visualization layer can overlay real counts later without
/// confusing "never set" with "set to zero".
///
/// Nodes carrying OBO definition or comment metadata additionally get their
/// description synthesized from those two fields; flat-sourced nodes carry
/// neither, so an adapter-provided description survives untouched.
///
/// Runs last, after pruning, which bounds its cost by the final forest size.
/// Idempotent: a second pass writes the same values.
#[instrument(level = "debug", skip(forest))]
pub fn annotate_forest(forest: &mut Forest) {
    for tree in forest.values_mut() {
        for node in tree.values_mut() {
            node.counts = UNSET_COUNT;
            node.imported_counts = UNSET_IMPORTED_COUNT;
            node.color = DEFAULT_COLOR.to_string();
            if node.definition.is_some() || node.comment.is_some() {
                node.description = format!(
                    "Definition: {}\nComment: {}",
                    node.definition.as_deref().unwrap_or("None"),
                    node.comment.as_deref().unwrap_or("None"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Tree};

    fn forest_with(node: Node) -> Forest {
        let mut tree = Tree::new();
        tree.insert(node.id.clone(), node);
        let mut forest = Forest::new();
        forest.insert("R".to_string(), tree);
        forest
    }

    fn node(definition: Option<&str>, comment: Option<&str>) -> Node {
        Node {
            id: "R".to_string(),
            parent: String::new(),
            level: 0,
            label: "root".to_string(),
            description: "from the adapter".to_string(),
            counts: 17.0,
            imported_counts: 17.0,
            color: "#00FF00".to_string(),
            definition: definition.map(str::to_string),
            comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn given_graph_node_when_annotating_then_sentinels_and_composite_description() {
        let mut forest = forest_with(node(Some("a definition"), Some("a comment")));

        annotate_forest(&mut forest);

        let annotated = &forest["R"]["R"];
        assert_eq!(annotated.counts, UNSET_COUNT);
        assert!(!annotated.has_counts());
        assert_eq!(annotated.imported_counts, UNSET_IMPORTED_COUNT);
        assert_eq!(annotated.color, DEFAULT_COLOR);
        assert_eq!(
            annotated.description,
            "Definition: a definition\nComment: a comment"
        );
    }

    #[test]
    fn given_flat_node_when_annotating_then_description_is_preserved() {
        let mut forest = forest_with(node(None, None));

        annotate_forest(&mut forest);

        assert_eq!(forest["R"]["R"].description, "from the adapter");
        assert_eq!(forest["R"]["R"].counts, UNSET_COUNT);
    }

    #[test]
    fn given_annotated_forest_when_annotating_again_then_values_are_identical() {
        let mut forest = forest_with(node(Some("def"), None));

        annotate_forest(&mut forest);
        let first = forest.clone();
        annotate_forest(&mut forest);

        assert_eq!(forest, first);
    }
}
