//! Command dispatch

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output::{self, ConsoleSink};
use crate::config::{global_config_path, Settings};
use crate::fetch;
use crate::model::{Forest, Tree};
use crate::status::{NullSink, StatusSink};
use crate::GraphBuildOptions;

pub fn execute_command(cli: &Cli) -> Result<()> {
    let sink: Box<dyn StatusSink> = if cli.quiet {
        Box::new(NullSink)
    } else {
        Box::new(ConsoleSink)
    };

    match &cli.command {
        Some(Commands::Flat {
            file,
            min_size,
            tree,
        }) => _flat(file, *min_size, *tree, &*sink),
        Some(Commands::Obo {
            file,
            root,
            min_size,
            include_obsolete,
            tree,
        }) => _obo(
            file,
            root.as_deref(),
            *min_size,
            *include_obsolete,
            *tree,
            &*sink,
        ),
        Some(Commands::Fetch { ontology, tree }) => _fetch(ontology, *tree, &*sink),
        Some(Commands::Ontologies) => _ontologies(),
        Some(Commands::Config { command }) => _config(command),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

#[instrument(skip(sink))]
fn _flat(file: &Path, min_size: Option<usize>, tree: bool, sink: &dyn StatusSink) -> Result<()> {
    debug!("file: {:?}", file);
    let forest = crate::forest_from_flat_file(file, min_size, sink)?;
    report_forest(&forest, tree);
    Ok(())
}

#[instrument(skip(sink))]
fn _obo(
    file: &Path,
    root: Option<&str>,
    min_size: Option<usize>,
    include_obsolete: bool,
    tree: bool,
    sink: &dyn StatusSink,
) -> Result<()> {
    debug!("file: {:?}, root: {:?}", file, root);
    let options = GraphBuildOptions {
        root_id: root.map(str::to_string),
        min_node_size: min_size,
        exclude_obsolete: !include_obsolete,
    };
    let forest = crate::forest_from_obo_file(file, &options, sink)?;
    report_forest(&forest, tree);
    Ok(())
}

#[instrument(skip(sink))]
fn _fetch(ontology: &str, tree: bool, sink: &dyn StatusSink) -> Result<()> {
    let settings = Settings::load()?;
    let forest = fetch::build_remote_forest(ontology, &settings, sink)?;
    report_forest(&forest, tree);
    Ok(())
}

#[instrument]
fn _ontologies() -> Result<()> {
    let settings = Settings::load()?;
    output::header("Known ontologies");
    for source in fetch::known_ontologies(&settings) {
        output::detail(&format!(
            "{:<8} {} ({})",
            source.key, source.descriptor, source.url
        ));
    }
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init => {
            let Some(path) = global_config_path() else {
                anyhow::bail!("cannot determine config directory");
            };
            if path.exists() {
                output::warning(&format!("config already exists: {}", path.display()));
                return Ok(());
            }
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&path, Settings::template())?;
            output::success(&format!("created {}", path.display()));
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&path.display()),
                None => output::warning("cannot determine config directory"),
            }
            let settings = Settings::load()?;
            output::info(&format!("cache: {}", settings.cache_dir.display()));
        }
    }
    Ok(())
}

fn _completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

/// Print the forest, either rendered tree by tree or as a summary table,
/// largest trees first.
fn report_forest(forest: &Forest, render: bool) {
    if forest.is_empty() {
        output::warning("empty forest: no roots found");
        return;
    }

    let by_size = forest
        .iter()
        .sorted_by_key(|(_, tree)| std::cmp::Reverse(tree.len()));

    if render {
        for (root_id, tree) in by_size {
            output::info(&display_tree(tree, root_id));
        }
        return;
    }

    output::header(&format!(
        "{} trees, {} nodes",
        forest.len(),
        forest.values().map(Tree::len).sum::<usize>()
    ));
    for (root_id, tree) in by_size {
        let depth = tree.values().map(|n| n.level).max().unwrap_or(0) + 1;
        let label = &tree[root_id].label;
        output::detail(&format!(
            "{root_id} ({label}): {} nodes, depth {depth}",
            tree.len()
        ));
    }
}

fn display_tree(tree: &Tree, id: &str) -> termtree::Tree<String> {
    let node = &tree[id];
    let text = if node.label.is_empty() {
        node.id.clone()
    } else {
        format!("{} ({})", node.id, node.label)
    };
    let leaves: Vec<_> = tree
        .values()
        .filter(|n| n.parent == id)
        .map(|n| display_tree(tree, &n.id))
        .collect();
    termtree::Tree::new(text).with_leaves(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_flat_forest;
    use crate::model::SourceNode;

    fn node(id: &str, parent: &str) -> SourceNode {
        SourceNode {
            id: id.to_string(),
            parent_refs: if parent.is_empty() {
                Vec::new()
            } else {
                vec![parent.to_string()]
            },
            label: String::new(),
            description: String::new(),
            counts: 0.0,
            imported_counts: 0.0,
            color: String::new(),
            definition: None,
            comment: None,
        }
    }

    #[test]
    fn given_tree_when_rendering_then_children_are_nested() {
        let forest = build_flat_forest(
            vec![node("A", ""), node("B", "A"), node("C", "B")],
            &NullSink,
        );

        let rendered = display_tree(&forest["A"], "A").to_string();

        assert!(rendered.starts_with('A'));
        assert!(rendered.contains("└── B"));
        assert!(rendered.contains("└── C"));
    }
}
