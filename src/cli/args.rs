//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Reconstructs rooted ontology forests from flat parent/child tables or OBO term graphs
#[derive(Parser, Debug)]
#[command(name = "ontoforest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Suppress progress messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a forest from a flat tab-delimited table
    Flat {
        /// Input table: id, parent, label, description, count, color
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Drop trees with fewer nodes
        #[arg(short, long)]
        min_size: Option<usize>,

        /// Render the trees instead of a summary
        #[arg(short, long)]
        tree: bool,
    },

    /// Build a forest from a local .obo file
    Obo {
        /// Input .obo file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Root term id (default: every ancestor-less term seeds a tree)
        #[arg(short, long)]
        root: Option<String>,

        /// Drop trees with fewer nodes
        #[arg(short, long)]
        min_size: Option<usize>,

        /// Keep terms flagged is_obsolete
        #[arg(long)]
        include_obsolete: bool,

        /// Render the trees instead of a summary
        #[arg(short, long)]
        tree: bool,
    },

    /// Download and build a known remote ontology
    Fetch {
        /// Registry key (see `ontoforest ontologies`)
        ontology: String,

        /// Render the trees instead of a summary
        #[arg(short, long)]
        tree: bool,
    },

    /// List known remote ontologies
    Ontologies,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init,

    /// Show config paths
    Path,
}
