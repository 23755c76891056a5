//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Reshape genealogy and library graph-query records into renderable hierarchies
#[derive(Parser, Debug)]
#[command(name = "vassar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: ./.vassar.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// JSON snapshot of graph-query results (overrides config)
    #[arg(short, long, global = true, env = "VASSAR_SNAPSHOT", value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// How a tree is written to stdout.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty JSON, the shape the web client renders
    #[default]
    Json,
    /// Indented terminal tree
    Tree,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authors → series → books
    Library {
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Attach books without a series directly to their author
        #[arg(long)]
        no_fallback: bool,
        /// Label for books without a series (overrides config)
        #[arg(long, conflicts_with = "no_fallback")]
        fallback: Option<String>,
    },

    /// Parent → descendant tree
    Lineage {
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Family tree with couple (union) nodes
    Family {
        /// Root person id (default: config, else every root)
        #[arg(short, long)]
        root: Option<i64>,
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Coerce CSV files into typed records (JSON on stdout)
    Import {
        /// CSV file or directory of CSV files
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// Integer fields (replaces config)
        #[arg(long = "int", value_delimiter = ',')]
        integer_fields: Vec<String>,
        /// Float fields (replaces config)
        #[arg(long = "float", value_delimiter = ',')]
        float_fields: Vec<String>,
    },

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
    /// Print effective settings as TOML
    Show,
    /// Print config file locations
    Path,
}
