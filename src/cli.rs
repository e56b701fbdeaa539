//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::borrow::Cow;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "doxidx")]
#[command(about = "Inspect, verify, query and build documentation search indexes", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./doxidx.toml when present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify record and master-index invariants
    Check {
        /// Search directory, or a single shard file
        path: PathBuf,
        /// Emit findings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query an index the way the browser UI would
    Search {
        /// Search directory
        dir: PathBuf,
        query: String,
        /// Section to search (all, classes, functions, ...)
        #[arg(short, long, default_value = "all")]
        section: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Rank with the term index instead of label matching
        #[arg(long)]
        ranked: bool,
    },
    /// Build a search directory from a JSON symbol table
    Generate {
        /// JSON symbol table
        symbols: PathBuf,
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Dump a shard file as JSON
    Dump {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
}

/// Expands a leading tilde (`~`) to the user's home directory.
///
/// Returns `Cow::Borrowed` if no expansion is needed.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
