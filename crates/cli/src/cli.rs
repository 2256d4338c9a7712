use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Render deterministic test fixtures.
///
/// Reads a fixture file, applies its override rules to one forge and prints
/// the resulting records, without touching any real store.
#[derive(Parser, Debug)]
#[command(name = "data-forge", about = "Render and inspect test data fixtures")]
pub struct CliArgs {
    /// Path to the fixture file (YAML or JSON)
    #[arg(long, short = 'f', global = true, default_value = "fixtures.yml")]
    pub file: PathBuf,

    /// Force key-path error suppression on or off (default: read DATA_FORGE_SUPPRESS_KEY_PATH_ERRORS)
    #[arg(long, global = true)]
    pub suppress_key_path_errors: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a forge's records after overrides, optionally filtered by a tag query
    Render {
        /// Forge to render
        #[arg(long)]
        forge_id: String,

        /// Tag query as JSON, e.g. '{"StringEquals": {"type": "user"}}'
        #[arg(long)]
        query: Option<String>,

        /// Drop each record's tags from the output
        #[arg(long)]
        without_tags: bool,
    },
    /// Print the keys a forge would delete on cleanup
    Keys {
        #[arg(long)]
        forge_id: String,
    },
    /// List the forges defined in the fixture file
    List,
}
