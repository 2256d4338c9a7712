mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;

use forge_core::config::load_dotenv;
use forge_core::{records_to_value, CallbackRegistry, ForgeConfig, OverrideEngine, Query};
use forge_fixtures::{FixtureFile, Forge, ForgeOptions, StaticResolver};

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = ForgeConfig::from_env().with_suppression(args.suppress_key_path_errors);
    config.log_summary();

    let registry = CallbackRegistry::with_builtins();
    let fixture = FixtureFile::load(&args.file, &registry)
        .with_context(|| format!("failed to load fixture file {}", args.file.display()))?;

    match args.command {
        Command::List => {
            for entry in &fixture.forges {
                println!("{}\t{}", entry.forge_id, entry.kind.name());
            }
        }
        Command::Render {
            forge_id,
            query,
            without_tags,
        } => {
            let query = query
                .as_deref()
                .map(parse_query)
                .transpose()?;
            let forge = build_forge(&fixture, &forge_id, &config)?;
            let records = if without_tags {
                forge.get_data_without_tags(query.as_ref())
            } else {
                forge.get_data(query.as_ref())
            }
            .with_context(|| format!("failed to query forge '{}'", forge_id))?;
            info!(forge_id = %forge_id, records = records.len(), "rendered forge");
            println!("{}", serde_json::to_string_pretty(&records_to_value(&records))?);
        }
        Command::Keys { forge_id } => {
            let forge = build_forge(&fixture, &forge_id, &config)?;
            println!("{}", serde_json::to_string_pretty(&forge.keys_value())?);
        }
    }

    Ok(())
}

fn parse_query(raw: &str) -> Result<Query> {
    let value: Value = serde_json::from_str(raw).context("query must be valid JSON")?;
    Query::from_value(&value).context("invalid tag query")
}

/// Build one forge. Only literal destination names resolve offline.
fn build_forge(fixture: &FixtureFile, forge_id: &str, config: &ForgeConfig) -> Result<Forge> {
    let entry = fixture.forge(forge_id).with_context(|| {
        let known: Vec<&str> = fixture.forge_ids().collect();
        format!("{} not initialized ({})", forge_id, known.join(","))
    })?;

    let resolver = StaticResolver::new();
    let options = ForgeOptions::new(&resolver)
        .with_engine(OverrideEngine::new(config.suppression))
        .with_overrides(&fixture.overrides);

    entry
        .build(&options)
        .with_context(|| format!("failed to build forge '{}'", forge_id))
}
