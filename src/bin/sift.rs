//! CLI binary for sift.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sift::{ResearchPipeline, SiftConfig};
use tracing_subscriber::EnvFilter;

/// Sift: research a question across many search and AI providers.
#[derive(Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    /// Path to TOML configuration file. Defaults to the user config path
    /// when it exists.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of search hits kept after ranking.
    #[arg(long)]
    max_results: Option<usize>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,

    /// Print the default configuration as TOML and exit.
    #[arg(long)]
    print_default_config: bool,

    /// The research question.
    #[arg(required_unless_present = "print_default_config")]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sift=info,sift_search=info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", SiftConfig::default().to_toml()?);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let mut pipeline = ResearchPipeline::from_config(&config)?;
    if let Some(max_results) = cli.max_results {
        pipeline = pipeline.with_max_results(max_results);
    }
    if let Err(err) = pipeline.check() {
        tracing::warn!(error = %err, "continuing without search providers");
    }

    let query = cli.query.join(" ");
    let report = pipeline.run(&query).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<SiftConfig> {
    match path {
        Some(path) => SiftConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            let default_path = SiftConfig::default_config_path();
            if default_path.exists() {
                tracing::debug!(path = %default_path.display(), "loading user config");
                SiftConfig::from_file(&default_path).with_context(|| {
                    format!("failed to load config from {}", default_path.display())
                })
            } else {
                Ok(SiftConfig::default())
            }
        }
    }
}
