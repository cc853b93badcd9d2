mod analyze;
mod classify;
mod manual;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nichescan_core::{load_taxonomy, AppConfig, Taxonomy};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nichescan")]
#[command(about = "Keyword market research from search results")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and analyse a keyword
    Analyze {
        /// Keyword to research, e.g. "habit tracker"
        keyword: String,
        /// Two-letter country code for the search locale
        #[arg(long, default_value = "us")]
        country: String,
        /// Skip the LLM rewrite and market report even if a key is configured
        #[arg(long)]
        no_enrich: bool,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a saved search provider payload without network access
    Classify {
        /// Path to a JSON file holding one provider response
        file: PathBuf,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge hand-curated JSON into a stored analysis (needs DATABASE_URL)
    Override {
        /// Keyword of the stored analysis
        keyword: String,
        #[arg(long, default_value = "us")]
        country: String,
        /// JSON array of app items replacing the classified ones
        #[arg(long)]
        apps: Option<PathBuf>,
        /// JSON array of seeding targets replacing the classified ones
        #[arg(long)]
        targets: Option<PathBuf>,
        /// JSON object stored as the market report
        #[arg(long)]
        report: Option<PathBuf>,
        /// Search provider payload; required when the keyword was never analysed
        #[arg(long)]
        raw: Option<PathBuf>,
    },
    /// Print the enrichment prompts for a stored analysis (needs DATABASE_URL)
    Prompts {
        /// Keyword of the stored analysis
        keyword: String,
        #[arg(long, default_value = "us")]
        country: String,
        /// Print both prompts as one JSON object
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = nichescan_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze {
            keyword,
            country,
            no_enrich,
            json,
        }) => {
            let taxonomy = taxonomy(&config)?;
            analyze::run_analyze(&config, taxonomy, &keyword, &country, !no_enrich, json).await?;
        }
        Some(Commands::Classify { file, json }) => {
            let taxonomy = taxonomy(&config)?;
            classify::run_classify(&file, &taxonomy, json)?;
        }
        Some(Commands::Override {
            keyword,
            country,
            apps,
            targets,
            report,
            raw,
        }) => {
            let files = manual::OverrideFiles {
                apps,
                targets,
                report,
                raw,
            };
            manual::run_override(&config, &keyword, &country, &files).await?;
        }
        Some(Commands::Prompts {
            keyword,
            country,
            json,
        }) => {
            let taxonomy = taxonomy(&config)?;
            manual::run_prompts(&config, &taxonomy, &keyword, &country, json).await?;
        }
        None => println!("nichescan: run `nichescan --help` for commands"),
    }

    Ok(())
}

fn taxonomy(config: &AppConfig) -> anyhow::Result<Taxonomy> {
    Ok(match config.taxonomy_path.as_deref() {
        Some(path) => load_taxonomy(path)?,
        None => Taxonomy::default(),
    })
}

#[cfg(test)]
mod tests;
