//! `analyze`: a live run of the full pipeline.

use nichescan_core::{AppConfig, Taxonomy};
use nichescan_db::ConfiguredCache;
use nichescan_enrich::{ConfiguredEnricher, Passthrough};
use nichescan_pipeline::{PayloadSource, Pipeline, PipelineTimeouts};
use nichescan_serp::SerpClient;

use crate::output::{print_json, render_plain};

/// Runs one analysis and prints it.
///
/// The cache is Postgres when `DATABASE_URL` is set and process-local
/// otherwise, so repeated CLI runs only share results through the database.
///
/// # Errors
///
/// Returns an error if `VALUESERP_API_KEY` is missing, a client cannot be
/// built, the database cannot be reached, or the keyword is empty. A failed
/// search is not an error; it prints the error verdict.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    taxonomy: Taxonomy,
    keyword: &str,
    country: &str,
    enrich: bool,
    json: bool,
) -> anyhow::Result<()> {
    let serp = SerpClient::from_config(config)?;
    let cache = ConfiguredCache::connect(config).await?;
    let enricher = if enrich {
        ConfiguredEnricher::from_config(config)?
    } else {
        ConfiguredEnricher::Passthrough(Passthrough)
    };

    let pipeline = Pipeline::new(serp, cache, enricher, taxonomy)
        .with_timeouts(PipelineTimeouts::from_app_config(config));
    let analysis = pipeline.run_analysis(country, keyword).await?;

    if analysis.source == PayloadSource::Cache {
        tracing::info!(cache_key = %analysis.key.id(), "served from cache");
    }

    if json {
        print_json(&analysis.result)?;
    } else {
        print!("{}", render_plain(&analysis.key.keyword, &analysis.result));
    }
    Ok(())
}
