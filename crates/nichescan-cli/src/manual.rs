//! `override` and `prompts`: editor operations on analyses stored in the
//! database.

use std::path::{Path, PathBuf};

use anyhow::Context;
use nichescan_core::{AppConfig, Taxonomy};
use nichescan_db::{AnalysisCache, ConfiguredCache};
use nichescan_enrich::ManualPrompts;
use nichescan_pipeline::{manual, OverrideInput};

/// Files holding the JSON documents of one override.
#[derive(Debug, Default)]
pub(crate) struct OverrideFiles {
    pub apps: Option<PathBuf>,
    pub targets: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub raw: Option<PathBuf>,
}

impl OverrideFiles {
    fn read(&self) -> anyhow::Result<OverrideInput> {
        Ok(OverrideInput {
            processed_apps: read_optional(self.apps.as_deref())?,
            seeding_targets: read_optional(self.targets.as_deref())?,
            market_report: read_optional(self.report.as_deref())?,
            raw_payload: read_optional(self.raw.as_deref())?,
        })
    }
}

fn read_optional(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
    })
    .transpose()
}

/// Overrides only make sense against a store that outlives the process.
async fn persistent_cache(config: &AppConfig) -> anyhow::Result<ConfiguredCache> {
    let cache = ConfiguredCache::connect(config).await?;
    if matches!(cache, ConfiguredCache::Memory(_)) {
        anyhow::bail!("DATABASE_URL must be set to work with stored analyses");
    }
    tracing::debug!(backend = cache.backend(), "using analysis store");
    Ok(cache)
}

/// # Errors
///
/// Returns an error if a file cannot be read, a document fails validation,
/// the database is unavailable, or the keyword has no stored analysis and no
/// raw payload was given.
pub(crate) async fn run_override(
    config: &AppConfig,
    keyword: &str,
    country: &str,
    files: &OverrideFiles,
) -> anyhow::Result<()> {
    let input = files.read()?;
    let cache = persistent_cache(config).await?;
    let key = manual::save_override(&cache, country, keyword, &input).await?;
    println!("saved override for {} ({})", key.keyword, key.country);
    Ok(())
}

/// # Errors
///
/// Returns an error if the database is unavailable or holds no parseable
/// payload for the keyword.
pub(crate) async fn run_prompts(
    config: &AppConfig,
    taxonomy: &Taxonomy,
    keyword: &str,
    country: &str,
    json: bool,
) -> anyhow::Result<()> {
    let cache = persistent_cache(config).await?;
    let (_, prompts) = manual::export_prompts(&cache, taxonomy, country, keyword).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
    } else {
        print!("{}", render_prompts(&prompts));
    }
    Ok(())
}

pub(crate) fn render_prompts(prompts: &ManualPrompts) -> String {
    let section = |title: &str, body: Option<&str>| {
        format!(
            "=== {title} ===\n{}\n\n",
            body.unwrap_or("(skipped: no matching items)")
        )
    };
    let mut out = section("rewrite prompt", prompts.rewrite.as_deref());
    out.push_str(&section("report prompt", prompts.report.as_deref()));
    out
}
