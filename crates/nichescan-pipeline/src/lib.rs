//! Request-scoped orchestration of one analysis: cache, fetch, classify,
//! enrich, score, write back.

pub mod error;
pub mod manual;

use std::time::Duration;

use nichescan_classify::{classify_response, rank, Classified, OpportunityScorer};
use nichescan_core::{country_locale, AnalysisResult, AppConfig, AppItem, Taxonomy};
use nichescan_db::{AnalysisCache, AnalysisKey, AnalysisRow};
use nichescan_enrich::{Enricher, ManualPrompts};
use nichescan_serp::{max_total_backoff, SerpClient, SerpResponse};

pub use error::PipelineError;
pub use manual::OverrideInput;

use crate::manual::Overrides;

const HEADROOM: Duration = Duration::from_secs(5);

/// Upper bounds on the external calls of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineTimeouts {
    pub fetch: Duration,
    pub enrich: Duration,
}

impl Default for PipelineTimeouts {
    fn default() -> Self {
        Self {
            fetch: Duration::from_secs(60),
            enrich: Duration::from_secs(50),
        }
    }
}

impl PipelineTimeouts {
    /// Covers every attempt at the per-request client timeout plus every
    /// backoff sleep between them, so the last retry can finish before the
    /// outer bound trips.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let attempts = u64::from(config.serp_max_retries) + 1;
        let requests = Duration::from_secs(config.serp_timeout_secs.saturating_mul(attempts));
        let backoff = max_total_backoff(config.serp_max_retries, config.serp_backoff_base_secs);
        Self {
            fetch: requests + backoff + HEADROOM,
            enrich: Duration::from_secs(config.llm_timeout_secs) + HEADROOM,
        }
    }
}

/// Where the provider payload of an [`Analysis`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Cache,
    Fresh,
    /// The fetch failed; the result carries the error verdict.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub key: AnalysisKey,
    pub result: AnalysisResult,
    pub source: PayloadSource,
}

pub struct Pipeline<C, E> {
    serp: SerpClient,
    cache: C,
    enricher: E,
    taxonomy: Taxonomy,
    scorer: OpportunityScorer,
    timeouts: PipelineTimeouts,
}

impl<C: AnalysisCache, E: Enricher> Pipeline<C, E> {
    #[must_use]
    pub fn new(serp: SerpClient, cache: C, enricher: E, taxonomy: Taxonomy) -> Self {
        Self {
            serp,
            cache,
            enricher,
            taxonomy,
            scorer: OpportunityScorer::default(),
            timeouts: PipelineTimeouts::default(),
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: PipelineTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: OpportunityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn enricher(&self) -> &E {
        &self.enricher
    }

    /// Runs one analysis for `keyword` in `country`.
    ///
    /// 1. Read the cache; a payload that no longer parses counts as a miss.
    /// 2. On a miss, fetch from the provider within the fetch timeout and
    ///    store the payload. A failed fetch returns the error verdict.
    /// 3. Classify the payload, replacing either item list with a stored
    ///    editor override.
    /// 4. Rewrite items and build the market report concurrently, reusing a
    ///    cached report when one exists. Overridden apps are not rewritten.
    /// 5. Re-rank, score, and write a new non-empty report back.
    ///
    /// Store and enrichment failures are logged and never fail the analysis.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyKeyword`] when `keyword` has no slug.
    pub async fn run_analysis(&self, country: &str, keyword: &str) -> Result<Analysis, PipelineError> {
        let key = AnalysisKey::new(country, keyword);
        if key.slug.is_empty() {
            return Err(PipelineError::EmptyKeyword);
        }

        // Step 1: Cache.
        let row = self.read_row(&key).await;
        let overrides = row
            .as_ref()
            .map(|row| Overrides::from_row(&key.id(), row))
            .unwrap_or_default();
        let cached = row.and_then(|row| decode_row(&key, row));

        // Step 2: Fetch on miss.
        let (response, cached_report, source) = match cached {
            Some((response, report)) => (response, report, PayloadSource::Cache),
            None => match self.fetch(&key).await {
                Some(response) => {
                    self.write_payload(&key, &response).await;
                    (response, None, PayloadSource::Fresh)
                }
                None => {
                    return Ok(Analysis {
                        key,
                        result: AnalysisResult::fetch_error(),
                        source: PayloadSource::Unavailable,
                    })
                }
            },
        };

        // Step 3: Classify, then swap in editor lists.
        let mut classified = classify_response(&response, &self.taxonomy);
        if let Some(targets) = overrides.seeding_targets {
            classified.seeding_targets = targets;
        }

        // Step 4: Enrich. Editor apps are final: not rewritten, order kept.
        let report = match overrides.apps {
            Some(apps) => {
                classified.apps = apps;
                self.report(&key, &classified, cached_report.clone()).await
            }
            None => {
                let (apps, report) = self.enrich(&key, &classified, cached_report.clone()).await;
                classified.apps = rank(apps);
                report
            }
        };

        // Step 5: Score and write back.
        let mut result = classified.into_result(&self.scorer);
        if !report.is_empty() {
            if cached_report.as_deref() != Some(report.as_str()) {
                if let Err(e) = self.cache.update_report(&key, &report).await {
                    tracing::warn!(cache_key = %key.id(), error = %e, "failed to store market report");
                }
            }
            result.market_report = Some(report);
        }

        tracing::info!(
            keyword = %key.keyword,
            country = %key.country,
            apps = result.apps.len(),
            seeding_targets = result.seeding_targets.len(),
            verdict = %result.verdict.status,
            cached = source == PayloadSource::Cache,
            "analysis complete"
        );

        Ok(Analysis { key, result, source })
    }

    async fn read_row(&self, key: &AnalysisKey) -> Option<AnalysisRow> {
        match self.cache.get(key).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(cache_key = %key.id(), error = %e, "cache read failed, fetching");
                None
            }
        }
    }

    async fn fetch(&self, key: &AnalysisKey) -> Option<SerpResponse> {
        let locale = country_locale(&key.country);
        match tokio::time::timeout(self.timeouts.fetch, self.serp.search(&key.keyword, &locale)).await {
            Ok(Ok(response)) => Some(response),
            Ok(Err(e)) => {
                tracing::warn!(keyword = %key.keyword, country = %key.country, error = %e, "search fetch failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    keyword = %key.keyword,
                    country = %key.country,
                    timeout_secs = self.timeouts.fetch.as_secs(),
                    "search fetch timed out"
                );
                None
            }
        }
    }

    async fn write_payload(&self, key: &AnalysisKey, response: &SerpResponse) {
        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(cache_key = %key.id(), error = %e, "failed to encode payload for cache");
                return;
            }
        };
        if let Err(e) = self.cache.put(key, &raw).await {
            tracing::warn!(cache_key = %key.id(), error = %e, "cache write failed");
        }
    }

    /// Both calls see the heuristic items; neither waits for the other.
    async fn enrich(
        &self,
        key: &AnalysisKey,
        classified: &Classified,
        cached_report: Option<String>,
    ) -> (Vec<AppItem>, String) {
        if !self.enricher.is_enabled() {
            return (classified.apps.clone(), cached_report.unwrap_or_default());
        }

        let keyword = key.keyword.as_str();
        let rewrite = async {
            match tokio::time::timeout(
                self.timeouts.enrich,
                self.enricher.rewrite(keyword, &classified.apps),
            )
            .await
            {
                Ok(apps) => apps,
                Err(_) => {
                    tracing::warn!(keyword, "rewrite timed out, keeping heuristic items");
                    classified.apps.clone()
                }
            }
        };
        let report = self.report(key, classified, cached_report);

        tokio::join!(rewrite, report)
    }

    /// The cached report when there is one, otherwise a fresh one within the
    /// enrichment timeout. Empty when neither is available.
    async fn report(
        &self,
        key: &AnalysisKey,
        classified: &Classified,
        cached_report: Option<String>,
    ) -> String {
        if let Some(report) = cached_report {
            return report;
        }
        if !self.enricher.is_enabled() {
            return String::new();
        }
        let keyword = key.keyword.as_str();
        tokio::time::timeout(
            self.timeouts.enrich,
            self.enricher
                .report(keyword, &classified.apps, &classified.seeding_targets),
        )
        .await
        .unwrap_or_else(|_| {
            tracing::warn!(keyword, "market report timed out");
            String::new()
        })
    }

    /// See [`manual::save_override`].
    ///
    /// # Errors
    ///
    /// As [`manual::save_override`].
    pub async fn save_override(
        &self,
        country: &str,
        keyword: &str,
        input: &OverrideInput,
    ) -> Result<AnalysisKey, PipelineError> {
        manual::save_override(&self.cache, country, keyword, input).await
    }

    /// See [`manual::export_prompts`].
    ///
    /// # Errors
    ///
    /// As [`manual::export_prompts`].
    pub async fn manual_prompts(
        &self,
        country: &str,
        keyword: &str,
    ) -> Result<(AnalysisKey, ManualPrompts), PipelineError> {
        manual::export_prompts(&self.cache, &self.taxonomy, country, keyword).await
    }
}

/// A payload that no longer parses counts as a miss.
fn decode_row(key: &AnalysisKey, row: AnalysisRow) -> Option<(SerpResponse, Option<String>)> {
    match SerpResponse::from_json(&row.raw_payload) {
        Ok(response) => {
            tracing::debug!(cache_key = %key.id(), "cache hit");
            let report = row.market_report.filter(|r| !r.trim().is_empty());
            Some((response, report))
        }
        Err(e) => {
            tracing::warn!(cache_key = %key.id(), error = %e, "malformed cached payload, refetching");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_config(max_retries: u32, backoff_base_secs: u64) -> AppConfig {
        AppConfig {
            database_url: None,
            env: nichescan_core::Environment::Test,
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            taxonomy_path: None,
            serp_api_key: None,
            serp_base_url: "http://localhost".to_string(),
            serp_timeout_secs: 10,
            serp_max_retries: max_retries,
            serp_backoff_base_secs: backoff_base_secs,
            serp_max_page: 2,
            llm_api_key: None,
            llm_base_url: "http://localhost".to_string(),
            llm_model: "m".to_string(),
            llm_timeout_secs: 45,
            db_max_connections: 10,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
        }
    }

    #[test]
    fn timeouts_cover_every_retry() {
        let timeouts = PipelineTimeouts::from_app_config(&app_config(2, 1));
        // 3 attempts of 10s, two sleeps floored at the Retry-After cap, 5s headroom.
        assert_eq!(timeouts.fetch, Duration::from_secs(30 + 20 + 5));
        assert_eq!(timeouts.enrich, Duration::from_secs(50));
    }

    #[test]
    fn fetch_bound_grows_with_backoff_base() {
        let timeouts = PipelineTimeouts::from_app_config(&app_config(2, 30));
        // Sleeps of 30s and 60s before the second and third attempt.
        assert_eq!(timeouts.fetch, Duration::from_secs(30 + 90 + 5));
    }

    #[test]
    fn no_retries_means_no_backoff() {
        let timeouts = PipelineTimeouts::from_app_config(&app_config(0, 30));
        assert_eq!(timeouts.fetch, Duration::from_secs(15));
    }
}
