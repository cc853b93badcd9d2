//! Editor operations on stored analyses: merging hand-curated JSON into a
//! row, and exporting the enrichment prompts for a cached payload.

use nichescan_classify::classify_response;
use nichescan_core::{AppItem, SeedingTarget, Taxonomy};
use nichescan_db::{AnalysisCache, AnalysisKey, AnalysisOverride, AnalysisRow, DbError};
use nichescan_enrich::{manual_prompts, ManualPrompts};
use nichescan_serp::SerpResponse;
use serde::de::DeserializeOwned;

use crate::PipelineError;

/// Validates editor JSON and merges it into the stored analysis for
/// `keyword` in `country`.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyKeyword`], a validation error from
/// [`OverrideInput::validate`], or [`PipelineError::Store`] when the write
/// fails. Overriding a keyword that was never analysed needs a raw payload
/// and otherwise fails with [`PipelineError::NotCached`].
pub async fn save_override<C: AnalysisCache>(
    cache: &C,
    country: &str,
    keyword: &str,
    input: &OverrideInput,
) -> Result<AnalysisKey, PipelineError> {
    let key = AnalysisKey::new(country, keyword);
    if key.slug.is_empty() {
        return Err(PipelineError::EmptyKeyword);
    }
    let overrides = input.validate()?;
    match cache.apply_override(&key, &overrides).await {
        Ok(()) => {}
        Err(DbError::NotFound) => return Err(PipelineError::NotCached { cache_key: key.id() }),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(
        cache_key = %key.id(),
        apps = overrides.apps.is_some(),
        seeding_targets = overrides.seeding_targets.is_some(),
        market_report = overrides.market_report.is_some(),
        raw_payload = overrides.raw_payload.is_some(),
        "override saved"
    );
    Ok(key)
}

/// Builds the rewrite and report prompts from the cached payload of
/// `keyword` in `country`, without calling the search provider or model.
///
/// # Errors
///
/// Returns [`PipelineError::NotCached`] when nothing is stored,
/// [`PipelineError::MalformedPayload`] when the stored payload does not
/// parse, or the store and encoding errors of the steps involved.
pub async fn export_prompts<C: AnalysisCache>(
    cache: &C,
    taxonomy: &Taxonomy,
    country: &str,
    keyword: &str,
) -> Result<(AnalysisKey, ManualPrompts), PipelineError> {
    let key = AnalysisKey::new(country, keyword);
    if key.slug.is_empty() {
        return Err(PipelineError::EmptyKeyword);
    }
    let row = cache
        .get(&key)
        .await?
        .ok_or_else(|| PipelineError::NotCached { cache_key: key.id() })?;
    let response = SerpResponse::from_json(&row.raw_payload).map_err(|source| {
        PipelineError::MalformedPayload {
            cache_key: key.id(),
            source,
        }
    })?;
    let classified = classify_response(&response, taxonomy);
    let prompts = manual_prompts(&key.keyword, &classified.apps, &classified.seeding_targets)?;
    Ok((key, prompts))
}

/// JSON documents supplied by an editor, one optional text per field.
/// Blank text counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideInput {
    /// An array of app items in the analysis output shape.
    pub processed_apps: Option<String>,
    /// An array of seeding targets in the analysis output shape.
    pub seeding_targets: Option<String>,
    /// Any JSON object.
    pub market_report: Option<String>,
    /// A full search provider response.
    pub raw_payload: Option<String>,
}

impl OverrideInput {
    /// Parses every supplied document and re-encodes it compactly.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidOverride`] names the first field that fails to
    /// parse or breaks an item invariant, and [`PipelineError::EmptyOverride`]
    /// is returned when no field is supplied.
    pub fn validate(&self) -> Result<AnalysisOverride, PipelineError> {
        let apps = parse_field::<Vec<AppItem>>("processed_apps", self.processed_apps.as_deref())?;
        if let Some(apps) = &apps {
            check_apps(apps)?;
        }
        let targets =
            parse_field::<Vec<SeedingTarget>>("seeding_targets", self.seeding_targets.as_deref())?;
        let report = parse_field::<serde_json::Value>("market_report", self.market_report.as_deref())?;
        if report.as_ref().is_some_and(|r| !r.is_object()) {
            return Err(invalid("market_report", "expected a JSON object"));
        }
        let raw = parse_field::<serde_json::Value>("raw_payload", self.raw_payload.as_deref())?;
        if let Some(raw) = &raw {
            SerpResponse::from_json(&raw.to_string())
                .map_err(|e| invalid("raw_payload", e.to_string()))?;
        }

        let overrides = AnalysisOverride {
            raw_payload: raw.map(|v| v.to_string()),
            apps: apps.map(|a| encode("processed_apps", &a)).transpose()?,
            seeding_targets: targets.map(|t| encode("seeding_targets", &t)).transpose()?,
            market_report: report.map(|v| v.to_string()),
        };
        if overrides.is_empty() {
            return Err(PipelineError::EmptyOverride);
        }
        Ok(overrides)
    }
}

/// Stored overrides decoded for use in an analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Overrides {
    pub apps: Option<Vec<AppItem>>,
    pub seeding_targets: Option<Vec<SeedingTarget>>,
}

impl Overrides {
    /// Columns that no longer decode are logged and ignored.
    pub(crate) fn from_row(cache_key: &str, row: &AnalysisRow) -> Self {
        Self {
            apps: decode_stored(cache_key, "apps_override", row.apps_override.as_deref()),
            seeding_targets: decode_stored(
                cache_key,
                "targets_override",
                row.targets_override.as_deref(),
            ),
        }
    }
}

fn decode_stored<T: DeserializeOwned>(cache_key: &str, column: &str, text: Option<&str>) -> Option<T> {
    let text = text?;
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(cache_key, column, error = %e, "ignoring undecodable override");
            None
        }
    }
}

fn parse_field<T: DeserializeOwned>(
    field: &'static str,
    text: Option<&str>,
) -> Result<Option<T>, PipelineError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| invalid(field, e.to_string()))
}

fn encode<T: serde::Serialize>(field: &'static str, value: &T) -> Result<String, PipelineError> {
    serde_json::to_string(value).map_err(|e| invalid(field, e.to_string()))
}

fn check_apps(apps: &[AppItem]) -> Result<(), PipelineError> {
    let mut domains = std::collections::HashSet::new();
    for app in apps {
        if app.rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
            return Err(invalid(
                "processed_apps",
                format!("rating of {} is outside 0..=5", app.name),
            ));
        }
        if !domains.insert(nichescan_classify::registrable_domain(&app.domain)) {
            return Err(invalid(
                "processed_apps",
                format!("duplicate domain {}", app.domain),
            ));
        }
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidOverride {
        field,
        reason: reason.into(),
    }
}
