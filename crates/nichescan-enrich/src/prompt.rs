//! Prompt text for the two enrichment calls.

use std::fmt::Write as _;

use nichescan_core::{AppItem, ItemType, SeedingTarget};
use serde::Serialize;

use crate::types::RewriteCandidate;
use crate::EnrichError;

/// Items sent to the rewrite call.
pub const REWRITE_BATCH: usize = 15;
/// App-typed items summarised by the report call.
pub const REPORT_TOP_APPS: usize = 5;

pub(crate) fn rating_label(rating: Option<f64>) -> String {
    rating.map_or_else(|| "N/A".to_string(), |r| format!("{r:.1}"))
}

pub(crate) fn rewrite_candidates(items: &[AppItem]) -> Vec<RewriteCandidate<'_>> {
    items
        .iter()
        .take(REWRITE_BATCH)
        .enumerate()
        .map(|(id, item)| RewriteCandidate {
            id,
            name: &item.name,
            snippet: &item.description,
            price_detected: item.pricing_model.as_str(),
            real_rating: rating_label(item.rating),
        })
        .collect()
}

pub(crate) fn rewrite_prompt(keyword: &str, candidates_json: &str) -> String {
    format!(
        r#"You are a senior SaaS copywriter reviewing tools for "{keyword}".
Input items: {candidates_json}

For every input item return one object with the same "id".
- "type": "app" for any interactive software, online utility or downloadable program; "template" only for static files, themes or UI kits; "resource" only for articles, listicles or wikis.
- "pricing": one of "Free", "Freemium", "Paid", "Free Trial", "Open Source".
- "description": a new 130 to 160 character description, benefit-first, no marketing filler.
- "rating": copy "real_rating" when present. When it is "N/A" give a conservative estimate or null; never invent a high score.
- "specific_features": three short distinct features such as "No Signup" or "4K Export".
- "audience": a short target audience such as "For Teams" or "For Solo".

Answer with JSON only: {{"items": [{{"id": 0, "type": "...", "pricing": "...", "description": "...", "rating": 4.5, "specific_features": ["..."], "audience": "..."}}]}}"#
    )
}

/// `None` when there is no app-typed item to report on.
pub(crate) fn report_prompt(
    keyword: &str,
    apps: &[AppItem],
    targets: &[SeedingTarget],
) -> Option<String> {
    let mut candidates = String::new();
    for app in apps
        .iter()
        .filter(|a| a.item_type == ItemType::App)
        .take(REPORT_TOP_APPS)
    {
        let _ = writeln!(
            candidates,
            "Name: \"{}\", Price: {}, Real_Rating: {}, Info: \"{}\"",
            app.name,
            app.pricing_model,
            rating_label(app.rating),
            app.description
        );
    }
    if candidates.is_empty() {
        return None;
    }

    Some(format!(
        r#"You are an objective software reviewer writing buying advice for "{keyword}".
Community threads found: {threads}.

Candidates:
{candidates}
Return a JSON object with:
- "editor_choice": {{"name", "summary" (two sentences), "best_for", "rating" (use Real_Rating; if N/A give a conservative estimate), "pros" (three short items)}}
- "best_value": {{"name", "summary", "price_tag"}}
- "pro_tip": {{"title", "content"}} with one specific, non-obvious tip for this niche.
Names must match the candidates exactly. Output JSON only."#,
        threads = targets.len()
    ))
}

/// The two enrichment prompts as the model would receive them, for running
/// by hand. Either is `None` when the matching call would be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualPrompts {
    pub rewrite: Option<String>,
    pub report: Option<String>,
}

/// Builds both prompts for `keyword` from already classified items.
///
/// # Errors
///
/// Returns [`EnrichError::Encode`] if the rewrite candidates fail to encode.
pub fn manual_prompts(
    keyword: &str,
    apps: &[AppItem],
    targets: &[SeedingTarget],
) -> Result<ManualPrompts, EnrichError> {
    let candidates = rewrite_candidates(apps);
    let rewrite = if candidates.is_empty() {
        None
    } else {
        let candidates_json = serde_json::to_string(&candidates).map_err(EnrichError::Encode)?;
        Some(rewrite_prompt(keyword, &candidates_json))
    };
    Ok(ManualPrompts {
        rewrite,
        report: report_prompt(keyword, apps, targets),
    })
}
