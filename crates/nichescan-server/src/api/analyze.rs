use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use nichescan_core::{slugify, unslugify, AnalysisResult};
use nichescan_db::AnalysisCache;
use nichescan_pipeline::PipelineError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const RELATED_POOL: usize = 50;
const RELATED_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub(super) struct AnalysisPage {
    keyword: String,
    slug: String,
    /// Uppercase ISO code, e.g. `"US"`.
    country: String,
    meta_title: String,
    meta_description: String,
    result: AnalysisResult,
    related_niches: Vec<RelatedNiche>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(super) struct RelatedNiche {
    keyword: String,
    slug: String,
}

pub(super) async fn get_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((country, keyword)): Path<(String, String)>,
) -> Result<Json<ApiResponse<AnalysisPage>>, ApiError> {
    let country = country.trim().to_lowercase();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "country must be a two-letter code",
        ));
    }

    let slug = slugify(&keyword);
    let readable = unslugify(&slug);
    let analysis = match state.pipeline.run_analysis(&country, &readable).await {
        Ok(analysis) => analysis,
        Err(PipelineError::EmptyKeyword) => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "keyword must contain at least one letter or digit",
            ));
        }
        Err(e) => {
            tracing::error!(keyword = %readable, country = %country, error = %e, "analysis failed");
            return Err(ApiError::new(req_id.0, "internal_error", "analysis failed"));
        }
    };

    let recent = match state
        .pipeline
        .cache()
        .recent_keywords(&country, RELATED_POOL)
        .await
    {
        Ok(recent) => recent,
        Err(e) => {
            tracing::warn!(country = %country, error = %e, "related niches unavailable");
            Vec::new()
        }
    };
    let related_niches = pick_related(recent, &slug, &mut rand::rng());

    let year = Utc::now().year();
    Ok(Json(ApiResponse {
        data: AnalysisPage {
            meta_title: format!("Best {readable} Tools & Resources ({year})"),
            meta_description: format!("Discover the top-rated tools for {readable}."),
            keyword: readable,
            slug,
            country: country.to_uppercase(),
            result: analysis.result,
            related_niches,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Up to [`RELATED_LIMIT`] distinct keywords other than `current_slug`, in
/// random order.
fn pick_related<R: Rng + ?Sized>(
    keywords: Vec<String>,
    current_slug: &str,
    rng: &mut R,
) -> Vec<RelatedNiche> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut related: Vec<RelatedNiche> = keywords
        .into_iter()
        .filter_map(|keyword| {
            let slug = slugify(&keyword);
            if slug.is_empty() || slug == current_slug || !seen.insert(slug.clone()) {
                return None;
            }
            Some(RelatedNiche { keyword, slug })
        })
        .collect();

    related.shuffle(rng);
    related.truncate(RELATED_LIMIT);
    related
}
