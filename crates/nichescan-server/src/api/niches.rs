use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use nichescan_db::{AnalysisCache, AnalysisSummary};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const TRENDING_LIMIT: usize = 15;
const DIRECTORY_LIMIT: usize = 500;

#[derive(Debug, Serialize)]
pub(super) struct NicheItem {
    keyword: String,
    slug: String,
    country: String,
    /// Relative path of the analysis route for this niche.
    path: String,
    updated_at: DateTime<Utc>,
}

impl From<AnalysisSummary> for NicheItem {
    fn from(summary: AnalysisSummary) -> Self {
        Self {
            path: format!("/api/v1/analyze/{}/{}", summary.country, summary.slug),
            keyword: summary.keyword,
            slug: summary.slug,
            country: summary.country.to_uppercase(),
            updated_at: summary.updated_at,
        }
    }
}

pub(super) async fn list_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<NicheItem>>>, ApiError> {
    list_recent(&state, req_id, TRENDING_LIMIT).await
}

pub(super) async fn list_niches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<NicheItem>>>, ApiError> {
    list_recent(&state, req_id, DIRECTORY_LIMIT).await
}

async fn list_recent(
    state: &AppState,
    req_id: RequestId,
    limit: usize,
) -> Result<Json<ApiResponse<Vec<NicheItem>>>, ApiError> {
    let rows = state
        .pipeline
        .cache()
        .list_recent(limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(NicheItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
