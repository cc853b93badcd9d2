//! Postgres backend for the `analyses` table.

use sqlx::PgPool;

use crate::cache::{AnalysisCache, AnalysisKey, AnalysisOverride, AnalysisRow, AnalysisSummary};
use crate::{sql_limit, DbError};

#[derive(Debug, Clone)]
pub struct PgAnalysisCache {
    pool: PgPool,
}

impl PgAnalysisCache {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl AnalysisCache for PgAnalysisCache {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DbError> {
        crate::ping(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, key: &AnalysisKey) -> Result<Option<AnalysisRow>, DbError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            "SELECT keyword, slug, country, raw_payload, market_report, \
                    apps_override, targets_override, updated_at \
             FROM analyses \
             WHERE cache_key = $1",
        )
        .bind(key.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn put(&self, key: &AnalysisKey, raw_payload: &str) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO analyses (cache_key, keyword, slug, country, raw_payload) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (cache_key) DO UPDATE SET \
                 keyword = EXCLUDED.keyword, \
                 raw_payload = EXCLUDED.raw_payload, \
                 market_report = NULL, \
                 updated_at = NOW()",
        )
        .bind(key.id())
        .bind(&key.keyword)
        .bind(&key.slug)
        .bind(&key.country)
        .bind(raw_payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_report(&self, key: &AnalysisKey, report: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE analyses SET market_report = $2 WHERE cache_key = $1")
            .bind(key.id())
            .bind(report)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn apply_override(
        &self,
        key: &AnalysisKey,
        overrides: &AnalysisOverride,
    ) -> Result<(), DbError> {
        if let Some(raw_payload) = overrides.raw_payload.as_deref() {
            sqlx::query(
                "INSERT INTO analyses \
                     (cache_key, keyword, slug, country, raw_payload, \
                      apps_override, targets_override, market_report) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (cache_key) DO UPDATE SET \
                     raw_payload = EXCLUDED.raw_payload, \
                     apps_override = COALESCE(EXCLUDED.apps_override, analyses.apps_override), \
                     targets_override = COALESCE(EXCLUDED.targets_override, analyses.targets_override), \
                     market_report = COALESCE(EXCLUDED.market_report, analyses.market_report), \
                     updated_at = NOW()",
            )
            .bind(key.id())
            .bind(&key.keyword)
            .bind(&key.slug)
            .bind(&key.country)
            .bind(raw_payload)
            .bind(overrides.apps.as_deref())
            .bind(overrides.seeding_targets.as_deref())
            .bind(overrides.market_report.as_deref())
            .execute(&self.pool)
            .await?;
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE analyses SET \
                 apps_override = COALESCE($2, apps_override), \
                 targets_override = COALESCE($3, targets_override), \
                 market_report = COALESCE($4, market_report), \
                 updated_at = NOW() \
             WHERE cache_key = $1",
        )
        .bind(key.id())
        .bind(overrides.apps.as_deref())
        .bind(overrides.seeding_targets.as_deref())
        .bind(overrides.market_report.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn recent_keywords(&self, country: &str, limit: usize) -> Result<Vec<String>, DbError> {
        let keywords = sqlx::query_scalar::<_, String>(
            "SELECT keyword FROM analyses \
             WHERE country = $1 \
             ORDER BY updated_at DESC, id DESC \
             LIMIT $2",
        )
        .bind(country.trim().to_lowercase())
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(keywords)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisSummary>, DbError> {
        let rows = sqlx::query_as::<_, AnalysisSummary>(
            "SELECT keyword, slug, country, updated_at FROM analyses \
             ORDER BY updated_at DESC, id DESC \
             LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
