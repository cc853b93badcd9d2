//! The store contract shared by the Postgres and in-memory backends.

use std::future::Future;

use chrono::{DateTime, Utc};
use nichescan_core::{cache_key, slugify, AppConfig};
use serde::Serialize;

use crate::{connect_pool, run_migrations, DbError, MemoryAnalysisCache, PgAnalysisCache, PoolConfig};

/// Identity of one cached analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisKey {
    pub country: String,
    pub keyword: String,
    pub slug: String,
}

impl AnalysisKey {
    /// Lowercases the country and derives the slug from `keyword`.
    #[must_use]
    pub fn new(country: &str, keyword: &str) -> Self {
        Self {
            country: country.trim().to_lowercase(),
            keyword: keyword.trim().to_string(),
            slug: slugify(keyword),
        }
    }

    /// `"{country}_{slug}"`.
    #[must_use]
    pub fn id(&self) -> String {
        cache_key(&self.country, &self.slug)
    }
}

/// A stored analysis. `raw_payload` is the provider JSON as received and is
/// not guaranteed to parse.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AnalysisRow {
    pub keyword: String,
    pub slug: String,
    pub country: String,
    pub raw_payload: String,
    pub market_report: Option<String>,
    /// Editor-supplied app list as JSON, used instead of the classified one.
    pub apps_override: Option<String>,
    /// Editor-supplied seeding target list as JSON.
    pub targets_override: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Editor-supplied JSON documents merged into a row. `None` fields keep
/// what is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOverride {
    pub raw_payload: Option<String>,
    pub apps: Option<String>,
    pub seeding_targets: Option<String>,
    pub market_report: Option<String>,
}

impl AnalysisOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_payload.is_none()
            && self.apps.is_none()
            && self.seeding_targets.is_none()
            && self.market_report.is_none()
    }
}

/// Listing entry for the trending and directory reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AnalysisSummary {
    pub keyword: String,
    pub slug: String,
    pub country: String,
    pub updated_at: DateTime<Utc>,
}

pub trait AnalysisCache: Send + Sync {
    /// Short backend label for health output.
    fn backend(&self) -> &'static str;

    fn ping(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn get(&self, key: &AnalysisKey)
        -> impl Future<Output = Result<Option<AnalysisRow>, DbError>> + Send;

    /// Inserts or overwrites the raw payload. Any stored report is cleared
    /// since it described the previous payload. Overrides are kept.
    fn put(&self, key: &AnalysisKey, raw_payload: &str)
        -> impl Future<Output = Result<(), DbError>> + Send;

    /// Sets the market report on an existing row.
    ///
    /// Fails with [`DbError::NotFound`] when the row does not exist.
    fn update_report(
        &self,
        key: &AnalysisKey,
        report: &str,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Merges the present fields of `overrides` into the row and bumps its
    /// update time.
    ///
    /// A missing row is created only when `overrides` carries a raw payload;
    /// otherwise this fails with [`DbError::NotFound`].
    fn apply_override(
        &self,
        key: &AnalysisKey,
        overrides: &AnalysisOverride,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Most recently updated keywords for one country, newest first.
    fn recent_keywords(
        &self,
        country: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, DbError>> + Send;

    /// Most recently updated analyses across all countries, newest first.
    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AnalysisSummary>, DbError>> + Send;
}

/// The backend selected by configuration.
#[derive(Debug)]
pub enum ConfiguredCache {
    Postgres(PgAnalysisCache),
    Memory(MemoryAnalysisCache),
}

impl ConfiguredCache {
    /// Connects and migrates Postgres when `DATABASE_URL` is set, otherwise
    /// falls back to an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the pool cannot connect or migrations fail.
    pub async fn connect(config: &AppConfig) -> Result<Self, DbError> {
        let Some(database_url) = config.database_url.as_deref() else {
            tracing::info!("DATABASE_URL not set, using in-memory analysis cache");
            return Ok(Self::Memory(MemoryAnalysisCache::new()));
        };

        let pool = connect_pool(database_url, PoolConfig::from_app_config(config)).await?;
        run_migrations(&pool).await?;
        tracing::info!("connected to postgres analysis cache");
        Ok(Self::Postgres(PgAnalysisCache::new(pool)))
    }
}

impl AnalysisCache for ConfiguredCache {
    fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(c) => c.backend(),
            Self::Memory(c) => c.backend(),
        }
    }

    async fn ping(&self) -> Result<(), DbError> {
        match self {
            Self::Postgres(c) => c.ping().await,
            Self::Memory(c) => c.ping().await,
        }
    }

    async fn get(&self, key: &AnalysisKey) -> Result<Option<AnalysisRow>, DbError> {
        match self {
            Self::Postgres(c) => c.get(key).await,
            Self::Memory(c) => c.get(key).await,
        }
    }

    async fn put(&self, key: &AnalysisKey, raw_payload: &str) -> Result<(), DbError> {
        match self {
            Self::Postgres(c) => c.put(key, raw_payload).await,
            Self::Memory(c) => c.put(key, raw_payload).await,
        }
    }

    async fn update_report(&self, key: &AnalysisKey, report: &str) -> Result<(), DbError> {
        match self {
            Self::Postgres(c) => c.update_report(key, report).await,
            Self::Memory(c) => c.update_report(key, report).await,
        }
    }

    async fn apply_override(
        &self,
        key: &AnalysisKey,
        overrides: &AnalysisOverride,
    ) -> Result<(), DbError> {
        match self {
            Self::Postgres(c) => c.apply_override(key, overrides).await,
            Self::Memory(c) => c.apply_override(key, overrides).await,
        }
    }

    async fn recent_keywords(&self, country: &str, limit: usize) -> Result<Vec<String>, DbError> {
        match self {
            Self::Postgres(c) => c.recent_keywords(country, limit).await,
            Self::Memory(c) => c.recent_keywords(country, limit).await,
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisSummary>, DbError> {
        match self {
            Self::Postgres(c) => c.list_recent(limit).await,
            Self::Memory(c) => c.list_recent(limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_normalizes_country_and_slug() {
        let key = AnalysisKey::new(" US ", "  AI Resume Builder ");
        assert_eq!(key.country, "us");
        assert_eq!(key.keyword, "AI Resume Builder");
        assert_eq!(key.slug, "ai-resume-builder");
        assert_eq!(key.id(), "us_ai-resume-builder");
    }

    #[test]
    fn override_without_fields_is_empty() {
        assert!(AnalysisOverride::default().is_empty());
        let overrides = AnalysisOverride {
            market_report: Some("{}".to_string()),
            ..AnalysisOverride::default()
        };
        assert!(!overrides.is_empty());
    }

    #[test]
    fn same_slug_shares_an_id() {
        assert_eq!(
            AnalysisKey::new("uk", "habit tracker").id(),
            AnalysisKey::new("UK", "Habit   Tracker!").id()
        );
    }
}
