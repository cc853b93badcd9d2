//! Process-local backend used when no database is configured, and in tests.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::cache::{AnalysisCache, AnalysisKey, AnalysisOverride, AnalysisRow, AnalysisSummary};
use crate::DbError;

/// Rows kept before the least recently written one is evicted.
pub const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

#[derive(Debug)]
pub struct MemoryAnalysisCache {
    inner: RwLock<Store>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Store {
    rows: HashMap<String, Entry>,
    next_seq: u64,
}

#[derive(Debug)]
struct Entry {
    row: AnalysisRow,
    /// Write order; breaks ties between equal timestamps.
    seq: u64,
}

impl Store {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Drops the oldest rows until one more fits under `capacity`.
    fn make_room(&mut self, capacity: usize) {
        while self.rows.len() >= capacity {
            let Some(oldest) = self
                .rows
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(id, _)| id.clone())
            else {
                return;
            };
            self.rows.remove(&oldest);
            tracing::debug!(cache_key = %oldest, "evicted oldest cached analysis");
        }
    }

    fn insert(&mut self, id: String, row: AnalysisRow, capacity: usize) {
        if !self.rows.contains_key(&id) {
            self.make_room(capacity);
        }
        let seq = self.bump();
        self.rows.insert(id, Entry { row, seq });
    }
}

impl Default for MemoryAnalysisCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}

impl MemoryAnalysisCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `capacity` rows. Zero is treated as one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Store::default()),
            capacity: capacity.max(1),
        }
    }

    /// Seeds a row with an arbitrary payload and optional report.
    ///
    /// # Errors
    ///
    /// Propagates the [`DbError`] of the underlying writes.
    pub async fn insert_raw(
        &self,
        key: &AnalysisKey,
        raw_payload: &str,
        report: Option<&str>,
    ) -> Result<(), DbError> {
        self.put(key, raw_payload).await?;
        if let Some(report) = report {
            self.update_report(key, report).await?;
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn newest_first(&self) -> Vec<AnalysisRow> {
        let store = self.inner.read().await;
        let mut entries: Vec<&Entry> = store.rows.values().collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries.into_iter().map(|e| e.row.clone()).collect()
    }
}

impl AnalysisCache for MemoryAnalysisCache {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn get(&self, key: &AnalysisKey) -> Result<Option<AnalysisRow>, DbError> {
        let store = self.inner.read().await;
        Ok(store.rows.get(&key.id()).map(|e| e.row.clone()))
    }

    async fn put(&self, key: &AnalysisKey, raw_payload: &str) -> Result<(), DbError> {
        let mut store = self.inner.write().await;
        let id = key.id();
        let (apps_override, targets_override) = store
            .rows
            .get(&id)
            .map(|e| (e.row.apps_override.clone(), e.row.targets_override.clone()))
            .unwrap_or_default();
        let row = AnalysisRow {
            keyword: key.keyword.clone(),
            slug: key.slug.clone(),
            country: key.country.clone(),
            raw_payload: raw_payload.to_string(),
            market_report: None,
            apps_override,
            targets_override,
            updated_at: Utc::now(),
        };
        store.insert(id, row, self.capacity);
        Ok(())
    }

    async fn update_report(&self, key: &AnalysisKey, report: &str) -> Result<(), DbError> {
        let mut store = self.inner.write().await;
        let entry = store.rows.get_mut(&key.id()).ok_or(DbError::NotFound)?;
        entry.row.market_report = Some(report.to_string());
        Ok(())
    }

    async fn apply_override(
        &self,
        key: &AnalysisKey,
        overrides: &AnalysisOverride,
    ) -> Result<(), DbError> {
        let mut store = self.inner.write().await;
        let id = key.id();
        let mut row = match (store.rows.remove(&id), overrides.raw_payload.as_deref()) {
            (Some(entry), _) => entry.row,
            (None, Some(raw_payload)) => AnalysisRow {
                keyword: key.keyword.clone(),
                slug: key.slug.clone(),
                country: key.country.clone(),
                raw_payload: raw_payload.to_string(),
                market_report: None,
                apps_override: None,
                targets_override: None,
                updated_at: Utc::now(),
            },
            (None, None) => return Err(DbError::NotFound),
        };

        if let Some(raw_payload) = &overrides.raw_payload {
            row.raw_payload.clone_from(raw_payload);
        }
        if let Some(apps) = &overrides.apps {
            row.apps_override = Some(apps.clone());
        }
        if let Some(targets) = &overrides.seeding_targets {
            row.targets_override = Some(targets.clone());
        }
        if let Some(report) = &overrides.market_report {
            row.market_report = Some(report.clone());
        }
        row.updated_at = Utc::now();
        store.insert(id, row, self.capacity);
        Ok(())
    }

    async fn recent_keywords(&self, country: &str, limit: usize) -> Result<Vec<String>, DbError> {
        let country = country.trim().to_lowercase();
        Ok(self
            .newest_first()
            .await
            .into_iter()
            .filter(|row| row.country == country)
            .take(limit)
            .map(|row| row.keyword)
            .collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisSummary>, DbError> {
        Ok(self
            .newest_first()
            .await
            .into_iter()
            .take(limit)
            .map(|row| AnalysisSummary {
                keyword: row.keyword,
                slug: row.slug,
                country: row.country,
                updated_at: row.updated_at,
            })
            .collect())
    }
}
