//! Turns one organic record into an app item, a seeding target or nothing.

use std::sync::LazyLock;

use nichescan_core::{AppItem, DomainCategory, ItemType, SeedingTarget, Taxonomy};
use nichescan_serp::RawResultRecord;
use regex::Regex;

use crate::classifier::{brand_name, normalize_domain, DomainClassifier};
use crate::snippet::{KindSignal, SnippetAnalyzer, SnippetInput};

/// Threads older than this are unlikely to surface a fresh reply.
const STALE_AFTER_MONTHS: f64 = 12.0;

static AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+|an?)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|wks?|months?|mos?|years?|yrs?)\.?\s+ago\b",
    )
    .expect("valid age regex")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    App(AppItem),
    Seeding(SeedingTarget),
}

#[derive(Debug, Clone, Copy)]
pub struct ItemNormalizer<'a> {
    taxonomy: &'a Taxonomy,
    classifier: DomainClassifier<'a>,
    analyzer: SnippetAnalyzer<'a>,
}

impl<'a> ItemNormalizer<'a> {
    #[must_use]
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self {
            taxonomy,
            classifier: DomainClassifier::new(taxonomy),
            analyzer: SnippetAnalyzer::new(taxonomy),
        }
    }

    #[must_use]
    pub fn classifier(&self) -> DomainClassifier<'a> {
        self.classifier
    }

    /// Normalizes `record` given its domain category.
    ///
    /// Returns `None` for records without a link or a derivable domain, and
    /// for news results that do not describe a tool.
    #[must_use]
    pub fn normalize(
        &self,
        record: &RawResultRecord,
        category: DomainCategory,
    ) -> Option<Normalized> {
        let url = record_link(record)?;
        let domain = record_domain(record);
        if domain.is_empty() {
            return None;
        }

        if category == DomainCategory::Forum {
            return self.seeding_target(record).map(Normalized::Seeding);
        }

        let detected = record.detected_extensions();
        let input = SnippetInput {
            detected_rating: detected.and_then(|d| d.rating),
            detected_reviews: detected.and_then(|d| d.reviews.as_deref()),
            ..SnippetInput::new(
                record.title.as_deref().unwrap_or_default(),
                record.snippet.as_deref().unwrap_or_default(),
                record.extensions(),
            )
        };
        let signals = self.analyzer.analyze(&input);

        let item_type = match (category, signals.kind) {
            (DomainCategory::TrustedApp, _) | (_, KindSignal::App) => ItemType::App,
            (_, KindSignal::Template) => ItemType::Template,
            (_, KindSignal::Neutral) => ItemType::Resource,
        };
        if category == DomainCategory::News && item_type != ItemType::App {
            return None;
        }

        Some(Normalized::App(AppItem {
            name: brand_name(&domain),
            domain,
            url: url.to_string(),
            description: record.snippet.clone().unwrap_or_default(),
            item_type,
            pricing_model: signals.pricing,
            features: signals.features,
            audience: signals.audience,
            rating: signals.rating,
            review_count: signals.review_count,
            cta_text: item_type.cta_text().to_string(),
        }))
    }

    /// Builds a seeding target regardless of category. Used for forum results
    /// and for organic results that also appear in the discussions feed.
    #[must_use]
    pub fn seeding_target(&self, record: &RawResultRecord) -> Option<SeedingTarget> {
        let url = record_link(record)?;
        let domain = record_domain(record);
        let meta = self.extract_meta(record);
        let is_hijackable = is_hijackable([Some(meta.as_str()), record.date.as_deref()]);

        Some(SeedingTarget {
            source: if domain.is_empty() {
                "Forum".to_string()
            } else {
                brand_name(&domain)
            },
            title: record.title.clone().unwrap_or_default(),
            url: url.to_string(),
            meta,
            is_hijackable,
        })
    }

    /// Freshness or engagement hint for a thread.
    ///
    /// Prefers a displayed link carrying a marker (`"ago"`, `"comment"`,
    /// `"answer"`), then a rich extension carrying one, then the rank.
    #[must_use]
    pub fn extract_meta(&self, record: &RawResultRecord) -> String {
        let markers = &self.taxonomy.meta_markers;
        let has_marker = |text: &str| {
            let lower = text.to_lowercase();
            markers.iter().any(|m| lower.contains(m.as_str()))
        };

        if let Some(displayed) = record.displayed_link.as_deref() {
            if has_marker(displayed) {
                return displayed.trim().to_string();
            }
        }
        if let Some(ext) = record.extensions().iter().find(|e| has_marker(e)) {
            return ext.trim().to_string();
        }
        match record.position {
            Some(position) => format!("Rank #{position}"),
            None => "Community thread".to_string(),
        }
    }
}

fn record_link(record: &RawResultRecord) -> Option<&str> {
    record
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

/// The record's normalized domain, derived from its link when the provider
/// left the domain out. Empty when neither yields a host.
#[must_use]
pub fn record_domain(record: &RawResultRecord) -> String {
    let from_field = record
        .domain
        .as_deref()
        .map(normalize_domain)
        .unwrap_or_default();
    if !from_field.is_empty() {
        return from_field;
    }
    record
        .link
        .as_deref()
        .map(normalize_domain)
        .unwrap_or_default()
}

/// Age in months parsed from text like `"3 weeks ago"` or `"a year ago"`.
#[must_use]
pub fn thread_age_months(text: &str) -> Option<f64> {
    let caps = AGE_RE.captures(text)?;
    let amount = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "a" | "an" => 1.0,
        digits => digits.parse::<f64>().ok()?,
    };
    let unit = caps.get(2)?.as_str().to_ascii_lowercase();
    let months_per_unit = if unit.starts_with('y') {
        12.0
    } else if unit.starts_with("mo") {
        1.0
    } else if unit.starts_with('w') {
        7.0 / 30.0
    } else if unit.starts_with('d') {
        1.0 / 30.0
    } else {
        0.0
    };
    Some(amount * months_per_unit)
}

/// A thread is hijackable unless one of the hints shows it is older than a
/// year. Unknown age counts as hijackable.
#[must_use]
pub fn is_hijackable<'h>(hints: impl IntoIterator<Item = Option<&'h str>>) -> bool {
    hints
        .into_iter()
        .flatten()
        .find_map(thread_age_months)
        .is_none_or(|months| months <= STALE_AFTER_MONTHS)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
