//! Deterministic classification of a search results payload into app items,
//! seeding targets and pivot ideas, plus the market verdict. No I/O.

pub mod classifier;
pub mod dedupe;
mod haystack;
pub mod normalize;
pub mod pivot;
pub mod rank;
pub mod snippet;
pub mod verdict;

use std::collections::HashSet;

use nichescan_core::{AnalysisResult, AppItem, DomainCategory, SeedingTarget, Taxonomy};
use nichescan_serp::SerpResponse;

pub use classifier::{brand_name, normalize_domain, registrable_domain, DomainClassifier};
pub use dedupe::dedupe;
pub use normalize::{is_hijackable, record_domain, thread_age_months, ItemNormalizer, Normalized};
pub use pivot::pivot_ideas;
pub use rank::{composite_score, parse_review_count, rank};
pub use snippet::{parse_rating_extension, KindSignal, SnippetAnalyzer, SnippetInput, SnippetSignals};
pub use verdict::{opportunity_score, OpportunityScorer};

/// Output of one classification pass, before scoring.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classified {
    /// Deduplicated and ranked.
    pub apps: Vec<AppItem>,
    pub seeding_targets: Vec<SeedingTarget>,
    pub pivot_ideas: Vec<String>,
    /// Categories of the first three organic results with a usable domain.
    pub top_categories: Vec<DomainCategory>,
}

impl Classified {
    /// Scores the classified batch into a report without a market report.
    #[must_use]
    pub fn into_result(self, scorer: &OpportunityScorer) -> AnalysisResult {
        let verdict =
            scorer.score_with_top_categories(&self.apps, &self.seeding_targets, &self.top_categories);
        AnalysisResult {
            verdict,
            apps: self.apps,
            seeding_targets: self.seeding_targets,
            pivot_ideas: self.pivot_ideas,
            market_report: None,
        }
    }
}

/// Partitions a provider payload.
///
/// Organic results come first: a link already emitted is skipped, a link that
/// also appears in the discussions feed becomes a seeding target, and the rest
/// go through [`ItemNormalizer`]. Unseen discussion entries and forum-hosted
/// inline videos are then appended as seeding targets.
#[must_use]
pub fn classify_response(response: &SerpResponse, taxonomy: &Taxonomy) -> Classified {
    let normalizer = ItemNormalizer::new(taxonomy);
    let classifier = normalizer.classifier();
    let discussion_links = response.discussion_links();

    let mut seen: HashSet<String> = HashSet::new();
    let mut apps: Vec<AppItem> = Vec::new();
    let mut seeding_targets: Vec<SeedingTarget> = Vec::new();
    let mut top_categories: Vec<DomainCategory> = Vec::new();
    let mut skipped = 0usize;

    for record in &response.organic_results {
        let Some(link) = record.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
            skipped += 1;
            continue;
        };
        let domain = record_domain(record);
        let category = classifier.classify(&domain);
        if !domain.is_empty() && top_categories.len() < 3 {
            top_categories.push(category);
        }
        if seen.contains(link) {
            continue;
        }

        if discussion_links.contains(link) {
            if let Some(target) = normalizer.seeding_target(record) {
                seen.insert(link.to_string());
                seeding_targets.push(target);
            }
            continue;
        }

        match normalizer.normalize(record, category) {
            Some(Normalized::App(item)) => {
                seen.insert(link.to_string());
                apps.push(item);
            }
            Some(Normalized::Seeding(target)) => {
                seen.insert(link.to_string());
                seeding_targets.push(target);
            }
            None => skipped += 1,
        }
    }

    for discussion in &response.discussions_and_forums {
        let Some(link) = discussion.link.as_deref().map(str::trim).filter(|l| !l.is_empty())
        else {
            continue;
        };
        if !seen.insert(link.to_string()) {
            continue;
        }
        let source = discussion.source.as_ref();
        let meta = source
            .and_then(|s| s.comments_count.as_deref())
            .or_else(|| source.and_then(|s| s.time.as_deref()))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("Active Thread")
            .to_string();
        let is_hijackable =
            is_hijackable([Some(meta.as_str()), source.and_then(|s| s.time.as_deref())]);
        seeding_targets.push(SeedingTarget {
            source: non_blank(source.and_then(|s| s.source_title.as_deref()), "Forum"),
            title: non_blank(discussion.discussion_title.as_deref(), "Discussion"),
            url: link.to_string(),
            meta,
            is_hijackable,
        });
    }

    for video in &response.inline_videos {
        let Some(link) = video.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
            continue;
        };
        if seen.contains(link) {
            continue;
        }
        let from_forum = [video.source.as_deref(), Some(link)]
            .into_iter()
            .flatten()
            .any(|s| classifier.classify(s) == DomainCategory::Forum);
        if !from_forum {
            continue;
        }
        seen.insert(link.to_string());
        let meta = match video.length.as_deref().map(str::trim) {
            Some(length) if !length.is_empty() => format!("Video • {length}"),
            _ => "Video".to_string(),
        };
        seeding_targets.push(SeedingTarget {
            source: non_blank(video.source.as_deref(), "Video"),
            title: non_blank(video.title.as_deref(), "Video"),
            url: link.to_string(),
            meta,
            is_hijackable: is_hijackable([video.date.as_deref()]),
        });
    }

    let apps = rank(dedupe(apps));
    tracing::debug!(
        apps = apps.len(),
        seeding_targets = seeding_targets.len(),
        skipped,
        "classified search results"
    );

    Classified {
        apps,
        seeding_targets,
        pivot_ideas: pivot_ideas(response),
        top_categories,
    }
}

/// [`classify_response`] followed by scoring with the default scorer.
#[must_use]
pub fn analyze_response(response: &SerpResponse, taxonomy: &Taxonomy) -> AnalysisResult {
    classify_response(response, taxonomy).into_result(&OpportunityScorer::default())
}

fn non_blank(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
