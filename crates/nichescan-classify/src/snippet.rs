//! Heuristic signal extraction from result titles, snippets and rich
//! extensions.

use std::sync::LazyLock;

use nichescan_core::{PricingModel, Taxonomy};
use regex::Regex;

use crate::haystack::Haystack;

const MAX_FEATURES: usize = 4;

/// A leading one-digit score, optionally with one decimal, that is
/// corroborated by what follows: end of text, a parenthesised count, `/5`,
/// or a rating word. A trailing `reviews`/`votes` is only trusted after a
/// decimal score or a `rating:` prefix, see [`parse_rating_extension`].
static RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(rating:?\s*)?(\d(?:\.\d)?)(?:\s*$|\s*\(\s*([\d,.]+[km]?)\s*\)|\s*/\s*5\b|\s+(stars?|ratings?|reviews?|votes?)\b)",
    )
    .expect("valid rating regex")
});

/// Everything [`SnippetAnalyzer`] looks at for one result.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetInput<'a> {
    pub title: &'a str,
    pub snippet: &'a str,
    pub extensions: &'a [String],
    /// Rating the provider already parsed, preferred over text extraction.
    pub detected_rating: Option<f64>,
    pub detected_reviews: Option<&'a str>,
}

impl<'a> SnippetInput<'a> {
    #[must_use]
    pub fn new(title: &'a str, snippet: &'a str, extensions: &'a [String]) -> Self {
        Self {
            title,
            snippet,
            extensions,
            detected_rating: None,
            detected_reviews: None,
        }
    }
}

/// Which product-intent keywords the text carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindSignal {
    Template,
    App,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnippetSignals {
    pub pricing: PricingModel,
    pub features: Vec<String>,
    pub audience: Option<String>,
    /// Always within `[0.0, 5.0]`; `None` when nothing rating-like was found.
    pub rating: Option<f64>,
    pub review_count: Option<String>,
    pub kind: KindSignal,
}

#[derive(Debug, Clone, Copy)]
pub struct SnippetAnalyzer<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> SnippetAnalyzer<'a> {
    #[must_use]
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    #[must_use]
    pub fn analyze(&self, input: &SnippetInput<'_>) -> SnippetSignals {
        let haystack = Haystack::new(
            [input.title, input.snippet]
                .into_iter()
                .chain(input.extensions.iter().map(String::as_str)),
        );

        let (rating, review_count) = extract_rating(input);
        let pricing = self.pricing(&haystack, input.extensions);
        let features = self.features(&haystack, rating);
        let audience = self.audience(&haystack);
        let kind = self.kind(&haystack);

        SnippetSignals {
            pricing,
            features,
            audience,
            rating,
            review_count,
            kind,
        }
    }

    fn pricing(&self, haystack: &Haystack, extensions: &[String]) -> PricingModel {
        let phrases = &self.taxonomy.pricing;
        // A bare "Free" badge in the rich snippet is as explicit as "free forever".
        let free_badge = extensions.iter().any(|e| e.trim().eq_ignore_ascii_case("free"));

        if free_badge || haystack.contains_any(&phrases.free) {
            PricingModel::Free
        } else if haystack.contains_any(&phrases.free_trial) {
            PricingModel::FreeTrial
        } else if haystack.contains_any(&phrases.freemium) {
            PricingModel::Freemium
        } else if haystack.contains_any(&phrases.paid) {
            PricingModel::Paid
        } else if haystack.contains_any(&phrases.open_source) {
            PricingModel::OpenSource
        } else {
            PricingModel::Unknown
        }
    }

    fn features(&self, haystack: &Haystack, rating: Option<f64>) -> Vec<String> {
        let mut features: Vec<String> = Vec::new();
        if rating.is_some_and(|r| r >= self.taxonomy.top_rated_threshold) {
            features.push(self.taxonomy.top_rated_tag.clone());
        }
        for trigger in &self.taxonomy.features {
            if features.len() >= MAX_FEATURES {
                break;
            }
            if !features.contains(&trigger.tag) && haystack.contains_any(&trigger.triggers) {
                features.push(trigger.tag.clone());
            }
        }
        features
    }

    fn audience(&self, haystack: &Haystack) -> Option<String> {
        let audience = &self.taxonomy.audience;
        if haystack.contains_any(&audience.team) {
            Some(audience.team_tag.clone())
        } else if haystack.contains_any(&audience.solo) {
            Some(audience.solo_tag.clone())
        } else {
            None
        }
    }

    fn kind(&self, haystack: &Haystack) -> KindSignal {
        if haystack.contains_any(&self.taxonomy.template_keywords) {
            KindSignal::Template
        } else if haystack.contains_any(&self.taxonomy.app_keywords) {
            KindSignal::App
        } else {
            KindSignal::Neutral
        }
    }
}

/// Provider-detected rating first, then the first corroborated extension.
/// Never invents a value.
fn extract_rating(input: &SnippetInput<'_>) -> (Option<f64>, Option<String>) {
    let detected_reviews = input
        .detected_reviews
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    if let Some(rating) = input.detected_rating.filter(|r| (0.0..=5.0).contains(r)) {
        let from_text = input
            .extensions
            .iter()
            .find_map(|e| parse_rating_extension(e))
            .and_then(|(_, count)| count);
        return (Some(rating), detected_reviews.or(from_text));
    }

    match input.extensions.iter().find_map(|e| parse_rating_extension(e)) {
        Some((rating, count)) => (Some(rating), count.or(detected_reviews)),
        None => (None, None),
    }
}

/// Parses strings like `"4.8(1,204)"`, `"4.5 stars"` or `"4/5"`.
///
/// `"5 reviews"` and `"3 votes"` are counts, not scores, and yield `None`.
#[must_use]
pub fn parse_rating_extension(text: &str) -> Option<(f64, Option<String>)> {
    let caps = RATING_RE.captures(text)?;
    let score = caps.get(2)?.as_str();
    let counted_word = caps.get(4).is_some_and(|word| {
        let word = word.as_str().to_ascii_lowercase();
        word.starts_with("review") || word.starts_with("vote")
    });
    if counted_word && caps.get(1).is_none() && !score.contains('.') {
        return None;
    }
    let rating: f64 = score.parse().ok()?;
    if !(0.0..=5.0).contains(&rating) {
        return None;
    }
    let count = caps.get(3).map(|m| m.as_str().to_string());
    Some((rating, count))
}

#[cfg(test)]
#[path = "snippet_test.rs"]
mod tests;
