//! Composite ordering of app items.
//!
//! The weights keep each term dominant over everything after it: type
//! (20 000 steps) beats rating (1 000 per star), a 0.1-star difference beats
//! any realistic review count (10 × log10), and review evidence beats the
//! one-point pricing completeness bonus.

use nichescan_core::{AppItem, ItemType};

const APP_WEIGHT: f64 = 20_000.0;
const TEMPLATE_WEIGHT: f64 = 10_000.0;
const RATING_WEIGHT: f64 = 1_000.0;
const REVIEWS_WEIGHT: f64 = 10.0;
const PRICING_BONUS: f64 = 1.0;

#[must_use]
pub fn composite_score(item: &AppItem) -> f64 {
    let type_weight = match item.item_type {
        ItemType::App => APP_WEIGHT,
        ItemType::Template => TEMPLATE_WEIGHT,
        ItemType::Resource => 0.0,
    };
    let rating = item.rating.unwrap_or(0.0) * RATING_WEIGHT;
    let reviews = item
        .review_count
        .as_deref()
        .and_then(parse_review_count)
        .map_or(0.0, |n| REVIEWS_WEIGHT * (1.0 + n).log10());
    let pricing = if item.pricing_model.is_known() {
        PRICING_BONUS
    } else {
        0.0
    };
    type_weight + rating + reviews + pricing
}

/// Sorts descending by [`composite_score`]. Equal scores keep their input order.
#[must_use]
pub fn rank(items: Vec<AppItem>) -> Vec<AppItem> {
    let mut scored: Vec<(f64, AppItem)> = items
        .into_iter()
        .map(|item| (composite_score(&item), item))
        .collect();
    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.into_iter().map(|(_, item)| item).collect()
}

/// Parses displayed review counts such as `"1,204"`, `"2.3k"` or `"1M"`.
#[must_use]
pub fn parse_review_count(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let value: f64 = digits.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value * multiplier)
}
