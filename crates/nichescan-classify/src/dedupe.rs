//! Collapses app items that resolve to the same registrable domain.

use std::collections::HashMap;

use nichescan_core::AppItem;

use crate::classifier::registrable_domain;

const MAX_FEATURES: usize = 4;

/// Keeps the first item seen per registrable domain and fills its blanks from
/// later duplicates.
///
/// Only an `Unknown` pricing model is filled in, and features are unioned and
/// re-capped. Rating, review count and description stay first-seen. Order of
/// first appearance is preserved, and running it twice changes nothing.
#[must_use]
pub fn dedupe(items: Vec<AppItem>) -> Vec<AppItem> {
    let mut index_by_domain: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<AppItem> = Vec::with_capacity(items.len());
    let mut merged = 0usize;

    for item in items {
        let key = registrable_domain(&item.domain);
        if let Some(&idx) = index_by_domain.get(&key) {
            merge_into(&mut kept[idx], &item);
            merged += 1;
            continue;
        }
        index_by_domain.insert(key, kept.len());
        kept.push(item);
    }

    if merged > 0 {
        tracing::debug!(merged, kept = kept.len(), "merged duplicate app items");
    }
    kept
}

fn merge_into(base: &mut AppItem, other: &AppItem) {
    if !base.pricing_model.is_known() {
        base.pricing_model = other.pricing_model;
    }
    for feature in &other.features {
        if base.features.len() >= MAX_FEATURES {
            break;
        }
        if !base.features.contains(feature) {
            base.features.push(feature.clone());
        }
    }
    base.features.truncate(MAX_FEATURES);
}
