//! Applies the model's rewrite answer to heuristic items.

use nichescan_core::{AppItem, ItemType, PricingModel};

use crate::types::RewritePatch;

const MAX_FEATURES: usize = 4;

/// Decodes each entry of the model's `items` array on its own; entries that
/// do not fit [`RewritePatch`] are dropped.
pub(crate) fn decode_patches(items: Vec<serde_json::Value>) -> Vec<RewritePatch> {
    items
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}

/// Patches `items` by position using the entry whose `id` equals the index.
///
/// Items without a matching entry are returned untouched, entries with ids
/// outside the batch are ignored, and each field is applied only if it is
/// valid on its own. A rating already present is never replaced.
#[must_use]
pub fn apply_patches(items: &[AppItem], patches: &[RewritePatch]) -> Vec<AppItem> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let patch = patches
                .iter()
                .find(|p| p.id.and_then(|id| usize::try_from(id).ok()) == Some(idx));
            match patch {
                Some(patch) => apply_one(item, patch),
                None => item.clone(),
            }
        })
        .collect()
}

fn apply_one(item: &AppItem, patch: &RewritePatch) -> AppItem {
    let mut out = item.clone();

    if let Some(item_type) = patch.item_type.as_deref().and_then(ItemType::from_label) {
        out.item_type = item_type;
        out.cta_text = item_type.cta_text().to_string();
    }
    if let Some(pricing) = patch.pricing.as_deref().and_then(PricingModel::from_label) {
        out.pricing_model = pricing;
    }
    if let Some(description) = non_blank(patch.description.as_deref()) {
        out.description = description;
    }
    if let Some(features) = &patch.specific_features {
        let mut cleaned: Vec<String> = Vec::new();
        for feature in features.iter().filter_map(|f| non_blank(Some(f.as_str()))) {
            if cleaned.len() >= MAX_FEATURES {
                break;
            }
            if !cleaned.contains(&feature) {
                cleaned.push(feature);
            }
        }
        if !cleaned.is_empty() {
            out.features = cleaned;
        }
    }
    if out.rating.is_none() {
        out.rating = patch.rating.filter(|r| (0.0..=5.0).contains(r));
    }
    if let Some(audience) = non_blank(patch.audience.as_deref()) {
        out.audience = Some(audience);
    }

    out
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
