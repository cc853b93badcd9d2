use nichescan_core::PricingModel;

use super::*;

fn record(value: serde_json::Value) -> RawResultRecord {
    serde_json::from_value(value).expect("valid record fixture")
}

fn normalize(value: serde_json::Value) -> Option<Normalized> {
    let taxonomy = Taxonomy::default();
    let normalizer = ItemNormalizer::new(&taxonomy);
    let rec = record(value);
    let category = normalizer.classifier().classify(&record_domain(&rec));
    normalizer.normalize(&rec, category)
}

#[test]
fn reddit_result_becomes_seeding_target() {
    let out = normalize(serde_json::json!({
        "position": 4,
        "title": "Best habit tracker? : r/productivity",
        "link": "https://www.reddit.com/r/productivity/comments/abc",
        "domain": "www.Reddit.com",
        "displayed_link": "50+ comments · 3 weeks ago"
    }));
    let Some(Normalized::Seeding(target)) = out else {
        panic!("expected seeding target, got {out:?}");
    };
    assert_eq!(target.source, "Reddit");
    assert_eq!(target.meta, "50+ comments · 3 weeks ago");
    assert!(target.is_hijackable);
}

#[test]
fn app_result_carries_snippet_signals() {
    let out = normalize(serde_json::json!({
        "position": 1,
        "title": "Habitica: Gamify Your Tasks",
        "link": "https://habitica.com/",
        "domain": "www.habitica.com",
        "snippet": "Free forever habit tracker app for iOS and Android.",
        "rich_snippet": { "top": { "extensions": ["4.6(12,000)"] } }
    }));
    let Some(Normalized::App(item)) = out else {
        panic!("expected app item, got {out:?}");
    };
    assert_eq!(item.name, "Habitica");
    assert_eq!(item.domain, "habitica.com");
    assert_eq!(item.url, "https://habitica.com/");
    assert_eq!(item.item_type, ItemType::App);
    assert_eq!(item.cta_text, "Get App");
    assert_eq!(item.pricing_model, PricingModel::Free);
    assert_eq!(item.rating, Some(4.6));
    assert_eq!(item.review_count.as_deref(), Some("12,000"));
    assert_eq!(item.features[0], "Top Rated");
}

#[test]
fn detected_extensions_supply_the_rating() {
    let out = normalize(serde_json::json!({
        "link": "https://todoist.com",
        "domain": "todoist.com",
        "title": "Todoist",
        "rich_snippet": { "top": { "detected_extensions": { "rating": 4.4, "reviews": 5120 } } }
    }));
    let Some(Normalized::App(item)) = out else {
        panic!("expected app item, got {out:?}");
    };
    assert_eq!(item.rating, Some(4.4));
    assert_eq!(item.review_count.as_deref(), Some("5120"));
}

#[test]
fn news_without_app_intent_is_discarded() {
    let out = normalize(serde_json::json!({
        "link": "https://techcrunch.com/2024/habits",
        "domain": "techcrunch.com",
        "title": "Why habits are the new productivity trend",
        "snippet": "An essay on routines."
    }));
    assert!(out.is_none());
}

#[test]
fn news_describing_a_tool_is_kept() {
    let out = normalize(serde_json::json!({
        "link": "https://techcrunch.com/2024/streaks",
        "domain": "techcrunch.com",
        "title": "Streaks launches a new habit app",
        "snippet": "Download it today."
    }));
    assert!(matches!(out, Some(Normalized::App(ref item)) if item.item_type == ItemType::App));
}

#[test]
fn template_site_is_a_template() {
    let out = normalize(serde_json::json!({
        "link": "https://www.notion.so/templates/habit-tracker",
        "domain": "notion.so",
        "title": "Habit Tracker Template",
        "snippet": "Duplicate this free Notion template."
    }));
    let Some(Normalized::App(item)) = out else {
        panic!("expected template item, got {out:?}");
    };
    assert_eq!(item.item_type, ItemType::Template);
    assert_eq!(item.cta_text, "View Template");
}

#[test]
fn trusted_domain_is_forced_to_app() {
    let taxonomy = Taxonomy {
        trusted_domains: vec!["notion.so".to_string()],
        ..Taxonomy::default()
    };
    let normalizer = ItemNormalizer::new(&taxonomy);
    let rec = record(serde_json::json!({
        "link": "https://www.notion.so/templates/habit-tracker",
        "domain": "notion.so",
        "title": "Habit Tracker Template"
    }));
    let out = normalizer.normalize(&rec, DomainCategory::TrustedApp);
    assert!(matches!(out, Some(Normalized::App(ref item)) if item.item_type == ItemType::App));
}

#[test]
fn missing_link_or_domain_is_skipped() {
    assert!(normalize(serde_json::json!({ "domain": "asana.com", "title": "Asana" })).is_none());
    assert!(normalize(serde_json::json!({ "link": "   ", "domain": "asana.com" })).is_none());
    assert!(normalize(serde_json::json!({ "link": "not-a-url-at-all://" })).is_none());
}

#[test]
fn domain_falls_back_to_link_host() {
    let rec = record(serde_json::json!({ "link": "https://www.Asana.com/pricing" }));
    assert_eq!(record_domain(&rec), "asana.com");
}

#[test]
fn meta_prefers_displayed_link_then_extension_then_rank() {
    let taxonomy = Taxonomy::default();
    let normalizer = ItemNormalizer::new(&taxonomy);

    let rec = record(serde_json::json!({
        "position": 2,
        "link": "https://quora.com/q",
        "displayed_link": "https://www.quora.com › ...",
        "rich_snippet": { "top": { "extensions": ["12 answers", "Mar 2, 2023"] } }
    }));
    assert_eq!(normalizer.extract_meta(&rec), "12 answers");

    let rec = record(serde_json::json!({ "position": 7, "link": "https://quora.com/q" }));
    assert_eq!(normalizer.extract_meta(&rec), "Rank #7");

    let rec = record(serde_json::json!({ "link": "https://quora.com/q" }));
    assert_eq!(normalizer.extract_meta(&rec), "Community thread");
}

#[test]
fn stale_threads_are_not_hijackable() {
    assert!(!is_hijackable([Some("2 years ago")]));
    assert!(!is_hijackable([Some("Rank #3"), Some("14 months ago")]));
    assert!(is_hijackable([Some("a year ago")]));
    assert!(is_hijackable([Some("5 days ago")]));
    assert!(is_hijackable([Some("Rank #3"), None]));
}

#[test]
fn thread_age_parses_units() {
    assert_eq!(thread_age_months("3 years ago"), Some(36.0));
    assert_eq!(thread_age_months("an hour ago"), Some(0.0));
    assert_eq!(thread_age_months("6 mos ago"), Some(6.0));
    assert_eq!(thread_age_months("Active Thread"), None);
}
