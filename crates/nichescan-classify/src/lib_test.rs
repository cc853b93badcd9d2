use nichescan_core::{ItemType, PricingModel, VerdictColor};

use super::*;

fn response(value: serde_json::Value) -> SerpResponse {
    serde_json::from_value(value).expect("valid response fixture")
}

fn habit_tracker_serp() -> SerpResponse {
    response(serde_json::json!({
        "organic_results": [
            {
                "position": 1,
                "title": "Habitica: Gamify Your Life",
                "link": "https://habitica.com/",
                "domain": "habitica.com",
                "snippet": "Free forever habit tracker app for iOS and Android.",
                "rich_snippet": { "top": { "extensions": ["4.6(12,000)"] } }
            },
            {
                "position": 2,
                "title": "Best habit tracker? : r/productivity",
                "link": "https://www.reddit.com/r/productivity/comments/abc",
                "domain": "www.reddit.com",
                "displayed_link": "120+ comments · 2 months ago"
            },
            {
                "position": 3,
                "title": "Habitica Pricing",
                "link": "https://www.habitica.com/pricing",
                "domain": "www.habitica.com",
                "snippet": "Group plans for teams.",
                "rich_snippet": { "top": { "extensions": ["3.1(10)"] } }
            },
            {
                "position": 4,
                "title": "Notion Habit Tracker Template",
                "link": "https://www.notion.so/templates/habit-tracker",
                "domain": "notion.so",
                "snippet": "Duplicate this template."
            },
            {
                "position": 5,
                "title": "The science of habits",
                "link": "https://www.nytimes.com/habits",
                "domain": "nytimes.com",
                "snippet": "Why we do what we do."
            },
            {
                "position": 6,
                "title": "Which habit tracker do you use?",
                "link": "https://www.quora.com/Which-habit-tracker",
                "domain": "quora.com"
            },
            {
                "position": 7,
                "title": "Duplicate link",
                "link": "https://habitica.com/",
                "domain": "habitica.com"
            },
            { "position": 8, "title": "No link at all", "domain": "nolink.com" },
            {
                "position": 9,
                "title": "Streaks",
                "link": "https://streaksapp.com/",
                "domain": "streaksapp.com",
                "snippet": "The to-do list that helps you form good habits."
            }
        ],
        "discussions_and_forums": [
            {
                "discussion_title": "Habit apps that actually work",
                "link": "https://forum.example.org/t/habit-apps",
                "source": { "source_title": "Example Forum", "comments_count": "34 comments" }
            },
            {
                "discussion_title": "Which habit tracker do you use?",
                "link": "https://www.quora.com/Which-habit-tracker",
                "source": { "source_title": "Quora" }
            },
            {
                "link": "https://lemmy.world/post/1",
                "source": { "time": "3 years ago" }
            }
        ],
        "inline_videos": [
            {
                "title": "My habit system",
                "link": "https://www.youtube.com/watch?v=1",
                "source": "YouTube",
                "length": "12:04"
            },
            {
                "title": "Habitica review",
                "link": "https://vimeo.com/2",
                "source": "Vimeo"
            }
        ],
        "related_searches": [{ "query": "habit tracker printable" }],
        "related_questions": [{ "question": "Is there a free habit tracker?" }]
    }))
}

#[test]
fn partitions_apps_and_seeding_targets() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());

    let app_domains: Vec<&str> = classified.apps.iter().map(|a| a.domain.as_str()).collect();
    assert_eq!(app_domains, vec!["habitica.com", "notion.so", "streaksapp.com"]);

    let target_urls: Vec<&str> = classified
        .seeding_targets
        .iter()
        .map(|t| t.url.as_str())
        .collect();
    assert_eq!(
        target_urls,
        vec![
            "https://www.reddit.com/r/productivity/comments/abc",
            "https://www.quora.com/Which-habit-tracker",
            "https://forum.example.org/t/habit-apps",
            "https://lemmy.world/post/1",
            "https://www.youtube.com/watch?v=1",
        ]
    );
}

#[test]
fn duplicate_domain_merges_first_seen_fields() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    let habitica = &classified.apps[0];
    assert_eq!(habitica.url, "https://habitica.com/");
    assert_eq!(habitica.rating, Some(4.6));
    assert_eq!(habitica.pricing_model, PricingModel::Free);
    assert_eq!(habitica.item_type, ItemType::App);
}

#[test]
fn discussion_feed_entries_use_fallbacks() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    let forum = classified
        .seeding_targets
        .iter()
        .find(|t| t.url == "https://forum.example.org/t/habit-apps")
        .unwrap();
    assert_eq!(forum.source, "Example Forum");
    assert_eq!(forum.meta, "34 comments");
    assert!(forum.is_hijackable);

    let lemmy = classified
        .seeding_targets
        .iter()
        .find(|t| t.url == "https://lemmy.world/post/1")
        .unwrap();
    assert_eq!(lemmy.source, "Forum");
    assert_eq!(lemmy.title, "Discussion");
    assert_eq!(lemmy.meta, "3 years ago");
    assert!(!lemmy.is_hijackable);
}

#[test]
fn forum_videos_become_targets() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    let video = classified
        .seeding_targets
        .iter()
        .find(|t| t.url.contains("youtube"))
        .unwrap();
    assert_eq!(video.source, "YouTube");
    assert_eq!(video.meta, "Video • 12:04");
    assert!(!classified
        .seeding_targets
        .iter()
        .any(|t| t.url.contains("vimeo")));
}

#[test]
fn organic_result_in_discussion_feed_is_a_target() {
    let serp = response(serde_json::json!({
        "organic_results": [{
            "position": 1,
            "title": "Ask HN-style thread",
            "link": "https://community.acme.com/t/1",
            "domain": "community.acme.com",
            "snippet": "Download the app"
        }],
        "discussions_and_forums": [{ "link": "https://community.acme.com/t/1" }]
    }));
    let classified = classify_response(&serp, &Taxonomy::default());
    assert!(classified.apps.is_empty());
    assert_eq!(classified.seeding_targets.len(), 1);
    assert_eq!(classified.seeding_targets[0].source, "Acme");
}

#[test]
fn pivot_ideas_are_collected() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    assert_eq!(
        classified.pivot_ideas,
        vec!["habit tracker printable", "Is there a free habit tracker?"]
    );
}

#[test]
fn app_items_never_sit_on_forum_domains() {
    let taxonomy = Taxonomy::default();
    let classified = classify_response(&habit_tracker_serp(), &taxonomy);
    let classifier = DomainClassifier::new(&taxonomy);
    assert!(classified
        .apps
        .iter()
        .all(|a| classifier.classify(&a.domain) != DomainCategory::Forum));
}

#[test]
fn ratings_stay_in_range_and_domains_unique() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    let mut domains = HashSet::new();
    for app in &classified.apps {
        assert!(app.rating.is_none_or(|r| (0.0..=5.0).contains(&r)));
        assert!(domains.insert(registrable_domain(&app.domain)));
    }
}

#[test]
fn mobile_and_app_hosts_share_one_card() {
    let serp = response(serde_json::json!({
        "organic_results": [
            { "title": "Asana", "link": "https://asana.com/", "domain": "asana.com" },
            { "title": "Asana Mobile", "link": "https://m.asana.com/", "domain": "m.asana.com" },
            { "title": "Asana Login", "link": "https://app.asana.com/", "domain": "app.asana.com" }
        ]
    }));
    let classified = classify_response(&serp, &Taxonomy::default());
    assert_eq!(classified.apps.len(), 1);
    assert_eq!(classified.apps[0].name, "Asana");
    assert_eq!(classified.apps[0].domain, "asana.com");
}

#[test]
fn review_count_extension_is_not_a_rating() {
    let serp = response(serde_json::json!({
        "organic_results": [{
            "title": "Tally Forms",
            "link": "https://tally.so/",
            "domain": "tally.so",
            "rich_snippet": { "top": { "extensions": ["5 reviews"] } }
        }]
    }));
    let classified = classify_response(&serp, &Taxonomy::default());
    assert_eq!(classified.apps[0].rating, None);
    assert!(classified.apps[0].features.iter().all(|f| f != "Top Rated"));
}

#[test]
fn unrated_results_stay_unrated() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    let streaks = classified
        .apps
        .iter()
        .find(|a| a.domain == "streaksapp.com")
        .unwrap();
    assert_eq!(streaks.rating, None);
    assert_eq!(streaks.review_count, None);
}

#[test]
fn top_categories_follow_organic_order() {
    let classified = classify_response(&habit_tracker_serp(), &Taxonomy::default());
    assert_eq!(
        classified.top_categories,
        vec![
            DomainCategory::Unknown,
            DomainCategory::Forum,
            DomainCategory::Unknown
        ]
    );
}

#[test]
fn analyze_response_scores_the_batch() {
    let result = analyze_response(&habit_tracker_serp(), &Taxonomy::default());
    // five targets and fewer than five apps
    assert_eq!(result.verdict.title, "Underserved Market");
    assert_eq!(result.verdict.color, VerdictColor::Green);
    assert!(result.market_report.is_none());
}

#[test]
fn empty_payload_is_saturated() {
    let result = analyze_response(&SerpResponse::default(), &Taxonomy::default());
    assert!(result.apps.is_empty());
    assert!(result.seeding_targets.is_empty());
    assert_eq!(result.verdict.title, "Saturated Market");
}

#[test]
fn review_sites_on_top_veto_the_market() {
    let serp = response(serde_json::json!({
        "organic_results": [
            { "position": 1, "link": "https://www.g2.com/categories/crm", "domain": "g2.com", "title": "Best CRM Software" },
            { "position": 2, "link": "https://www.capterra.com/crm", "domain": "capterra.com", "title": "CRM Software" },
            { "position": 3, "link": "https://www.reddit.com/r/crm/1", "domain": "reddit.com", "title": "crm?" }
        ]
    }));
    let result = analyze_response(&serp, &Taxonomy::default());
    assert_eq!(result.verdict.status, "Do Not Build");
}
