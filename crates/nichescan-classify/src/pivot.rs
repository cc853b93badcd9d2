//! Adjacent-niche suggestions from related searches and questions.

use std::collections::HashSet;

use nichescan_serp::SerpResponse;

const MAX_IDEAS: usize = 8;
const MIN_CHARS_EXCLUSIVE: usize = 5;
const MAX_CHARS_EXCLUSIVE: usize = 70;

/// Related queries first, then related questions. Trimmed, deduplicated
/// case-insensitively, kept when strictly between 5 and 70 characters.
#[must_use]
pub fn pivot_ideas(response: &SerpResponse) -> Vec<String> {
    let searches = response
        .related_searches
        .iter()
        .filter_map(|s| s.query.as_deref());
    let questions = response
        .related_questions
        .iter()
        .filter_map(|q| q.question.as_deref());

    let mut seen: HashSet<String> = HashSet::new();
    searches
        .chain(questions)
        .map(str::trim)
        .filter(|idea| {
            let len = idea.chars().count();
            len > MIN_CHARS_EXCLUSIVE && len < MAX_CHARS_EXCLUSIVE
        })
        .filter(|idea| seen.insert(idea.to_lowercase()))
        .take(MAX_IDEAS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: serde_json::Value) -> SerpResponse {
        serde_json::from_value(value).expect("valid response fixture")
    }

    #[test]
    fn merges_searches_then_questions() {
        let resp = response(serde_json::json!({
            "related_searches": [{ "query": "habit tracker printable" }],
            "related_questions": [{ "question": "What is the best habit tracker app?" }]
        }));
        assert_eq!(
            pivot_ideas(&resp),
            vec![
                "habit tracker printable",
                "What is the best habit tracker app?"
            ]
        );
    }

    #[test]
    fn filters_by_length_and_dedupes_case_insensitively() {
        let long = "x".repeat(70);
        let resp = response(serde_json::json!({
            "related_searches": [
                { "query": "short" },
                { "query": "  Habit Tracker App  " },
                { "query": "habit tracker app" },
                { "query": long },
                { "query": null }
            ]
        }));
        assert_eq!(pivot_ideas(&resp), vec!["Habit Tracker App"]);
    }

    #[test]
    fn caps_at_eight() {
        let searches: Vec<serde_json::Value> = (0..12)
            .map(|n| serde_json::json!({ "query": format!("related idea {n}") }))
            .collect();
        let resp = response(serde_json::json!({ "related_searches": searches }));
        let ideas = pivot_ideas(&resp);
        assert_eq!(ideas.len(), 8);
        assert_eq!(ideas[0], "related idea 0");
    }

    #[test]
    fn missing_lists_yield_nothing() {
        assert!(pivot_ideas(&SerpResponse::default()).is_empty());
    }
}
