//! Keyword slugs and cache keys.

/// Lowercases, turns whitespace runs into `-`, drops anything that is not an
/// ASCII word character or `-`, and collapses repeated dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let dashed = text
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    dashed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Turns `"ai-resume-builder"` into `"Ai Resume Builder"`.
#[must_use]
pub fn unslugify(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Composite cache key for a `(country, keyword slug)` pair, e.g. `"us_ai-resume-builder"`.
#[must_use]
pub fn cache_key(country: &str, slug: &str) -> String {
    format!("{}_{slug}", country.trim().to_lowercase())
}
