//! Domain categorisation and brand-name derivation.

use nichescan_core::{DomainCategory, Taxonomy};

/// Second-level labels that sit in front of a two-letter ccTLD, as in
/// `example.co.uk` or `example.com.au`.
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "net", "org", "gov", "edu", "ac"];

const SUBDOMAIN_PREFIXES: &[&str] = &["www.", "m.", "app."];

/// Classifies hostnames against the taxonomy's category keyword lists.
#[derive(Debug, Clone, Copy)]
pub struct DomainClassifier<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> DomainClassifier<'a> {
    #[must_use]
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Categorises a hostname or URL. Total: unmatched and empty input yield
    /// [`DomainCategory::Unknown`].
    ///
    /// Trusted domains win outright (exact host or subdomain match). Category
    /// lists are then checked in priority order, and the first list with a
    /// keyword contained in the host wins.
    #[must_use]
    pub fn classify(&self, domain: &str) -> DomainCategory {
        let host = normalize_domain(domain);
        if host.is_empty() {
            return DomainCategory::Unknown;
        }

        let trusted = self.taxonomy.trusted_domains.iter().any(|t| {
            host == *t
                || host
                    .strip_suffix(t.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        });
        if trusted {
            return DomainCategory::TrustedApp;
        }

        let ordered: [(DomainCategory, &[String]); 5] = [
            (DomainCategory::Forum, &self.taxonomy.forum),
            (DomainCategory::PublicDoc, &self.taxonomy.public_doc),
            (DomainCategory::ReviewGiant, &self.taxonomy.review_giant),
            (DomainCategory::TechRepo, &self.taxonomy.tech_repo),
            (DomainCategory::News, &self.taxonomy.news),
        ];
        ordered
            .into_iter()
            .find(|(_, keywords)| keywords.iter().any(|k| host.contains(k.as_str())))
            .map_or(DomainCategory::Unknown, |(category, _)| category)
    }
}

/// Lowercases a hostname or URL down to its host, without scheme, port, path
/// or a leading `www.`.
///
/// ```
/// use nichescan_classify::normalize_domain;
/// assert_eq!(normalize_domain("https://WWW.Asana.com/pricing"), "asana.com");
/// assert_eq!(normalize_domain(""), "");
/// ```
#[must_use]
pub fn normalize_domain(input: &str) -> String {
    nichescan_core::normalize_host(input)
}

/// The identity app items are deduplicated on: the normalized host minus one
/// `www.`, `m.` or `app.` prefix.
///
/// ```
/// use nichescan_classify::registrable_domain;
/// assert_eq!(registrable_domain("https://app.Asana.com/0/home"), "asana.com");
/// assert_eq!(registrable_domain("blog.hubspot.com"), "blog.hubspot.com");
/// ```
#[must_use]
pub fn registrable_domain(input: &str) -> String {
    let host = normalize_domain(input);
    SUBDOMAIN_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .filter(|rest| rest.contains('.'))
        .map_or_else(|| host.clone(), str::to_string)
}

/// Derives a display brand from a hostname, e.g. `"app.asana.com"` → `"Asana"`
/// and `"shop.example.co.uk"` → `"Example"`. Falls back to `"Site"`.
#[must_use]
pub fn brand_name(domain: &str) -> String {
    let host = registrable_domain(domain);

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let label = match labels.as_slice() {
        [] => return "Site".to_string(),
        [only] => *only,
        [.., sld, penultimate, tld]
            if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(penultimate) =>
        {
            *sld
        }
        [.., second, _] => *second,
    };

    title_case(label)
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Site".to_string(),
    }
}
