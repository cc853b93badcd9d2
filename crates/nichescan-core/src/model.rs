//! Report-level domain types shared by the classifier, the pipeline and the API.
//!
//! Field names serialize in camelCase because the report page consumes these
//! structures directly (`pricingModel`, `reviewCount`, `ctaText`, ...).

use serde::{Deserialize, Serialize};

/// Category a result domain falls into, decided by keyword containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainCategory {
    /// Caller-whitelisted SaaS brand; always routed to the app bucket.
    TrustedApp,
    Forum,
    PublicDoc,
    ReviewGiant,
    TechRepo,
    News,
    Unknown,
}

impl DomainCategory {
    /// Review aggregators and code hosts are hard to outrank for a new tool.
    #[must_use]
    pub fn is_hard_obstacle(self) -> bool {
        matches!(self, Self::ReviewGiant | Self::TechRepo)
    }
}

impl std::fmt::Display for DomainCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::TrustedApp => "trusted_app",
            Self::Forum => "forum",
            Self::PublicDoc => "public_doc",
            Self::ReviewGiant => "review_giant",
            Self::TechRepo => "tech_repo",
            Self::News => "news",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    App,
    Template,
    Resource,
}

impl ItemType {
    /// Call-to-action label shown on the report card.
    #[must_use]
    pub fn cta_text(self) -> &'static str {
        match self {
            Self::App => "Get App",
            Self::Template => "View Template",
            Self::Resource => "Visit",
        }
    }

    /// Parses a loosely formatted label such as `"App"` or `" template "`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "app" => Some(Self::App),
            "template" => Some(Self::Template),
            "resource" => Some(Self::Resource),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingModel {
    Free,
    Freemium,
    Paid,
    #[serde(rename = "Free Trial")]
    FreeTrial,
    #[serde(rename = "Open Source")]
    OpenSource,
    Unknown,
}

impl PricingModel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Freemium => "Freemium",
            Self::Paid => "Paid",
            Self::FreeTrial => "Free Trial",
            Self::OpenSource => "Open Source",
            Self::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Parses a pricing label case-insensitively, accepting `-`/`_` as spaces.
    /// `"Unknown"` and unrecognized labels both yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "free" => Some(Self::Free),
            "freemium" => Some(Self::Freemium),
            "paid" => Some(Self::Paid),
            "free trial" => Some(Self::FreeTrial),
            "open source" => Some(Self::OpenSource),
            _ => None,
        }
    }
}

impl std::fmt::Display for PricingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate tool, template or resource found in the results.
///
/// Unique per normalized domain within one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppItem {
    /// Brand label derived from the registrable domain, e.g. `"Asana"`.
    pub name: String,
    /// Lowercase host with any `www.` prefix removed.
    pub domain: String,
    pub url: String,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub pricing_model: PricingModel,
    /// At most four short tags, no duplicates.
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Star rating in `[0.0, 5.0]`; absent when the result carried none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Review count as displayed, e.g. `"1,204"` or `"2.3k"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<String>,
    pub cta_text: String,
}

/// A community thread worth answering instead of competing with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedingTarget {
    pub source: String,
    pub title: String,
    pub url: String,
    /// Freshness or engagement hint, e.g. `"42 comments"` or `"Rank #3"`.
    pub meta: String,
    /// `false` once the thread is old enough that replies are unlikely to be seen.
    pub is_hijackable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictColor {
    Green,
    Yellow,
    Red,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: String,
    pub title: String,
    /// Rationale; may contain `<b>` emphasis.
    pub description: String,
    pub color: VerdictColor,
}

impl Verdict {
    /// Verdict returned when the search provider could not be reached.
    #[must_use]
    pub fn fetch_error() -> Self {
        Self {
            status: "Error".to_string(),
            title: "Error".to_string(),
            description: "Fetch failed".to_string(),
            color: VerdictColor::Gray,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verdict: Verdict,
    pub apps: Vec<AppItem>,
    pub seeding_targets: Vec<SeedingTarget>,
    pub pivot_ideas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_report: Option<String>,
}

impl AnalysisResult {
    /// Empty report carrying the fetch-error verdict.
    #[must_use]
    pub fn fetch_error() -> Self {
        Self {
            verdict: Verdict::fetch_error(),
            apps: Vec::new(),
            seeding_targets: Vec::new(),
            pivot_ideas: Vec::new(),
            market_report: None,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.verdict.status == "Error"
    }
}
