//! Best-effort model of a ValueSERP `/search` response.
//!
//! Every field is optional or defaulted. A payload missing entire sections,
//! carrying `null` where a list is expected, or mixing malformed entries into
//! a list still decodes; the bad parts simply disappear.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_info: Option<RequestInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<SearchParameters>,
    #[serde(deserialize_with = "lenient::seq")]
    pub organic_results: Vec<RawResultRecord>,
    #[serde(deserialize_with = "lenient::seq")]
    pub discussions_and_forums: Vec<RawDiscussion>,
    #[serde(deserialize_with = "lenient::seq")]
    pub related_searches: Vec<RelatedSearch>,
    #[serde(deserialize_with = "lenient::seq")]
    pub related_questions: Vec<RelatedQuestion>,
    #[serde(deserialize_with = "lenient::seq")]
    pub inline_videos: Vec<InlineVideo>,
}

impl SerpResponse {
    /// Decodes a stored or fetched payload.
    ///
    /// # Errors
    ///
    /// Returns an error only when `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// `true` when the provider explicitly flagged the request as failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.request_info
            .as_ref()
            .and_then(|info| info.success)
            .is_some_and(|success| !success)
    }

    /// Links listed in the discussions feed.
    #[must_use]
    pub fn discussion_links(&self) -> HashSet<&str> {
        self.discussions_and_forums
            .iter()
            .filter_map(|d| d.link.as_deref())
            .filter(|link| !link.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInfo {
    #[serde(deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<f64>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub hl: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub google_domain: Option<String>,
}

/// One organic search hit. Never mutated after decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawResultRecord {
    #[serde(deserialize_with = "lenient::position", skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub displayed_link: Option<String>,
    /// Publication hint such as `"3 days ago"` or `"Mar 4, 2021"`.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_snippet: Option<RichSnippet>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl RawResultRecord {
    /// Free-form rich-snippet strings such as `"4.5(200)"` or `"Free"`.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        self.rich_snippet
            .as_ref()
            .and_then(|r| r.top.as_ref())
            .map_or(&[], |top| top.extensions.as_slice())
    }

    #[must_use]
    pub fn detected_extensions(&self) -> Option<&DetectedExtensions> {
        self.rich_snippet
            .as_ref()
            .and_then(|r| r.top.as_ref())
            .and_then(|top| top.detected_extensions.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<RichSnippetTop>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichSnippetTop {
    #[serde(deserialize_with = "lenient::seq")]
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_extensions: Option<DetectedExtensions>,
}

/// Structured rating fields the provider already parsed out of the snippet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedExtensions {
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub reviews: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDiscussion {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub discussion_title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DiscussionSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscussionSource {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineVideo {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Duration as displayed, e.g. `"12:04"`.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedSearch {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedQuestion {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}
