//! Wire types for OpenAI-compatible chat completions and the rewrite payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub(crate) fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    pub(crate) fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
    }
}

/// One candidate sent to the rewrite prompt.
#[derive(Debug, Serialize)]
pub(crate) struct RewriteCandidate<'a> {
    pub id: usize,
    pub name: &'a str,
    pub snippet: &'a str,
    pub price_detected: &'a str,
    /// `"N/A"` when the result carried no rating.
    pub real_rating: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RewritePayload {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

/// One entry of the model's rewrite answer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewritePatch {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub pricing: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub specific_features: Option<Vec<String>>,
    pub audience: Option<String>,
}
