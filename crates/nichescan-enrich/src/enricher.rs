//! The enrichment boundary and its two implementations.

use std::future::Future;
use std::time::Duration;

use nichescan_core::{AppConfig, AppItem, SeedingTarget};
use reqwest::{Client, Url};

use crate::error::EnrichError;
use crate::patch::{apply_patches, decode_patches};
use crate::prompt::{report_prompt, rewrite_candidates, rewrite_prompt, REWRITE_BATCH};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, RewritePayload};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const TEMPERATURE: f32 = 0.2;
const SYSTEM_PROMPT: &str = "You are a precise market analyst. Output valid JSON only.";

/// Optional rewrite/report step of an analysis.
///
/// Both operations are infallible: implementations log their own failures
/// and fall back to returning the input unchanged (`rewrite`) or an empty
/// string (`report`).
pub trait Enricher: Send + Sync {
    /// `false` when every call is a pass-through.
    fn is_enabled(&self) -> bool;

    /// Returns `items` index-aligned, with at most the first
    /// [`REWRITE_BATCH`] entries patched.
    fn rewrite(&self, keyword: &str, items: &[AppItem])
        -> impl Future<Output = Vec<AppItem>> + Send;

    /// Opaque market report text, empty when unavailable.
    fn report(
        &self,
        keyword: &str,
        apps: &[AppItem],
        targets: &[SeedingTarget],
    ) -> impl Future<Output = String> + Send;
}

/// Enrichment disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Enricher for Passthrough {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn rewrite(&self, _keyword: &str, items: &[AppItem]) -> Vec<AppItem> {
        items.to_vec()
    }

    async fn report(&self, _keyword: &str, _apps: &[AppItem], _targets: &[SeedingTarget]) -> String {
        String::new()
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint in JSON mode.
pub struct LlmEnricher {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for LlmEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmEnricher")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmEnricher {
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, EnrichError> {
        Self::with_base_url(api_key, DEFAULT_MODEL, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`EnrichError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nichescan/0.1 (market-research)")
            .build()?;

        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            base_url.trim_end_matches('/')
        ))
        .map_err(|e| EnrichError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }

    /// Returns `None` when no LLM key is configured.
    ///
    /// # Errors
    ///
    /// See [`LlmEnricher::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, EnrichError> {
        let Some(api_key) = config.llm_api_key.as_deref() else {
            return Ok(None);
        };
        Self::with_base_url(
            api_key,
            &config.llm_model,
            config.llm_timeout_secs,
            &config.llm_base_url,
        )
        .map(Some)
    }

    /// Fallible form of [`Enricher::rewrite`].
    ///
    /// # Errors
    ///
    /// Any transport, status or decoding failure of the completion call.
    pub async fn try_rewrite(
        &self,
        keyword: &str,
        items: &[AppItem],
    ) -> Result<Vec<AppItem>, EnrichError> {
        let candidates = rewrite_candidates(items);
        if candidates.is_empty() {
            return Ok(items.to_vec());
        }
        let candidates_json = serde_json::to_string(&candidates).map_err(EnrichError::Encode)?;

        let content = self
            .complete(&rewrite_prompt(keyword, &candidates_json))
            .await?;
        let payload: RewritePayload =
            serde_json::from_str(strip_code_fence(&content)).map_err(|e| {
                EnrichError::Deserialize {
                    context: format!("rewrite({keyword})"),
                    source: e,
                }
            })?;
        let patches = decode_patches(payload.items);

        let split = items.len().min(REWRITE_BATCH);
        let mut out = apply_patches(&items[..split], &patches);
        out.extend_from_slice(&items[split..]);

        tracing::debug!(keyword, patched = patches.len(), "rewrite applied");
        Ok(out)
    }

    /// Fallible form of [`Enricher::report`]. Returns an empty string without
    /// calling the model when there is no app-typed item.
    ///
    /// # Errors
    ///
    /// Any transport, status or decoding failure, or an answer that is not a
    /// JSON object.
    pub async fn try_report(
        &self,
        keyword: &str,
        apps: &[AppItem],
        targets: &[SeedingTarget],
    ) -> Result<String, EnrichError> {
        let Some(prompt) = report_prompt(keyword, apps, targets) else {
            tracing::debug!(keyword, "no app items, skipping report");
            return Ok(String::new());
        };

        let content = self.complete(&prompt).await?;
        let context = format!("report({keyword})");
        let value: serde_json::Value = serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| EnrichError::Deserialize {
                context: context.clone(),
                source: e,
            })?;
        if !value.is_object() {
            return Err(EnrichError::NotAnObject { context });
        }
        Ok(value.to_string())
    }

    async fn complete(&self, prompt: &str) -> Result<String, EnrichError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat::json_object(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
                context: "chat completion".to_string(),
                source: e,
            })?;
        parsed.into_content().ok_or(EnrichError::EmptyCompletion)
    }
}

impl Enricher for LlmEnricher {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn rewrite(&self, keyword: &str, items: &[AppItem]) -> Vec<AppItem> {
        match self.try_rewrite(keyword, items).await {
            Ok(rewritten) => rewritten,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "rewrite failed, keeping heuristic items");
                items.to_vec()
            }
        }
    }

    async fn report(&self, keyword: &str, apps: &[AppItem], targets: &[SeedingTarget]) -> String {
        match self.try_report(keyword, apps, targets).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "market report failed");
                String::new()
            }
        }
    }
}

/// The enricher selected by configuration.
#[derive(Debug)]
pub enum ConfiguredEnricher {
    Passthrough(Passthrough),
    Llm(LlmEnricher),
}

impl ConfiguredEnricher {
    /// Uses the LLM when `NICHESCAN_LLM_API_KEY` is set, otherwise passes through.
    ///
    /// # Errors
    ///
    /// See [`LlmEnricher::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        Ok(match LlmEnricher::from_config(config)? {
            Some(llm) => Self::Llm(llm),
            None => Self::Passthrough(Passthrough),
        })
    }
}

impl Enricher for ConfiguredEnricher {
    fn is_enabled(&self) -> bool {
        match self {
            Self::Passthrough(p) => p.is_enabled(),
            Self::Llm(l) => l.is_enabled(),
        }
    }

    async fn rewrite(&self, keyword: &str, items: &[AppItem]) -> Vec<AppItem> {
        match self {
            Self::Passthrough(p) => p.rewrite(keyword, items).await,
            Self::Llm(l) => l.rewrite(keyword, items).await,
        }
    }

    async fn report(&self, keyword: &str, apps: &[AppItem], targets: &[SeedingTarget]) -> String {
        match self {
            Self::Passthrough(p) => p.report(keyword, apps, targets).await,
            Self::Llm(l) => l.report(keyword, apps, targets).await,
        }
    }
}

/// Some models wrap JSON-mode answers in a markdown fence anyway.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
