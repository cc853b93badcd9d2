use thiserror::Error;

/// Errors returned by the search provider client.
#[derive(Debug, Error)]
pub enum SerpError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered 429.
    #[error("rate limited by search provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-2xx status.
    #[error("unexpected HTTP {status} from search provider for {context}")]
    UnexpectedStatus { status: u16, context: String },

    /// The payload reported `request_info.success == false`.
    #[error("search provider error: {0}")]
    ApiError(String),

    /// The response body is not JSON at all.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("VALUESERP_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
