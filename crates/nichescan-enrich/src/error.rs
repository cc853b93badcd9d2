use thiserror::Error;

/// Failures talking to the language model. Callers of [`crate::Enricher`]
/// never see these; they are logged and the heuristic result is kept.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode prompt payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("model answer for {context} is not a JSON object")]
    NotAnObject { context: String },

    #[error("model returned no content")]
    EmptyCompletion,

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
