use nichescan_db::DbError;
use nichescan_enrich::EnrichError;
use thiserror::Error;

/// Errors the pipeline surfaces to callers. External failures during an
/// analysis never appear here; they become an error verdict or a logged
/// degradation instead. Editor operations report theirs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("keyword must contain at least one word character")]
    EmptyKeyword,

    #[error("override supplies no fields")]
    EmptyOverride,

    #[error("invalid {field}: {reason}")]
    InvalidOverride { field: &'static str, reason: String },

    #[error("no cached analysis for {cache_key}")]
    NotCached { cache_key: String },

    #[error("cached payload for {cache_key} does not parse")]
    MalformedPayload {
        cache_key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Prompt(#[from] EnrichError),
}
