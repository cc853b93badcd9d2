//! Search provider boundary: a lenient decoder for ValueSERP payloads and an
//! HTTP client with timeout and exponential-backoff retry.

pub mod client;
pub mod error;
mod lenient;
pub(crate) mod retry;
pub mod types;

pub use client::SerpClient;
pub use error::SerpError;
pub use retry::{max_total_backoff, MAX_RETRY_AFTER_SECS};
pub use types::{
    DetectedExtensions, DiscussionSource, InlineVideo, RawDiscussion, RawResultRecord,
    RelatedQuestion, RelatedSearch, RequestInfo, RichSnippet, RichSnippetTop, SearchParameters,
    SerpResponse,
};
