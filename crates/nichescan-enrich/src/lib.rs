//! Optional LLM enrichment: rewrites heuristic items as a sparse patch keyed
//! by position and produces an opaque market report. Every failure degrades
//! to the heuristic result.

pub mod enricher;
pub mod error;
pub mod patch;
mod prompt;
pub mod types;

pub use enricher::{ConfiguredEnricher, Enricher, LlmEnricher, Passthrough};
pub use error::EnrichError;
pub use patch::apply_patches;
pub use prompt::{manual_prompts, ManualPrompts, REPORT_TOP_APPS, REWRITE_BATCH};
pub use types::RewritePatch;
