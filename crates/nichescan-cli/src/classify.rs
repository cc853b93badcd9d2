//! `classify`: offline classification of a saved payload.

use std::path::Path;

use anyhow::Context;
use nichescan_classify::analyze_response;
use nichescan_core::Taxonomy;
use nichescan_serp::SerpResponse;

use crate::output::{print_json, render_plain};

/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON object.
pub(crate) fn run_classify(file: &Path, taxonomy: &Taxonomy, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let response = SerpResponse::from_json(&raw)
        .with_context(|| format!("{} is not a search provider payload", file.display()))?;

    let result = analyze_response(&response, taxonomy);

    if json {
        print_json(&result)?;
    } else {
        let label = response
            .search_parameters
            .as_ref()
            .and_then(|p| p.q.clone())
            .unwrap_or_else(|| file.display().to_string());
        print!("{}", render_plain(&label, &result));
    }
    Ok(())
}
