use std::fmt::Write as _;

use nichescan_core::AnalysisResult;

pub(crate) fn print_json(result: &AnalysisResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Human-readable report. Emphasis markup in the verdict is stripped.
pub(crate) fn render_plain(keyword: &str, result: &AnalysisResult) -> String {
    let mut out = String::new();
    let verdict = &result.verdict;
    let _ = writeln!(out, "{keyword}");
    let _ = writeln!(
        out,
        "Verdict: {} ({:?}) - {}",
        verdict.title,
        verdict.color,
        strip_tags(&verdict.description)
    );

    let _ = writeln!(out, "\nApps ({})", result.apps.len());
    for (idx, app) in result.apps.iter().enumerate() {
        let rating = app
            .rating
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
        let _ = writeln!(
            out,
            "{:>3}. {:<24} {:<9} {:<12} {:>4}  {}",
            idx + 1,
            app.name,
            format!("{:?}", app.item_type).to_lowercase(),
            app.pricing_model.as_str(),
            rating,
            app.domain
        );
        if !app.features.is_empty() {
            let _ = writeln!(out, "     {}", app.features.join(", "));
        }
    }

    let _ = writeln!(out, "\nSeeding targets ({})", result.seeding_targets.len());
    for target in &result.seeding_targets {
        let stale = if target.is_hijackable { "" } else { " [old]" };
        let _ = writeln!(
            out,
            "  - [{}] {} ({}){stale}\n    {}",
            target.source, target.title, target.meta, target.url
        );
    }

    if !result.pivot_ideas.is_empty() {
        let _ = writeln!(out, "\nPivot ideas");
        for idea in &result.pivot_ideas {
            let _ = writeln!(out, "  - {idea}");
        }
    }

    if let Some(report) = result.market_report.as_deref() {
        let _ = writeln!(out, "\nMarket report\n{report}");
    }
    out
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
