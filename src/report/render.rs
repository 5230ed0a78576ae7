//! Plain-text rendering of a [`Report`] for terminals.

use std::fmt::Write;

use crate::analyzers::Registry;
use crate::types::Report;

/// Render the report as sectioned text. Analyzer rows follow registry order.
pub fn text(report: &Report, registry: &Registry) -> String {
    let mut out = String::new();
    // Writing to a String can't fail.
    let _ = write_report(&mut out, report, registry);
    out
}

fn write_report(out: &mut String, report: &Report, registry: &Registry) -> std::fmt::Result {
    let p = &report.personalization;
    writeln!(out, "\n=== Conversation Analysis: {} & {} ===", p.you(), p.them())?;

    if !report.success {
        writeln!(
            out,
            "Analysis failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        )?;
        if let Some(stats) = &report.stats {
            writeln!(out, "Messages parsed: {}", stats.total_messages)?;
        }
        return Ok(());
    }

    if let Some(stats) = &report.stats {
        writeln!(
            out,
            "Messages: {} ({} sent, {} received)",
            stats.total_messages, stats.sent_messages, stats.received_messages
        )?;
        if let (Some(start), Some(end)) = (stats.start, stats.end) {
            writeln!(
                out,
                "Period: {} ~ {}{}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M"),
                if stats.timestamps_inferred { " (approximate)" } else { "" }
            )?;
        }
    }
    if let Some(health) = report.health_score {
        writeln!(out, "Health score: {:.0}/100", health)?;
    }
    writeln!(out, "\n{}", report.summary)?;

    if !report.insights.is_empty() {
        writeln!(out, "\n--- Key Insights ---\n")?;
        for (i, insight) in report.insights.iter().enumerate() {
            writeln!(
                out,
                "  {}. [{}] {}: {}",
                i + 1,
                insight.importance,
                insight.category,
                insight.insight
            )?;
        }
    }

    if !report.recommendations.is_empty() {
        writeln!(out, "\n--- Recommendations ---\n")?;
        for (i, rec) in report.recommendations.iter().enumerate() {
            writeln!(out, "  {}. [{}] {}", i + 1, rec.priority, rec.action)?;
            writeln!(out, "     {}", rec.details)?;
        }
    }

    let analyses = serde_json::to_value(&report.analyses).unwrap_or_default();
    writeln!(out, "\n--- Analyzers ---\n")?;
    for analyzer in registry.iter() {
        let Some(result) = analyses.get(analyzer.id()).filter(|v| !v.is_null()) else {
            continue;
        };
        let score = result.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0);
        let summary = result.get("summary").and_then(|s| s.as_str()).unwrap_or("");
        writeln!(out, "  {:<24} {:>5.1}  {}", analyzer.label(), score, summary)?;
    }

    writeln!(out, "\nLexicon: {}", report.lexicon_version)?;
    Ok(())
}
