use news_pipeline::{Advisory, AdvisoryLevel, SentimentReport};
use sentiment_analysis::TermCount;
use sentiment_core::{Classification, ScoredItem, SentimentSummary};
use std::fmt::Write;

const BAR_WIDTH: usize = 40;
const TITLE_WIDTH: usize = 72;
const SOURCE_WIDTH: usize = 18;

pub fn advisory_line(advisory: &Advisory) -> String {
    let tag = match advisory.level {
        AdvisoryLevel::Info => "INFO",
        AdvisoryLevel::Warning => "WARN",
        AdvisoryLevel::Error => "ERROR",
    };
    match &advisory.detail {
        Some(detail) => format!("[{}] {}\n        {}", tag, advisory.message, detail),
        None => format!("[{}] {}", tag, advisory.message),
    }
}

/// Plain-text report: distribution, top terms, then the article table.
pub fn report_text(report: &SentimentReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Crowd sentiment for '{}' ({} to {}){}",
        report.query,
        report.window.from,
        report.window.to,
        if report.from_cache { " [cached]" } else { "" }
    );

    if let Some(advisory) = &report.advisory {
        let _ = writeln!(out, "{}", advisory_line(advisory));
    }
    if report.is_empty() {
        return out;
    }

    out.push('\n');
    out.push_str(&distribution(&report.summary));

    if !report.top_terms.is_empty() {
        let _ = writeln!(out, "\nTop terms: {}", terms_line(&report.top_terms));
    }

    out.push('\n');
    out.push_str(&article_table(&report.ranked_items()));
    out
}

fn distribution(summary: &SentimentSummary) -> String {
    let mut out = String::new();
    for classification in [
        Classification::Positive,
        Classification::Negative,
        Classification::Neutral,
    ] {
        let pct = summary.pct_of(classification);
        let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<9} {:>4}  {:>5.1}%  {}",
            classification.label(),
            summary.count_of(classification),
            pct,
            "#".repeat(filled.min(BAR_WIDTH))
        );
    }
    let _ = writeln!(
        out,
        "{} articles, mood: {}, average polarity {:+.3}",
        summary.total_count,
        summary.dominant(),
        summary.average_polarity
    );
    out
}

fn terms_line(terms: &[TermCount]) -> String {
    terms
        .iter()
        .map(|t| format!("{} ({})", t.term, t.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn article_table(items: &[&ScoredItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<9} {:>8}  {:<sw$}  {}",
        "Sentiment",
        "Polarity",
        "Source",
        "Title",
        sw = SOURCE_WIDTH
    );
    for scored in items {
        let _ = writeln!(
            out,
            "{:<9} {:>+8.3}  {:<sw$}  {}",
            scored.classification.label(),
            scored.polarity,
            truncate(&scored.item.source_name, SOURCE_WIDTH),
            truncate(&scored.item.title, TITLE_WIDTH),
            sw = SOURCE_WIDTH
        );
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
