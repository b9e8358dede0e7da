//! Plain-text rendering for CLI output.
//!
//! Every string taken from the store passes through [`sanitize_inline`] or
//! [`sanitize_for_terminal`] before it is printed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filters::{FilterOutcome, TimeReference};
use crate::indexer::Catalog;
use crate::models::{Conversation, MatchedField, MessageBatch, Role};
use crate::resolver::Resolution;
use crate::search::SearchResults;
use crate::stats::{StatsReport, StatsSummary, WeeklyStats};
use crate::store::StoreInfo;
use crate::utils::{format_path_with_tilde, sanitize_for_terminal, sanitize_inline, truncate_text};

const ID_CHARS: usize = 8;
const TITLE_CHARS: usize = 70;

fn format_time(timestamp: Option<DateTime<Utc>>, reference: &TimeReference) -> String {
    match timestamp {
        Some(ts) => ts.with_timezone(&reference.offset).format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown         ".to_string(),
    }
}

fn short_id(id: &str) -> String {
    sanitize_inline(&id.chars().take(ID_CHARS).collect::<String>())
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn conversation_row(conversation: &Conversation, reference: &TimeReference) -> String {
    format!(
        "{}  {:<8}  {:>5} msgs  {}",
        format_time(conversation.created_at, reference),
        short_id(&conversation.id),
        conversation.message_count,
        truncate_text(&sanitize_inline(&conversation.title), TITLE_CHARS)
    )
}

pub fn conversation_table(conversations: &[&Conversation], reference: &TimeReference) -> String {
    if conversations.is_empty() {
        return "No conversations found.\n".to_string();
    }
    join_lines(conversations.iter().map(|c| conversation_row(c, reference)).collect())
}

/// One-line summary of what the filter hid, empty when nothing was hidden
pub fn filter_footer(shown: usize, outcome: &FilterOutcome) -> String {
    let mut hidden = Vec::new();
    if outcome.excluded_archived > 0 {
        hidden.push(format!("{} archived (use --all)", outcome.excluded_archived));
    }
    if outcome.excluded_unknown_time > 0 {
        hidden.push(format!("{} without timestamp", outcome.excluded_unknown_time));
    }
    if outcome.excluded_out_of_range > 0 {
        hidden.push(format!("{} outside time range", outcome.excluded_out_of_range));
    }
    if outcome.excluded_empty > 0 {
        hidden.push(format!("{} empty", outcome.excluded_empty));
    }

    let truncated = outcome.matched.saturating_sub(shown);
    if truncated > 0 {
        hidden.push(format!("{} beyond --limit", truncated));
    }

    if hidden.is_empty() {
        String::new()
    } else {
        format!("\nHidden: {}\n", hidden.join(", "))
    }
}

pub fn conversation_detail(conversation: &Conversation, batch: &MessageBatch, reference: &TimeReference) -> String {
    let mut lines = vec![
        format!("# {}", sanitize_inline(&conversation.title)),
        format!("ID:       {}", sanitize_inline(&conversation.id)),
        format!("Created:  {}", format_time(conversation.created_at, reference).trim_end()),
        format!("Status:   {}", sanitize_inline(conversation.status.as_str())),
    ];
    if let Some(subtitle) = &conversation.subtitle {
        lines.push(format!("Subtitle: {}", sanitize_inline(subtitle)));
    }
    if let Some(model) = &conversation.model {
        lines.push(format!("Model:    {}", sanitize_inline(model)));
    }
    if conversation.total_lines_added > 0 || conversation.total_lines_removed > 0 {
        lines.push(format!("Lines:    +{} -{}", conversation.total_lines_added, conversation.total_lines_removed));
    }

    for message in batch.messages.iter().filter(|m| !m.text.trim().is_empty()) {
        let speaker = match message.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        lines.push(String::new());
        lines.push(format!("## {} ({})", speaker, format_time(message.created_at, reference).trim_end()));
        lines.push(sanitize_for_terminal(message.text.trim_end()));
    }

    if batch.skipped > 0 {
        lines.push(String::new());
        lines.push(format!("({} message(s) could not be decoded)", batch.skipped));
    }
    join_lines(lines)
}

pub fn unresolved(query: &str, resolution: &Resolution, reference: &TimeReference) -> String {
    match resolution {
        Resolution::Ambiguous(candidates) => {
            let mut lines =
                vec![format!("'{}' matches {} conversations:", sanitize_inline(query), candidates.len())];
            lines.extend(candidates.iter().map(|c| format!("  {}", conversation_row(c, reference))));
            lines.push("Use a longer id prefix or the full title.".to_string());
            join_lines(lines)
        }
        _ => format!("No conversation matches '{}'\n", sanitize_inline(query)),
    }
}

fn field_label(field: MatchedField) -> &'static str {
    match field {
        MatchedField::Title => "title",
        MatchedField::Subtitle => "subtitle",
        MatchedField::Preview => "preview",
        MatchedField::MessageText => "message",
        MatchedField::Diff => "diff",
    }
}

pub fn search_results(results: &SearchResults, reference: &TimeReference) -> String {
    let page = &results.page;
    let Some((first, last)) = page.display_range() else {
        return if page.total_count == 0 {
            "No matching conversations.\n".to_string()
        } else {
            format!("Page {} is empty ({} results, {} pages).\n", page.page, page.total_count, page.total_pages)
        };
    };

    let mut lines = vec![format!(
        "{}-{} of {} (page {}/{})",
        first, last, page.total_count, page.page, page.total_pages
    )];
    for hit in &page.items {
        let fields: Vec<&str> = hit.matched_fields().into_iter().map(field_label).collect();
        lines.push(format!("{}  [{}]", conversation_row(&hit.conversation, reference), fields.join(", ")));
    }
    if page.has_next() {
        lines.push(format!("Next: --page {}", page.page + 1));
    }
    join_lines(lines)
}

fn summary_lines(summary: &StatsSummary) -> Vec<String> {
    if summary.count == 0 {
        return vec!["No conversations.".to_string()];
    }
    let mut lines = vec![
        format!("Conversations: {}", summary.count),
        format!("Messages:      {}", summary.total),
        format!("Mean:          {:.1}", summary.mean),
        format!("Median:        {:.1}", summary.median),
        format!("Std dev:       {:.1}", summary.stdev),
        format!("Range:         {}-{}", summary.min, summary.max),
        format!("P25/P75/P90:   {}/{}/{}", summary.p25, summary.p75, summary.p90),
        "Distribution:".to_string(),
    ];
    lines.extend(summary.distribution.iter().map(|b| format!("  {:>7}  {}", b.label, b.count)));
    lines
}

pub fn stats_report(report: &StatsReport, reference: &TimeReference) -> String {
    let mut lines = summary_lines(&report.summary);
    if let (Some(start), Some(end)) = (report.summary.start, report.summary.end) {
        lines.push(format!(
            "Period:        {} to {}",
            format_time(Some(start), reference),
            format_time(Some(end), reference)
        ));
    }
    if !report.top.is_empty() {
        lines.push(String::new());
        lines.push("Largest conversations:".to_string());
        lines.extend(report.top.iter().map(|c| format!("  {}", conversation_row(c, reference))));
    }
    join_lines(lines)
}

pub fn weekly_stats(weeks: &[WeeklyStats], reference: &TimeReference) -> String {
    let mut lines = Vec::new();
    for week in weeks {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "Week of {} to {}",
            week.start.with_timezone(&reference.offset).format("%Y-%m-%d"),
            week.end.with_timezone(&reference.offset).format("%Y-%m-%d")
        ));
        lines.extend(summary_lines(&week.summary).into_iter().map(|l| format!("  {}", l)));
    }
    join_lines(lines)
}

/// Totals over the whole catalog, ignoring filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogTotals {
    pub conversations: usize,
    pub archived: usize,
    pub messages: usize,
    pub lines_added: i64,
    pub lines_removed: i64,
    pub skipped_records: usize,
}

impl CatalogTotals {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut totals = Self { skipped_records: catalog.report.skipped(), ..Self::default() };
        for conversation in &catalog.conversations {
            totals.conversations += 1;
            totals.archived += usize::from(conversation.is_archived);
            totals.messages += conversation.message_count;
            totals.lines_added += conversation.total_lines_added;
            totals.lines_removed += conversation.total_lines_removed;
        }
        totals
    }
}

pub fn store_info(info: &StoreInfo, totals: &CatalogTotals) -> String {
    join_lines(vec![
        "Cursor Conversation Store".to_string(),
        "=========================".to_string(),
        format!("Path:          {}", sanitize_inline(&format_path_with_tilde(&info.path))),
        format!("Size:          {:.1} MB", info.size_bytes as f64 / (1024.0 * 1024.0)),
        format!("Conversations: {} ({} archived)", totals.conversations, totals.archived),
        format!("Messages:      {}", totals.messages),
        format!("Lines added:   {}", totals.lines_added),
        format!("Lines removed: {}", totals.lines_removed),
        format!("Skipped:       {}", totals.skipped_records),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::filters::CatalogFilter;
    use crate::models::{FieldMatch, SearchHit};
    use crate::search::Page;

    fn reference() -> TimeReference {
        TimeReference::utc(Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_row_sanitizes_title() {
        let conversation = Conversation::sample("abcdef123456", "\x1b[31mEvil\x1b[0m\ntitle", None);
        let row = conversation_row(&conversation, &reference());
        assert!(row.contains("abcdef12 "));
        assert!(row.ends_with("Evil title"));
        assert!(row.starts_with("unknown"));
    }

    #[test]
    fn test_filter_footer() {
        assert_eq!(filter_footer(3, &FilterOutcome { matched: 3, ..FilterOutcome::default() }), "");
        let outcome = FilterOutcome { matched: 5, excluded_archived: 2, ..FilterOutcome::default() };
        let footer = filter_footer(3, &outcome);
        assert!(footer.contains("2 archived (use --all)"));
        assert!(footer.contains("2 beyond --limit"));
    }

    #[test]
    fn test_search_results_header() {
        let hits: Vec<SearchHit> = (0..87)
            .map(|i| SearchHit {
                conversation: Conversation::sample(&format!("c{i}"), "t", Some(1_000)),
                matches: vec![FieldMatch { term: "t".to_string(), field: MatchedField::Title, message_id: None }],
            })
            .collect();
        let results = SearchResults {
            page: Page::paginate(hits, 1, 20),
            filter: FilterOutcome::default(),
            skipped_messages: 0,
        };
        let text = search_results(&results, &reference());
        assert!(text.starts_with("1-20 of 87 (page 1/5)"));
        assert!(text.contains("[title]"));
        assert!(text.contains("Next: --page 2"));
    }

    #[test]
    fn test_unresolved_lists_candidates() {
        let candidates = vec![Conversation::sample("a1", "Same", Some(2_000)), Conversation::sample("a2", "Same", Some(1_000))];
        let text = unresolved("Same", &Resolution::Ambiguous(candidates), &reference());
        assert!(text.starts_with("'Same' matches 2 conversations:"));
        assert!(text.contains("a1"));
        assert_eq!(unresolved("x", &Resolution::NotFound, &reference()), "No conversation matches 'x'\n");
    }

    #[test]
    fn test_stats_report_empty() {
        let report = crate::stats::compute_stats(&[], &CatalogFilter::default());
        assert!(stats_report(&report, &reference()).contains("No conversations."));
    }
}
