//! Linear AND search over the filtered catalog.
//!
//! Each conversation is checked in field priority order: title, subtitle, preview,
//! then message text, then (with diff search) message diffs, code block file names
//! and `codeBlockDiff` records. Message and diff content is loaded only for
//! conversations whose metadata left some term unmatched.

use serde::Serialize;
use tracing::debug;

use super::pagination::{DEFAULT_PAGE_SIZE, Page};
use crate::error::Result;
use crate::filters::{CatalogFilter, FilterOutcome, apply_filter, sort_most_recent_first};
use crate::models::{Conversation, FieldMatch, MatchedField, SearchHit, SearchQuery};
use crate::store::ConversationSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub filter: CatalogFilter,
    pub include_diffs: bool,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { filter: CatalogFilter::default(), include_diffs: false, page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub page: Page<SearchHit>,
    pub filter: FilterOutcome,
    /// Message records that failed to decode while scanning
    pub skipped_messages: usize,
}

/// Per-term match state for one conversation
struct TermMatcher<'q> {
    needles: Vec<(String, &'q str)>,
    found: Vec<Option<FieldMatch>>,
}

impl<'q> TermMatcher<'q> {
    fn new(query: &'q SearchQuery) -> Self {
        let needles: Vec<(String, &str)> =
            query.terms().iter().map(|t| (t.text.to_lowercase(), t.text.as_str())).collect();
        let found = vec![None; needles.len()];
        Self { needles, found }
    }

    fn is_complete(&self) -> bool {
        self.found.iter().all(Option::is_some)
    }

    /// Record every still-unmatched term found in `text`
    fn check(&mut self, text: &str, field: MatchedField, message_id: Option<&str>) {
        if text.is_empty() || self.is_complete() {
            return;
        }
        let haystack = text.to_lowercase();
        for ((needle, original), slot) in self.needles.iter().zip(self.found.iter_mut()) {
            if slot.is_none() && haystack.contains(needle.as_str()) {
                *slot = Some(FieldMatch {
                    term: original.to_string(),
                    field,
                    message_id: message_id.map(str::to_string),
                });
            }
        }
    }

    fn into_matches(self) -> Option<Vec<FieldMatch>> {
        self.found.into_iter().collect()
    }
}

/// Search the conversations accepted by `options.filter`, most recent first
///
/// # Errors
///
/// Fails only if loading messages or diffs from `source` fails. Messages that do
/// not decode are skipped and counted in [`SearchResults::skipped_messages`].
pub fn search<S: ConversationSource + ?Sized>(
    conversations: &[Conversation],
    source: &S,
    query: &SearchQuery,
    options: &SearchOptions,
) -> Result<SearchResults> {
    let (mut candidates, outcome) = apply_filter(conversations, &options.filter);
    sort_most_recent_first(&mut candidates);

    let mut hits = Vec::new();
    let mut skipped_messages = 0;
    let mut loaded = 0;

    for conversation in candidates {
        let mut matcher = TermMatcher::new(query);
        matcher.check(&conversation.title, MatchedField::Title, None);
        if let Some(subtitle) = &conversation.subtitle {
            matcher.check(subtitle, MatchedField::Subtitle, None);
        }
        if let Some(preview) = &conversation.preview {
            matcher.check(preview, MatchedField::Preview, None);
        }

        if !matcher.is_complete() {
            loaded += 1;
            let batch = conversation.messages(source)?;
            skipped_messages += batch.skipped;
            for message in &batch.messages {
                matcher.check(&message.text, MatchedField::MessageText, Some(&message.id));
            }

            if options.include_diffs && !matcher.is_complete() {
                for message in &batch.messages {
                    if let Some(diff) = &message.diff_text {
                        matcher.check(diff, MatchedField::Diff, Some(&message.id));
                    }
                }
                for file in &conversation.code_block_files {
                    matcher.check(file, MatchedField::Diff, None);
                }
                if !matcher.is_complete() {
                    for diff in conversation.code_diffs(source)? {
                        matcher.check(&diff.content, MatchedField::Diff, None);
                    }
                }
            }
        }

        if let Some(matches) = matcher.into_matches() {
            hits.push(SearchHit { conversation: conversation.clone(), matches });
        }
    }

    debug!(
        candidates = outcome.matched,
        loaded_messages_for = loaded,
        hits = hits.len(),
        "Search complete"
    );

    Ok(SearchResults { page: Page::paginate(hits, options.page, options.page_size), filter: outcome, skipped_messages })
}
