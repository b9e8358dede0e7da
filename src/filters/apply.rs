use serde::Serialize;
use tracing::debug;

use super::time::TimeRange;
use crate::models::Conversation;

/// Pre-filter shared by list, resolve, search and stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogFilter {
    pub range: TimeRange,
    pub include_archived: bool,
    /// When false, conversations without any message are dropped
    pub include_empty: bool,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self { range: TimeRange::unbounded(), include_archived: false, include_empty: true }
    }
}

impl CatalogFilter {
    pub fn with_range(range: TimeRange) -> Self {
        Self { range, ..Self::default() }
    }

    pub fn include_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    pub fn include_empty(mut self, include: bool) -> Self {
        self.include_empty = include;
        self
    }

    pub fn accepts(&self, conversation: &Conversation) -> bool {
        self.rejection(conversation).is_none()
    }

    fn rejection(&self, conversation: &Conversation) -> Option<Rejection> {
        if conversation.is_archived && !self.include_archived {
            return Some(Rejection::Archived);
        }
        if !self.range.contains(conversation.created_at) {
            return Some(if conversation.created_at.is_none() {
                Rejection::UnknownTime
            } else {
                Rejection::OutOfRange
            });
        }
        if conversation.is_empty() && !self.include_empty {
            return Some(Rejection::Empty);
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum Rejection {
    Archived,
    UnknownTime,
    OutOfRange,
    Empty,
}

/// How many conversations each filter stage removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub matched: usize,
    pub excluded_archived: usize,
    pub excluded_unknown_time: usize,
    pub excluded_out_of_range: usize,
    pub excluded_empty: usize,
}

impl FilterOutcome {
    pub fn excluded(&self) -> usize {
        self.excluded_archived + self.excluded_unknown_time + self.excluded_out_of_range + self.excluded_empty
    }
}

/// Keep the conversations accepted by `filter`, preserving input order
pub fn apply_filter<'a>(
    conversations: &'a [Conversation],
    filter: &CatalogFilter,
) -> (Vec<&'a Conversation>, FilterOutcome) {
    let mut outcome = FilterOutcome::default();
    let mut kept = Vec::new();

    for conversation in conversations {
        match filter.rejection(conversation) {
            None => kept.push(conversation),
            Some(Rejection::Archived) => outcome.excluded_archived += 1,
            Some(Rejection::UnknownTime) => outcome.excluded_unknown_time += 1,
            Some(Rejection::OutOfRange) => outcome.excluded_out_of_range += 1,
            Some(Rejection::Empty) => outcome.excluded_empty += 1,
        }
    }

    outcome.matched = kept.len();
    debug!(
        matched = outcome.matched,
        archived = outcome.excluded_archived,
        unknown_time = outcome.excluded_unknown_time,
        out_of_range = outcome.excluded_out_of_range,
        empty = outcome.excluded_empty,
        "Applied catalog filter"
    );
    (kept, outcome)
}

/// Filtered conversations, most recent first, truncated to `limit` when given
///
/// `outcome.matched` counts every accepted conversation, including those cut by the limit.
pub fn list_filtered<'a>(
    conversations: &'a [Conversation],
    filter: &CatalogFilter,
    limit: Option<usize>,
) -> (Vec<&'a Conversation>, FilterOutcome) {
    let (mut kept, outcome) = apply_filter(conversations, filter);
    sort_most_recent_first(&mut kept);
    if let Some(limit) = limit {
        kept.truncate(limit);
    }
    (kept, outcome)
}

/// Stable sort by `created_at` descending with unknown timestamps last
pub fn sort_most_recent_first(conversations: &mut [&Conversation]) {
    conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
