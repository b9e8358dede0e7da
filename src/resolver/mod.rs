//! Resolve a user-supplied identifier or title to one conversation.
//!
//! Tiers are tried in order and the first tier with any match decides:
//!
//! 1. exact identifier
//! 2. identifier prefix
//! 3. title, case-insensitive substring
//! 4. subtitle, case-insensitive substring
//!
//! Within the title and subtitle tiers, exact equality beats starts-with, which beats
//! contains. A tier whose best rank holds more than one conversation is reported as
//! [`Resolution::Ambiguous`]; the resolver never picks among ties.

use serde::Serialize;
use tracing::debug;

use crate::filters::{CatalogFilter, apply_filter, sort_most_recent_first};
use crate::models::Conversation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "conversations", rename_all = "snake_case")]
pub enum Resolution {
    Found(Conversation),
    /// Candidates at the winning rank, most recent first
    Ambiguous(Vec<Conversation>),
    NotFound,
}

impl Resolution {
    pub fn found(self) -> Option<Conversation> {
        match self {
            Self::Found(conversation) => Some(conversation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TextRank {
    Exact,
    StartsWith,
    Contains,
}

fn rank_text(haystack: &str, needle_lower: &str) -> Option<TextRank> {
    let haystack = haystack.to_lowercase();
    if haystack == needle_lower {
        Some(TextRank::Exact)
    } else if haystack.starts_with(needle_lower) {
        Some(TextRank::StartsWith)
    } else if haystack.contains(needle_lower) {
        Some(TextRank::Contains)
    } else {
        None
    }
}

/// Resolve `query` against the conversations accepted by `filter`
pub fn resolve(conversations: &[Conversation], query: &str, filter: &CatalogFilter) -> Resolution {
    let query = query.trim();
    if query.is_empty() {
        return Resolution::NotFound;
    }

    let (candidates, _) = apply_filter(conversations, filter);

    if let Some(exact) = candidates.iter().find(|c| c.id == query) {
        debug!(id = %exact.id, "Resolved by exact identifier");
        return Resolution::Found((*exact).clone());
    }

    let by_prefix: Vec<&Conversation> = candidates.iter().copied().filter(|c| c.id.starts_with(query)).collect();
    if !by_prefix.is_empty() {
        debug!(matches = by_prefix.len(), "Resolved by identifier prefix");
        return settle(by_prefix);
    }

    let needle = query.to_lowercase();
    if let Some(matches) = best_ranked(&candidates, |c| Some(c.title.as_str()), &needle) {
        debug!(matches = matches.len(), "Resolved by title");
        return settle(matches);
    }
    if let Some(matches) = best_ranked(&candidates, |c| c.subtitle.as_deref(), &needle) {
        debug!(matches = matches.len(), "Resolved by subtitle");
        return settle(matches);
    }

    Resolution::NotFound
}

/// Conversations sharing the best rank on one text field, or `None` if nothing matched
fn best_ranked<'a, F>(candidates: &[&'a Conversation], field: F, needle: &str) -> Option<Vec<&'a Conversation>>
where
    F: Fn(&Conversation) -> Option<&str>,
{
    let ranked: Vec<(TextRank, &'a Conversation)> = candidates
        .iter()
        .filter_map(|c| field(c).and_then(|text| rank_text(text, needle)).map(|rank| (rank, *c)))
        .collect();

    let best = ranked.iter().map(|(rank, _)| *rank).min()?;
    Some(ranked.into_iter().filter(|(rank, _)| *rank == best).map(|(_, c)| c).collect())
}

fn settle(mut matches: Vec<&Conversation>) -> Resolution {
    match matches.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Found(matches[0].clone()),
        _ => {
            sort_most_recent_first(&mut matches);
            Resolution::Ambiguous(matches.into_iter().cloned().collect())
        }
    }
}
