use serde::Serialize;

use crate::models::Conversation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    /// Quoted input, matched as one contiguous substring
    Phrase,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTerm {
    pub kind: TermKind,
    pub text: String,
}

impl SearchTerm {
    pub fn keyword(text: impl Into<String>) -> Self {
        Self { kind: TermKind::Keyword, text: text.into() }
    }

    pub fn phrase(text: impl Into<String>) -> Self {
        Self { kind: TermKind::Phrase, text: text.into() }
    }
}

/// Ordered list of terms combined with AND
///
/// Construct through [`crate::filters::query::parse_search_query`] or
/// [`SearchQuery::new`]; both reject an empty term list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    terms: Vec<SearchTerm>,
}

impl SearchQuery {
    pub fn new(terms: Vec<SearchTerm>) -> crate::Result<Self> {
        if terms.is_empty() || terms.iter().any(|t| t.text.trim().is_empty()) {
            return Err(crate::Error::InvalidQuery("query contains no search terms".to_string()));
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }
}

/// Searchable fields, in display priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
    Title,
    Subtitle,
    Preview,
    MessageText,
    Diff,
}

/// Where one query term was first found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub term: String,
    pub field: MatchedField,
    /// Set for message text and message diff matches
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub conversation: Conversation,
    pub matches: Vec<FieldMatch>,
}

impl SearchHit {
    /// Distinct matched fields in priority order
    pub fn matched_fields(&self) -> Vec<MatchedField> {
        let mut fields: Vec<MatchedField> = self.matches.iter().map(|m| m.field).collect();
        fields.sort();
        fields.dedup();
        fields
    }
}
