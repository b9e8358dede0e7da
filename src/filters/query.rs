//! Search query parser.
//!
//! # Syntax
//!
//! ```text
//! query   := (keyword | phrase)+
//! keyword := non-whitespace run without '"'
//! phrase  := '"' any text except '"' '"'
//! ```
//!
//! Every term must match for a conversation to be returned.
//!
//! ```rust
//! # use cursor_history_explorer::filters::query::parse_search_query;
//! # use cursor_history_explorer::models::TermKind;
//! let query = parse_search_query("\"user auth\" login").unwrap();
//! assert_eq!(query.terms()[0].kind, TermKind::Phrase);
//! assert_eq!(query.terms()[0].text, "user auth");
//! assert_eq!(query.terms()[1].text, "login");
//! ```

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, Result};
use crate::models::{SearchQuery, SearchTerm};

/// Parse a raw query string into an AND-combined [`SearchQuery`]
///
/// Fails with [`Error::InvalidQuery`] when no terms remain or a quote is left open.
pub fn parse_search_query(input: &str) -> Result<SearchQuery> {
    let terms = tokenize(input)?;
    if terms.is_empty() {
        return Err(Error::InvalidQuery(format!("no search terms in '{}'", input)));
    }
    SearchQuery::new(terms)
}

fn tokenize(input: &str) -> Result<Vec<SearchTerm>> {
    let mut terms = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch == '"' {
            chars.next();
            let phrase = read_quoted(&mut chars)?;
            // `""` and `"   "` carry nothing to match
            if !phrase.trim().is_empty() {
                terms.push(SearchTerm::phrase(phrase));
            }
            continue;
        }

        terms.push(SearchTerm::keyword(read_word(&mut chars)));
    }

    Ok(terms)
}

/// Read until whitespace or the start of a phrase
fn read_word(chars: &mut Peekable<Chars>) -> String {
    let mut word = String::new();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() || ch == '"' {
            break;
        }
        word.push(ch);
        chars.next();
    }

    word
}

/// Read up to the closing quote, which is consumed
fn read_quoted(chars: &mut Peekable<Chars>) -> Result<String> {
    let mut value = String::new();

    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }

    Err(Error::InvalidQuery(format!("unterminated quoted phrase \"{}", value)))
}
