use souq_core::config::SearchSettings;
use souq_core::types::{FieldRef, LanguageConfig, TokenQuery};

use crate::segment::Segment;

/// Shortest word (in chars) kept in a token query.
pub const MIN_TERM_CHARS: usize = 2;

const QUOTES: &[char] = &['\'', '"', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

pub fn normalize_word(word: &str) -> String {
    word.chars().filter(|c| !QUOTES.contains(c)).collect()
}

/// Build a disjunctive prefix query from one segment's text.
///
/// Words are split on whitespace and stripped of quote characters; words
/// shorter than [`MIN_TERM_CHARS`] are dropped. No surviving word yields
/// `TokenQuery::Empty`.
pub fn build(segment: &str, config: LanguageConfig) -> TokenQuery {
    let terms: Vec<String> = segment
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| w.chars().count() >= MIN_TERM_CHARS)
        .collect();
    if terms.is_empty() {
        TokenQuery::Empty
    } else {
        TokenQuery::AnyPrefix { terms, config }
    }
}

/// The title and description pairings for a segment, or nothing when the
/// segment produces an empty query.
pub fn field_queries(segment: &Segment, settings: &SearchSettings) -> Vec<(FieldRef, TokenQuery)> {
    let query = build(&segment.text, segment.script.language_config());
    if query.is_empty() {
        return Vec::new();
    }
    let language = segment.script.language();
    vec![
        (FieldRef::title(language, settings.title_weight), query.clone()),
        (FieldRef::description(language, settings.description_weight), query),
    ]
}
