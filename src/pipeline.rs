//! Collaborator contracts for building queries, plus basic reference
//! implementations.
//!
//! The core never preprocesses, tokenizes or detects entities itself — it
//! consumes the results through these traits. Each collaborator only reports
//! a correspondence with its immediate neighbor form; the query composes the
//! hops.
//!
//! The implementations shipped here are deliberately simple: whitespace
//! collapsing, whitespace tokenization with ASCII lowercasing, and a few
//! format-based `sys:` patterns. They make the factory pipeline usable and
//! testable without an external NLP stack; production systems substitute
//! their own.

use crate::entity::{Entity, QueryEntity};
use crate::error::Result;
use crate::index_map::CharIndexMap;
use crate::query::Query;
use crate::span::Span;
use crate::{Confidence, TextForm};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One normalized token reported by a tokenizer.
///
/// A defined record rather than a loose dictionary so the contract can grow
/// fields without breaking implementers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    entity: String,
}

impl Token {
    /// Create a token from its normalized surface.
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }

    /// The normalized surface of the token.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }
}

/// Rewrites raw text into processed text and reports the character
/// correspondence.
pub trait Preprocessor: Send + Sync {
    /// Produce the processed form of `raw_text`.
    fn process(&self, raw_text: &str) -> String;

    /// The (forward, backward) character index maps between the raw and
    /// processed forms. `None` means the correspondence is 1:1.
    fn char_index_map(
        &self,
        raw_text: &str,
        processed_text: &str,
    ) -> (Option<CharIndexMap>, Option<CharIndexMap>);
}

/// Splits processed text into normalized tokens and reports the character
/// correspondence with the normalized form.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text` into normalized tokens.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Normalize `text` without keeping the token structure.
    fn normalize(&self, text: &str) -> String;

    /// The (forward, backward) character index maps between the processed
    /// and normalized forms. `None` means the correspondence is 1:1.
    fn char_index_map(
        &self,
        processed_text: &str,
        normalized_text: &str,
    ) -> (Option<CharIndexMap>, Option<CharIndexMap>);
}

/// Proposes system-entity candidates for a freshly built query.
///
/// Invoked exactly once per query construction.
pub trait SystemEntityRecognizer: Send + Sync {
    /// Candidate entities found in `query`.
    fn candidates(&self, query: &Query) -> Result<Vec<QueryEntity>>;
}

/// Preprocessor that trims the text and collapses whitespace runs to single
/// spaces.
///
/// The reported forward map is genuinely partial: trimmed characters and the
/// tail of each collapsed run have no entry, so translating their indices
/// fails rather than silently guessing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespacePreprocessor;

impl Preprocessor for WhitespacePreprocessor {
    fn process(&self, raw_text: &str) -> String {
        raw_text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn char_index_map(
        &self,
        raw_text: &str,
        processed_text: &str,
    ) -> (Option<CharIndexMap>, Option<CharIndexMap>) {
        if raw_text == processed_text {
            return (None, None);
        }
        let mut forward = CharIndexMap::new();
        let mut backward = CharIndexMap::new();
        let mut out = 0usize;
        let mut run_start: Option<usize> = None;
        let mut seen_token = false;
        for (i, ch) in raw_text.chars().enumerate() {
            if ch.is_whitespace() {
                if run_start.is_none() {
                    run_start = Some(i);
                }
                continue;
            }
            if let Some(ws) = run_start.take() {
                // the first whitespace char of an inner run survives as the
                // single separating space
                if seen_token {
                    forward.insert(ws, out);
                    backward.insert(out, ws);
                    out += 1;
                }
            }
            seen_token = true;
            forward.insert(i, out);
            backward.insert(out, i);
            out += 1;
        }
        (Some(forward), Some(backward))
    }
}

/// Tokenizer that splits on whitespace and ASCII-lowercases each token.
///
/// ASCII lowercasing never changes a token's character count, which keeps
/// the processed↔normalized correspondence per-character.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .map(|token| Token::new(token.to_ascii_lowercase()))
            .collect()
    }

    fn normalize(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| token.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn char_index_map(
        &self,
        processed_text: &str,
        normalized_text: &str,
    ) -> (Option<CharIndexMap>, Option<CharIndexMap>) {
        if processed_text == normalized_text {
            return (None, None);
        }
        // (char start, char length) of each token in the processed text
        let mut tokens: Vec<(usize, usize)> = Vec::new();
        let mut start: Option<usize> = None;
        let mut len = 0usize;
        for (i, ch) in processed_text.chars().enumerate() {
            if ch.is_whitespace() {
                if let Some(s) = start.take() {
                    tokens.push((s, len));
                }
                len = 0;
            } else {
                if start.is_none() {
                    start = Some(i);
                }
                len += 1;
            }
        }
        if let Some(s) = start {
            tokens.push((s, len));
        }

        let mut forward = CharIndexMap::new();
        let mut backward = CharIndexMap::new();
        let mut norm_pos = 0usize;
        let mut prev_end: Option<usize> = None;
        for (t, &(token_start, token_len)) in tokens.iter().enumerate() {
            if t > 0 {
                if let Some(gap) = prev_end {
                    forward.insert(gap, norm_pos);
                    backward.insert(norm_pos, gap);
                }
                norm_pos += 1;
            }
            for k in 0..token_len {
                forward.insert(token_start + k, norm_pos + k);
                backward.insert(norm_pos + k, token_start + k);
            }
            norm_pos += token_len;
            prev_end = Some(token_start + token_len);
        }
        (Some(forward), Some(backward))
    }
}

/// Recognizer that never proposes candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl SystemEntityRecognizer for NullRecognizer {
    fn candidates(&self, _query: &Query) -> Result<Vec<QueryEntity>> {
        Ok(Vec::new())
    }
}

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});
static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?\s*%").expect("percent pattern is valid"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("number pattern is valid"));

/// Recognizer for entities identifiable by their format alone:
/// `sys:email`, `sys:percent` and `sys:number`.
///
/// Patterns are checked most-specific first and a span claimed by an earlier
/// pattern suppresses later matches that touch it, so `"15%"` yields one
/// `sys:percent` rather than a percent plus a nested number.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRecognizer;

impl SystemEntityRecognizer for PatternRecognizer {
    fn candidates(&self, query: &Query) -> Result<Vec<QueryEntity>> {
        let text = query.raw_text();
        let mut found: Vec<QueryEntity> = Vec::new();

        let passes: [(&Regex, &str, f64); 3] = [
            (&*EMAIL, "sys:email", 0.98),
            (&*PERCENT, "sys:percent", 0.95),
            (&*NUMBER, "sys:number", 0.9),
        ];
        for (pattern, entity_type, confidence) in passes {
            for m in pattern.find_iter(text) {
                let span = byte_to_char_span(text, m.start(), m.end());
                if found
                    .iter()
                    .any(|candidate| candidate.span(TextForm::Raw).intersects(&span))
                {
                    continue;
                }
                let entity = Entity::new(entity_type)
                    .with_display_text(m.as_str())
                    .with_value(resolve_value(entity_type, m.as_str()))
                    .with_confidence(Confidence::saturating(confidence));
                found.push(QueryEntity::from_raw_span(query, entity, span)?);
            }
        }
        Ok(found)
    }
}

fn resolve_value(entity_type: &str, matched: &str) -> serde_json::Value {
    match entity_type {
        "sys:number" => matched
            .parse::<f64>()
            .map_or_else(|_| serde_json::json!(matched), |n| serde_json::json!(n)),
        "sys:percent" => {
            let numeric = matched.trim_end_matches('%').trim_end();
            numeric
                .parse::<f64>()
                .map_or_else(|_| serde_json::json!(matched), |n| serde_json::json!(n))
        }
        _ => serde_json::json!(matched),
    }
}

/// Convert a regex byte range into an inclusive character span.
fn byte_to_char_span(text: &str, byte_start: usize, byte_end: usize) -> Span {
    let char_start = text[..byte_start].chars().count();
    let char_end = text[..byte_end].chars().count();
    Span::new(char_start, char_end.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_map::CharMapTable;

    #[test]
    fn preprocessor_collapses_whitespace() {
        let pre = WhitespacePreprocessor;
        assert_eq!(pre.process("  Pay   50  "), "Pay 50");
        assert_eq!(pre.process("already clean"), "already clean");
    }

    #[test]
    fn preprocessor_identity_when_clean() {
        let pre = WhitespacePreprocessor;
        let (forward, backward) = pre.char_index_map("already clean", "already clean");
        assert!(forward.is_none());
        assert!(backward.is_none());
    }

    #[test]
    fn preprocessor_maps_are_partial() {
        let pre = WhitespacePreprocessor;
        let raw = "  Pay   50  ";
        let processed = pre.process(raw);
        let (forward, backward) = pre.char_index_map(raw, &processed);
        let forward = forward.unwrap();
        let backward = backward.unwrap();

        // 'P' at raw 2 -> processed 0; '5' at raw 8 -> processed 4
        assert_eq!(forward.get(2), Some(0));
        assert_eq!(forward.get(8), Some(4));
        // first char of the inner run survives as the separator
        assert_eq!(forward.get(5), Some(3));
        // trimmed and collapsed characters have no entry
        assert_eq!(forward.get(0), None);
        assert_eq!(forward.get(6), None);
        assert_eq!(forward.get(10), None);

        // backward map covers every processed index
        for i in 0..processed.chars().count() {
            assert!(backward.get(i).is_some(), "processed index {i} unmapped");
        }
    }

    #[test]
    fn tokenizer_lowercases_tokens() {
        let tokenizer = WhitespaceTokenizer;
        let tokens = tokenizer.tokenize("Play The WHITE Album");
        let surfaces: Vec<&str> = tokens.iter().map(Token::entity).collect();
        assert_eq!(surfaces, vec!["play", "the", "white", "album"]);
        assert_eq!(tokenizer.normalize("Play The WHITE Album"), "play the white album");
    }

    #[test]
    fn tokenizer_maps_align_token_characters() {
        let tokenizer = WhitespaceTokenizer;
        let processed = "Pay BOB";
        let normalized = tokenizer.normalize(processed);
        let (forward, backward) = tokenizer.char_index_map(processed, &normalized);
        let forward = forward.unwrap();
        let backward = backward.unwrap();

        for i in 0..processed.chars().count() {
            assert_eq!(forward.get(i), Some(i));
            assert_eq!(backward.get(i), Some(i));
        }
    }

    #[test]
    fn tokenizer_identity_when_already_normalized() {
        let tokenizer = WhitespaceTokenizer;
        let (forward, backward) = tokenizer.char_index_map("pay bob", "pay bob");
        assert!(forward.is_none());
        assert!(backward.is_none());
    }

    #[test]
    fn pattern_recognizer_finds_formats() {
        let text = "send 15% of 200 to bob@example.com";
        let tokens = WhitespaceTokenizer.tokenize(text);
        let query = Query::new(text, text, tokens, CharMapTable::new());
        let candidates = PatternRecognizer.candidates(&query).unwrap();

        let types: Vec<&str> = candidates
            .iter()
            .map(|c| c.entity().entity_type.as_str())
            .collect();
        assert!(types.contains(&"sys:percent"));
        assert!(types.contains(&"sys:number"));
        assert!(types.contains(&"sys:email"));

        // "15%" is one percent candidate, not a percent plus a nested number
        let percent = candidates
            .iter()
            .find(|c| c.entity().entity_type == "sys:percent")
            .unwrap();
        assert_eq!(percent.text(TextForm::Raw), "15%");
        let numbers: Vec<&QueryEntity> = candidates
            .iter()
            .filter(|c| c.entity().entity_type == "sys:number")
            .collect();
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0].text(TextForm::Raw), "200");
    }

    #[test]
    fn pattern_recognizer_resolves_values() {
        let text = "about 12.5";
        let tokens = WhitespaceTokenizer.tokenize(text);
        let query = Query::new(text, text, tokens, CharMapTable::new());
        let candidates = PatternRecognizer.candidates(&query).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].entity().value,
            Some(serde_json::json!(12.5))
        );
        assert!(candidates[0].entity().is_system_entity());
    }

    #[test]
    fn byte_to_char_span_handles_multibyte_prefix() {
        // "café " is 5 chars but 6 bytes; "42" starts at byte 6, char 5
        let text = "café 42";
        let m = NUMBER.find(text).unwrap();
        assert_eq!(byte_to_char_span(text, m.start(), m.end()), Span::new(5, 6));
    }

    #[test]
    fn null_recognizer_is_empty() {
        let query = Query::new("x", "x", vec![Token::new("x")], CharMapTable::new());
        assert!(NullRecognizer.candidates(&query).unwrap().is_empty());
    }
}
