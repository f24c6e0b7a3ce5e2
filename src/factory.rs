//! Query construction from collaborator components.

use crate::error::Result;
use crate::index_map::{CharMapTable, MapSlot};
use crate::pipeline::{Preprocessor, SystemEntityRecognizer, Token, Tokenizer};
use crate::query::Query;
use std::fmt;

/// Builds [`Query`] values by composing a preprocessor, a tokenizer and a
/// system-entity recognizer.
///
/// The factory owns the wiring: it collects each collaborator's index maps
/// into the query's map table and attaches the recognizer's candidates
/// exactly once, at construction time.
///
/// # Example
///
/// ```rust
/// use textform::{NullRecognizer, QueryFactory, WhitespacePreprocessor, WhitespaceTokenizer};
///
/// let factory = QueryFactory::new(Box::new(WhitespaceTokenizer), Box::new(NullRecognizer))
///     .with_preprocessor(Box::new(WhitespacePreprocessor));
///
/// let query = factory.create_query("Play  The White Album").unwrap();
/// assert_eq!(query.processed_text(), "Play The White Album");
/// assert_eq!(query.normalized_text(), "play the white album");
/// ```
pub struct QueryFactory {
    preprocessor: Option<Box<dyn Preprocessor>>,
    tokenizer: Box<dyn Tokenizer>,
    recognizer: Box<dyn SystemEntityRecognizer>,
}

impl QueryFactory {
    /// Create a factory with no preprocessor: the processed text equals the
    /// raw text.
    #[must_use]
    pub fn new(
        tokenizer: Box<dyn Tokenizer>,
        recognizer: Box<dyn SystemEntityRecognizer>,
    ) -> Self {
        Self {
            preprocessor: None,
            tokenizer,
            recognizer,
        }
    }

    /// Add a preprocessor stage.
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Build a query for the given text.
    ///
    /// Runs the preprocessor (when present), tokenizes, derives the
    /// normalized text from the tokens, registers every reported index map,
    /// and attaches the recognizer's candidates.
    pub fn create_query(&self, text: &str) -> Result<Query> {
        let raw_text = text;
        let mut char_maps = CharMapTable::new();

        let processed_text = match &self.preprocessor {
            Some(preprocessor) => {
                let processed = preprocessor.process(raw_text);
                let (forward, backward) = preprocessor.char_index_map(raw_text, &processed);
                if let Some(map) = forward {
                    char_maps.set(MapSlot::RawToProcessed, map);
                }
                if let Some(map) = backward {
                    char_maps.set(MapSlot::ProcessedToRaw, map);
                }
                processed
            }
            None => raw_text.to_string(),
        };

        let normalized_tokens = self.tokenizer.tokenize(&processed_text);
        let normalized_text = normalized_tokens
            .iter()
            .map(Token::entity)
            .collect::<Vec<_>>()
            .join(" ");
        let (forward, backward) = self
            .tokenizer
            .char_index_map(&processed_text, &normalized_text);
        if let Some(map) = forward {
            char_maps.set(MapSlot::ProcessedToNormalized, map);
        }
        if let Some(map) = backward {
            char_maps.set(MapSlot::NormalizedToProcessed, map);
        }

        let query = Query::new(raw_text, processed_text, normalized_tokens, char_maps);
        let candidates = self.recognizer.candidates(&query)?;
        log::debug!(
            "query {:?}: {} system entity candidate(s)",
            query.raw_text(),
            candidates.len()
        );
        Ok(query.with_system_entity_candidates(candidates))
    }

    /// Normalize text with the factory's tokenizer, outside any query.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        self.tokenizer.normalize(text)
    }
}

impl fmt::Debug for QueryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryFactory")
            .field("preprocessor", &self.preprocessor.is_some())
            .finish_non_exhaustive()
    }
}
