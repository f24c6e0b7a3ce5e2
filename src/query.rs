//! The multi-form query text and its span translation surface.
//!
//! A [`Query`] stores one unit of user text in its three parallel forms and
//! translates character indices and spans between any pair of them by
//! composing per-hop index maps. Keeping one map per adjacent pair (rather
//! than a combined raw↔normalized table) keeps the preprocessor and the
//! tokenizer fully decoupled: each only reports a correspondence with its
//! immediate neighbor form, and the query composes them lazily at
//! translation time.

use crate::entity::QueryEntity;
use crate::error::{Error, Result};
use crate::form::{Direction, TextForm};
use crate::index_map::{CharMapTable, MapSlot};
use crate::pipeline::Token;
use crate::span::Span;
use serde::Serialize;

/// One unit of user text in its raw, processed and normalized forms.
///
/// Built once per input (usually through
/// [`QueryFactory`](crate::QueryFactory)) and read-only afterward, except for
/// the one-time attachment of system-entity candidates which consumes and
/// returns the query.
///
/// The normalized text is always derived by joining the normalized tokens
/// with single spaces; it is never supplied independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    texts: [String; 3],
    normalized_tokens: Vec<Token>,
    char_maps: CharMapTable,
    system_entity_candidates: Vec<QueryEntity>,
}

impl Query {
    /// Create a query from its raw text, processed text, normalized tokens
    /// and index maps.
    #[must_use]
    pub fn new(
        raw_text: impl Into<String>,
        processed_text: impl Into<String>,
        normalized_tokens: Vec<Token>,
        char_maps: CharMapTable,
    ) -> Self {
        let normalized_text = normalized_tokens
            .iter()
            .map(Token::entity)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            texts: [raw_text.into(), processed_text.into(), normalized_text],
            normalized_tokens,
            char_maps,
            system_entity_candidates: Vec::new(),
        }
    }

    /// Attach the system-entity candidates proposed by a recognizer.
    ///
    /// Called exactly once, at construction time, by the factory. Consuming
    /// the query makes the one-time contract structural: there is no way to
    /// mutate the candidate list of a shared query.
    #[must_use]
    pub fn with_system_entity_candidates(mut self, candidates: Vec<QueryEntity>) -> Self {
        self.system_entity_candidates = candidates;
        self
    }

    /// The stored text for a form.
    #[must_use]
    pub fn text(&self, form: TextForm) -> &str {
        &self.texts[form.index()]
    }

    /// The verbatim input text.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        self.text(TextForm::Raw)
    }

    /// The input text after preprocessing.
    #[must_use]
    pub fn processed_text(&self) -> &str {
        self.text(TextForm::Processed)
    }

    /// The normalized text (tokens joined by single spaces).
    #[must_use]
    pub fn normalized_text(&self) -> &str {
        self.text(TextForm::Normalized)
    }

    /// The normalized tokens the normalized text was built from.
    #[must_use]
    pub fn normalized_tokens(&self) -> &[Token] {
        &self.normalized_tokens
    }

    /// All attached system-entity candidates.
    #[must_use]
    pub fn system_entity_candidates(&self) -> &[QueryEntity] {
        &self.system_entity_candidates
    }

    /// The attached system-entity candidates whose entity type is one of
    /// `types`.
    #[must_use]
    pub fn system_entity_candidates_of(&self, types: &[&str]) -> Vec<&QueryEntity> {
        self.system_entity_candidates
            .iter()
            .filter(|candidate| types.contains(&candidate.entity().entity_type.as_str()))
            .collect()
    }

    /// Translate a character index one hop upward (toward the normalized
    /// form).
    ///
    /// Fails with [`Error::UnsupportedForm`] from `Normalized`, and with
    /// [`Error::InvalidIndex`] when a map is registered for the hop but has
    /// no entry for `index`. An unregistered hop translates as identity.
    pub fn promote_index(&self, index: usize, form: TextForm) -> Result<usize> {
        let next = form
            .promoted()
            .ok_or_else(|| Error::unsupported_form(form, Direction::Upward))?;
        self.hop(index, form, next)
    }

    /// Translate a character index one hop downward (toward the raw form).
    ///
    /// Fails with [`Error::UnsupportedForm`] from `Raw`, and with
    /// [`Error::InvalidIndex`] when a map is registered for the hop but has
    /// no entry for `index`. An unregistered hop translates as identity.
    pub fn demote_index(&self, index: usize, form: TextForm) -> Result<usize> {
        let next = form
            .demoted()
            .ok_or_else(|| Error::unsupported_form(form, Direction::Downward))?;
        self.hop(index, form, next)
    }

    /// Translate a character index from one form to another.
    ///
    /// Walks one hop at a time along the form ordering, so a raw↔normalized
    /// translation always composes both maps through the processed form. A
    /// failure at either hop aborts the whole translation; no partial result
    /// is produced. `transform_index(i, f, f)` is always `Ok(i)`.
    pub fn transform_index(
        &self,
        index: usize,
        form_in: TextForm,
        form_out: TextForm,
    ) -> Result<usize> {
        let mut index = index;
        let mut form = form_in;
        while form < form_out {
            let next = form
                .promoted()
                .ok_or_else(|| Error::unsupported_form(form, Direction::Upward))?;
            index = self.hop(index, form, next)?;
            form = next;
        }
        while form > form_out {
            let next = form
                .demoted()
                .ok_or_else(|| Error::unsupported_form(form, Direction::Downward))?;
            index = self.hop(index, form, next)?;
            form = next;
        }
        Ok(index)
    }

    /// Translate a span from one form to another.
    ///
    /// `start` and `end` are translated independently. The result is not
    /// re-validated: if the underlying maps are not order-preserving the
    /// translated span may come back with `end < start`, and callers must
    /// tolerate that shape.
    pub fn transform_span(&self, span: Span, form_in: TextForm, form_out: TextForm) -> Result<Span> {
        Ok(Span::new(
            self.transform_index(span.start, form_in, form_out)?,
            self.transform_index(span.end, form_in, form_out)?,
        ))
    }

    fn hop(&self, index: usize, from: TextForm, to: TextForm) -> Result<usize> {
        let map = MapSlot::between(from, to).and_then(|slot| self.char_maps.get(slot));
        match map {
            // no map registered -> the two forms correspond 1:1
            None => Ok(index),
            Some(map) => map
                .get(index)
                .ok_or_else(|| Error::invalid_index(index, from, to)),
        }
    }
}

/// A query together with the metadata that has been labeled or predicted
/// for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    /// The underlying query.
    pub query: Query,
    /// The domain of the query, when known.
    pub domain: Option<String>,
    /// The intent of the query, when known.
    pub intent: Option<String>,
    /// The resolved entities present in the query.
    pub entities: Vec<QueryEntity>,
    /// Whether the details were human labeled rather than predicted.
    pub is_gold: bool,
}

impl ProcessedQuery {
    /// Wrap a query with no metadata yet.
    #[must_use]
    pub fn new(query: Query) -> Self {
        Self {
            query,
            domain: None,
            intent: None,
            entities: Vec::new(),
            is_gold: false,
        }
    }

    /// Set the domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the intent.
    #[must_use]
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Set the entities.
    #[must_use]
    pub fn with_entities(mut self, entities: Vec<QueryEntity>) -> Self {
        self.entities = entities;
        self
    }

    /// Mark the metadata as human labeled.
    #[must_use]
    pub fn gold(mut self) -> Self {
        self.is_gold = true;
        self
    }
}

impl Serialize for ProcessedQuery {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct Projection<'a> {
            text: &'a str,
            domain: Option<&'a str>,
            intent: Option<&'a str>,
            entities: &'a [QueryEntity],
        }

        Projection {
            text: self.query.raw_text(),
            domain: self.domain.as_deref(),
            intent: self.intent.as_deref(),
            entities: &self.entities,
        }
        .serialize(serializer)
    }
}
