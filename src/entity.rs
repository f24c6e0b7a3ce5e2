//! Entity payloads and the spans that anchor them to a query.

use crate::error::Result;
use crate::form::TextForm;
use crate::query::Query;
use crate::span::Span;
use crate::Confidence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved type prefix marking an entity as system-recognized.
pub const SYSTEM_ENTITY_PREFIX: &str = "sys:";

/// The payload attached to an annotated span: what the text range *means*.
///
/// Immutable after construction and owned by exactly one
/// [`QueryEntity`] (or held transiently by a recognizer before being
/// anchored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The type of entity, e.g. `"city"` or `"sys:number"`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// The role the entity plays in its query, when one applies.
    pub role: Option<String>,
    /// The resolved value of the entity, opaque to this crate.
    pub value: Option<serde_json::Value>,
    /// A human readable representation for natural language responses.
    pub display_text: Option<String>,
    /// Recognizer confidence, when one was assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Entity {
    /// Create an entity of the given type with no other fields set.
    #[must_use]
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            role: None,
            value: None,
            display_text: None,
            confidence: None,
        }
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the resolved value.
    #[must_use]
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the display text.
    #[must_use]
    pub fn with_display_text(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = Some(display_text.into());
        self
    }

    /// Set the confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Whether the type carries the reserved `sys:` prefix.
    #[must_use]
    pub fn is_system_entity(&self) -> bool {
        self.entity_type.starts_with(SYSTEM_ENTITY_PREFIX)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_text {
            Some(display) => write!(f, "{} ({})", display, self.entity_type),
            None => f.write_str(&self.entity_type),
        }
    }
}

/// An entity anchored to a query: one text snippet, one character span and
/// one token span per text form, all mutually consistent.
///
/// Constructed from a span in a single known form — raw or normalized — with
/// the other two derived through the query's index maps. Immutable after
/// construction; the conflict resolver only keeps or discards whole
/// instances.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEntity {
    texts: [String; 3],
    spans: [Span; 3],
    token_spans: [Span; 3],
    entity: Entity,
}

impl QueryEntity {
    /// Anchor `entity` at a character span of the query's raw text.
    ///
    /// The processed and normalized spans are derived through the query's
    /// maps; a failed translation at either hop fails the whole
    /// construction.
    pub fn from_raw_span(query: &Query, entity: Entity, span: Span) -> Result<Self> {
        let processed = query.transform_span(span, TextForm::Raw, TextForm::Processed)?;
        let normalized = query.transform_span(span, TextForm::Raw, TextForm::Normalized)?;
        Ok(Self::assemble(query, entity, [span, processed, normalized]))
    }

    /// Anchor `entity` at a character span of the query's normalized text.
    ///
    /// The processed and raw spans are derived through the inverse maps.
    pub fn from_normalized_span(query: &Query, entity: Entity, span: Span) -> Result<Self> {
        let processed = query.transform_span(span, TextForm::Normalized, TextForm::Processed)?;
        let raw = query.transform_span(span, TextForm::Normalized, TextForm::Raw)?;
        Ok(Self::assemble(query, entity, [raw, processed, span]))
    }

    fn assemble(query: &Query, entity: Entity, spans: [Span; 3]) -> Self {
        let texts =
            TextForm::ALL.map(|form| spans[form.index()].extract(query.text(form)).to_string());
        let token_spans =
            TextForm::ALL.map(|form| token_span(query.text(form), spans[form.index()]));
        Self {
            texts,
            spans,
            token_spans,
            entity,
        }
    }

    /// The entity payload.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// The text snippet covered in a form.
    #[must_use]
    pub fn text(&self, form: TextForm) -> &str {
        &self.texts[form.index()]
    }

    /// The character span covered in a form.
    #[must_use]
    pub fn span(&self, form: TextForm) -> Span {
        self.spans[form.index()]
    }

    /// The whitespace-token index span covered in a form.
    #[must_use]
    pub fn token_span(&self, form: TextForm) -> Span {
        self.token_spans[form.index()]
    }
}

impl fmt::Display for QueryEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = &self.entity;
        write!(f, "{}", entity.entity_type)?;
        if let Some(role) = &entity.role {
            write!(f, ":{role}")?;
        }
        write!(
            f,
            " '{}' {}",
            self.text(TextForm::Raw),
            self.span(TextForm::Raw)
        )
    }
}

impl Serialize for QueryEntity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct Projection<'a> {
            #[serde(flatten)]
            entity: &'a Entity,
            text: &'a str,
            span: Span,
        }

        Projection {
            entity: &self.entity,
            text: self.text(TextForm::Raw),
            span: self.span(TextForm::Raw),
        }
        .serialize(serializer)
    }
}

/// Convert a character span to a whitespace-token index span against the
/// text it was sliced from.
///
/// `token_start` counts the tokens fully before the span; `token_end` is
/// `token_start - 1 + tokens inside the span`, saturating at 0. Span
/// boundaries are assumed to fall on token boundaries; a span splitting a
/// token produces a degenerate range rather than an error.
fn token_span(full_text: &str, span: Span) -> Span {
    let prefix = if span.start == 0 {
        ""
    } else {
        Span::new(0, span.start - 1).extract(full_text)
    };
    let span_text = span.extract(full_text);
    let start = prefix.split_whitespace().count();
    let end = (start + span_text.split_whitespace().count()).saturating_sub(1);
    Span::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_map::CharMapTable;
    use crate::pipeline::Token;

    fn identity_query(text: &str) -> Query {
        let tokens = text.split_whitespace().map(Token::new).collect();
        Query::new(text, text, tokens, CharMapTable::new())
    }

    #[test]
    fn system_prefix_is_derived() {
        assert!(Entity::new("sys:number").is_system_entity());
        assert!(!Entity::new("number").is_system_entity());
        assert!(!Entity::new("system").is_system_entity());
    }

    #[test]
    fn from_raw_span_slices_every_form() {
        let query = identity_query("play the white album");
        let entity = Entity::new("album");
        let anchored = QueryEntity::from_raw_span(&query, entity, Span::new(9, 19)).unwrap();

        for form in TextForm::ALL {
            assert_eq!(anchored.text(form), "white album");
            assert_eq!(anchored.span(form), Span::new(9, 19));
            assert_eq!(anchored.token_span(form), Span::new(2, 3));
        }
    }

    #[test]
    fn from_normalized_span_matches_raw_construction() {
        let query = identity_query("play the white album");
        let from_raw =
            QueryEntity::from_raw_span(&query, Entity::new("album"), Span::new(9, 19)).unwrap();
        let from_norm =
            QueryEntity::from_normalized_span(&query, Entity::new("album"), Span::new(9, 19))
                .unwrap();
        assert_eq!(from_raw, from_norm);
    }

    #[test]
    fn token_span_at_text_start() {
        let query = identity_query("white album please");
        let anchored =
            QueryEntity::from_raw_span(&query, Entity::new("album"), Span::new(0, 10)).unwrap();
        assert_eq!(anchored.token_span(TextForm::Raw), Span::new(0, 1));
    }

    #[test]
    fn display_includes_role_when_present() {
        let query = identity_query("to boston");
        let entity = Entity::new("city").with_role("destination");
        let anchored = QueryEntity::from_raw_span(&query, entity, Span::new(3, 8)).unwrap();
        assert_eq!(format!("{anchored}"), "city:destination 'boston' 3-8");
    }

    #[test]
    fn serialization_merges_entity_text_and_span() {
        let query = identity_query("meet at 5");
        let entity = Entity::new("sys:number")
            .with_value(serde_json::json!(5))
            .with_confidence(Confidence::new(0.9).unwrap());
        let anchored = QueryEntity::from_raw_span(&query, entity, Span::new(8, 8)).unwrap();

        let json = serde_json::to_value(&anchored).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "sys:number",
                "role": null,
                "value": 5,
                "display_text": null,
                "confidence": 0.9,
                "text": "5",
                "span": {"start": 8, "end": 8},
            })
        );
    }

    #[test]
    fn confidence_omitted_from_projection_when_absent() {
        let query = identity_query("meet at 5");
        let anchored =
            QueryEntity::from_raw_span(&query, Entity::new("sys:number"), Span::new(8, 8)).unwrap();
        let json = serde_json::to_value(&anchored).unwrap();
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn off_boundary_span_degenerates_instead_of_panicking() {
        // span covers only part of "album": token counts still derived
        let query = identity_query("white album");
        let anchored =
            QueryEntity::from_raw_span(&query, Entity::new("album"), Span::new(6, 8)).unwrap();
        assert_eq!(anchored.text(TextForm::Raw), "alb");
        assert_eq!(anchored.token_span(TextForm::Raw), Span::new(1, 1));
    }
}
