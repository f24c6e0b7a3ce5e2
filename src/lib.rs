//! # textform
//!
//! One unit of user text, three parallel forms — raw, processed,
//! normalized — with lossless span translation between them and
//! deterministic conflict resolution over the entities annotated on top.
//!
//! - **Translation**: character indices and spans move between forms by
//!   composing per-hop index maps reported by the preprocessor and
//!   tokenizer. An absent map means 1:1; a map without the requested entry
//!   is an error, never a silent guess.
//! - **Annotation**: a [`QueryEntity`] anchors an [`Entity`] payload with an
//!   equivalent text, character span and token span in every form.
//! - **Resolution**: [`ConflictResolver`] collapses nested, duplicated and
//!   overlapping entities into a non-contradictory set with a fixed,
//!   documented scan order.
//!
//! ## Quick start
//!
//! ```rust
//! use textform::prelude::*;
//!
//! let factory = QueryFactory::new(Box::new(WhitespaceTokenizer), Box::new(NullRecognizer))
//!     .with_preprocessor(Box::new(WhitespacePreprocessor));
//!
//! let query = factory.create_query("Send  $20 to  Alice").unwrap();
//! assert_eq!(query.normalized_text(), "send $20 to alice");
//!
//! // "to" sits at raw chars 10-11; find it in the normalized text
//! let span = query
//!     .transform_span(Span::new(10, 11), TextForm::Raw, TextForm::Normalized)
//!     .unwrap();
//! assert_eq!(span, Span::new(9, 10));
//! assert_eq!(span.extract(query.normalized_text()), "to");
//! ```
//!
//! ## Design notes
//!
//! - All operations are synchronous and pure; queries and entities are
//!   immutable once built and safe to share across threads.
//! - The three collaborator traits ([`Preprocessor`], [`Tokenizer`],
//!   [`SystemEntityRecognizer`]) are the only boundary to external NLP
//!   machinery; the shipped implementations are minimal reference ones.

#![warn(missing_docs)]

mod confidence;
mod entity;
mod error;
mod factory;
mod form;
mod index_map;
mod pipeline;
mod query;
mod resolve;
mod span;

pub use confidence::{Confidence, ConfidenceError};
pub use entity::{Entity, QueryEntity, SYSTEM_ENTITY_PREFIX};
pub use error::{Error, Result};
pub use factory::QueryFactory;
pub use form::{Direction, TextForm};
pub use index_map::{CharIndexMap, CharMapTable, MapSlot};
pub use pipeline::{
    NullRecognizer, PatternRecognizer, Preprocessor, SystemEntityRecognizer, Token, Tokenizer,
    WhitespacePreprocessor, WhitespaceTokenizer,
};
pub use query::{ProcessedQuery, Query};
pub use resolve::{ConflictResolver, Discard, DiscardReason};
pub use span::Span;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use textform::prelude::*;
    //!
    //! let resolver = ConflictResolver::new();
    //! assert_eq!(resolver.comparison_form(), TextForm::Normalized);
    //! ```
    pub use crate::confidence::Confidence;
    pub use crate::entity::{Entity, QueryEntity};
    pub use crate::error::{Error, Result};
    pub use crate::factory::QueryFactory;
    pub use crate::form::TextForm;
    pub use crate::index_map::{CharIndexMap, CharMapTable, MapSlot};
    pub use crate::pipeline::{
        NullRecognizer, PatternRecognizer, Preprocessor, SystemEntityRecognizer, Token, Tokenizer,
        WhitespacePreprocessor, WhitespaceTokenizer,
    };
    pub use crate::query::{ProcessedQuery, Query};
    pub use crate::resolve::{ConflictResolver, Discard, DiscardReason};
    pub use crate::span::Span;
}
