//! Error types for textform.

use crate::form::{Direction, TextForm};
use thiserror::Error;

/// Result type for textform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for textform operations.
///
/// Every failure in this crate is a caller or data contract violation and is
/// surfaced immediately; nothing here is transient or retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A text form name outside the three-value enumeration.
    ///
    /// Only arises when parsing a form from a string; the [`TextForm`] enum
    /// makes invalid forms unrepresentable in translation calls.
    #[error("invalid text form {name:?} (expected \"raw\", \"processed\" or \"normalized\")")]
    InvalidForm {
        /// The unrecognized form name.
        name: String,
    },

    /// Attempted to step translation beyond the end of the form ordering.
    #[error("the {form} form cannot be stepped {direction}")]
    UnsupportedForm {
        /// The form translation was stepping from.
        form: TextForm,
        /// The direction of the attempted step.
        direction: Direction,
    },

    /// An index map exists for the requested step but has no entry for the
    /// given index.
    ///
    /// Distinguished from the absent-map case, which is silently treated as
    /// identity.
    #[error("no index mapping entry for {index} between the {from} and {to} forms")]
    InvalidIndex {
        /// The index that has no mapping entry.
        index: usize,
        /// The form the index belongs to.
        from: TextForm,
        /// The form the index was being translated into.
        to: TextForm,
    },
}

impl Error {
    /// Create an invalid form error.
    pub fn invalid_form(name: impl Into<String>) -> Self {
        Error::InvalidForm { name: name.into() }
    }

    /// Create an unsupported form error.
    pub fn unsupported_form(form: TextForm, direction: Direction) -> Self {
        Error::UnsupportedForm { form, direction }
    }

    /// Create an invalid index error.
    pub fn invalid_index(index: usize, from: TextForm, to: TextForm) -> Self {
        Error::InvalidIndex { index, from, to }
    }
}
