//! The three text forms and their ordering.
//!
//! Every query stores its text in three parallel forms. The ordering is
//! semantically meaningful: translating "downward" (toward [`TextForm::Raw`])
//! uses inverse index maps, translating "upward" uses forward maps, and a
//! multi-step translation always passes through the intermediate form in
//! order. There is no direct raw↔normalized shortcut.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three parallel forms a query's text exists in.
///
/// Ordered `Raw < Processed < Normalized`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TextForm {
    /// The verbatim input text.
    Raw,
    /// The text after preprocessing.
    Processed,
    /// The text after tokenization and canonicalization, rebuilt by joining
    /// the normalized tokens with single spaces.
    Normalized,
}

impl TextForm {
    /// All forms, in order.
    pub const ALL: [TextForm; 3] = [TextForm::Raw, TextForm::Processed, TextForm::Normalized];

    /// Stable label for this form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TextForm::Raw => "raw",
            TextForm::Processed => "processed",
            TextForm::Normalized => "normalized",
        }
    }

    /// The next form upward, or `None` from `Normalized`.
    #[must_use]
    pub const fn promoted(self) -> Option<TextForm> {
        match self {
            TextForm::Raw => Some(TextForm::Processed),
            TextForm::Processed => Some(TextForm::Normalized),
            TextForm::Normalized => None,
        }
    }

    /// The next form downward, or `None` from `Raw`.
    #[must_use]
    pub const fn demoted(self) -> Option<TextForm> {
        match self {
            TextForm::Raw => None,
            TextForm::Processed => Some(TextForm::Raw),
            TextForm::Normalized => Some(TextForm::Processed),
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TextForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextForm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(TextForm::Raw),
            "processed" => Ok(TextForm::Processed),
            "normalized" => Ok(TextForm::Normalized),
            other => Err(Error::invalid_form(other)),
        }
    }
}

/// Direction of a single translation step along the form ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward [`TextForm::Normalized`].
    Upward,
    /// Toward [`TextForm::Raw`].
    Downward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Upward => "upward",
            Direction::Downward => "downward",
        })
    }
}
