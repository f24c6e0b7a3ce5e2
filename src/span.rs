//! Character and token index spans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// A closed interval `[start, end]` over character or token indices.
///
/// Both ends are inclusive: the span of `"cafe"` at the start of a text is
/// `[0, 3]`. Indices are *character* indices, not byte offsets — the same
/// convention as the index maps the spans are translated through.
///
/// Spans produced by translation through non-order-preserving maps may come
/// back with `end < start`. This layer does not correct or reject them: such
/// a span iterates as empty and has length 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    /// First index covered by the span (inclusive).
    pub start: usize,
    /// Last index covered by the span (inclusive).
    pub end: usize,
}

impl Span {
    /// Create a span from inclusive `start` and `end` indices.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of indices covered: `end - start + 1`, saturating to 0 for an
    /// inverted span.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Whether the span covers no indices (only possible when inverted).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Whether `index` lies within the span.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Whether this span fully covers `other` (`other ⊆ self`).
    #[must_use]
    pub const fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether this span is fully covered by `other` (`self ⊆ other`).
    #[must_use]
    pub const fn within(&self, other: &Span) -> bool {
        other.contains_span(self)
    }

    /// Whether the two spans share at least one index.
    #[must_use]
    pub const fn intersects(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Iterate over every index in `start..=end`.
    #[must_use]
    pub const fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Extract the text covered by this span, treating `start`/`end` as
    /// character indices into `text`.
    ///
    /// Out-of-range boundaries are clamped to the text (the slice may be
    /// shorter than the span); an inverted span extracts nothing.
    #[must_use]
    pub fn extract<'a>(&self, text: &'a str) -> &'a str {
        if self.end < self.start {
            return "";
        }
        let mut byte_start = text.len();
        let mut byte_end = text.len();
        for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
            if char_idx == self.start {
                byte_start = byte_idx;
            }
            if char_idx == self.end {
                byte_end = byte_idx + ch.len_utf8();
                break;
            }
        }
        &text[byte_start..byte_end]
    }
}

impl IntoIterator for Span {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..=self.end
    }
}

impl IntoIterator for &Span {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}
