//! Character index correspondences between adjacent text forms.
//!
//! A [`CharIndexMap`] is the partial index→index mapping an external
//! preprocessor or tokenizer reports between two adjacent forms. The
//! semantics are deliberately asymmetric: an *absent map* means the two
//! forms correspond 1:1 (identity), while a *present map without an entry*
//! for some index means that index is invalid in the target form.
//!
//! [`CharMapTable`] holds the maps for a query. Three forms give at most
//! four directed adjacent pairs, so the table is a fixed four-slot array
//! indexed by [`MapSlot`] — there is no dynamic key to get wrong.

use crate::form::TextForm;
use std::collections::HashMap;

/// A partial character index→index mapping between two adjacent text forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharIndexMap {
    entries: HashMap<usize, usize>,
}

impl CharIndexMap {
    /// Create an empty map.
    ///
    /// Note that an empty *present* map is not identity: it maps no index at
    /// all. Identity is expressed by not registering a map in the first place.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for `from`.
    pub fn insert(&mut self, from: usize, to: usize) {
        self.entries.insert(from, to);
    }

    /// Look up the target index for `from`, if mapped.
    #[must_use]
    pub fn get(&self, from: usize) -> Option<usize> {
        self.entries.get(&from).copied()
    }

    /// Number of mapped indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(usize, usize)> for CharIndexMap {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One of the four directed adjacent form pairs a map can exist for.
///
/// No slot exists for raw↔normalized: that translation always composes
/// through the processed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSlot {
    /// Raw → Processed (preprocessor forward map).
    RawToProcessed,
    /// Processed → Raw (preprocessor backward map).
    ProcessedToRaw,
    /// Processed → Normalized (tokenizer forward map).
    ProcessedToNormalized,
    /// Normalized → Processed (tokenizer backward map).
    NormalizedToProcessed,
}

impl MapSlot {
    /// All slots.
    pub const ALL: [MapSlot; 4] = [
        MapSlot::RawToProcessed,
        MapSlot::ProcessedToRaw,
        MapSlot::ProcessedToNormalized,
        MapSlot::NormalizedToProcessed,
    ];

    /// The slot for a directed pair of forms, or `None` when the forms are
    /// not adjacent (including `from == to`).
    #[must_use]
    pub const fn between(from: TextForm, to: TextForm) -> Option<MapSlot> {
        match (from, to) {
            (TextForm::Raw, TextForm::Processed) => Some(MapSlot::RawToProcessed),
            (TextForm::Processed, TextForm::Raw) => Some(MapSlot::ProcessedToRaw),
            (TextForm::Processed, TextForm::Normalized) => Some(MapSlot::ProcessedToNormalized),
            (TextForm::Normalized, TextForm::Processed) => Some(MapSlot::NormalizedToProcessed),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed-size table of the index maps attached to a query.
///
/// Each slot is either empty (identity translation for that hop) or holds a
/// partial [`CharIndexMap`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharMapTable {
    slots: [Option<CharIndexMap>; 4],
}

impl CharMapTable {
    /// Create a table with every slot empty (all hops identity).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a map for a slot, replacing any previous one.
    pub fn set(&mut self, slot: MapSlot, map: CharIndexMap) {
        self.slots[slot.index()] = Some(map);
    }

    /// The map registered for a slot, if any.
    #[must_use]
    pub fn get(&self, slot: MapSlot) -> Option<&CharIndexMap> {
        self.slots[slot.index()].as_ref()
    }
}
