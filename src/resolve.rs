//! Deterministic conflict resolution over annotated entity spans.
//!
//! Upstream annotators propose overlapping, duplicated and nested entities;
//! this module collapses a proposed sequence into a non-contradictory set.
//! The scan order and tie-breaks are a behavioral contract consumed by
//! downstream annotation pipelines, not an incidental implementation
//! detail — wider spans beat nested ones regardless of confidence, and
//! confidence only arbitrates between identical or partially overlapping
//! spans, with exact ties keeping the earlier element.

use crate::entity::QueryEntity;
use crate::form::TextForm;
use crate::span::Span;
use crate::Confidence;
use serde::Serialize;

/// Why an entity was discarded during conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// The span was a strict subset of another entity's span.
    Subsumed,
    /// The span was identical to or overlapped another entity's span with
    /// higher (or tie-winning) confidence.
    Outscored,
}

/// One structured trace record for an entity removed during resolution.
///
/// Replaces ambient logging: callers that want to know *why* the output
/// shrank ask for the trace instead of scraping a logger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discard {
    /// The discarded entity's raw text.
    pub text: String,
    /// The discarded entity's type.
    pub entity_type: String,
    /// The discarded entity's span on the comparison form.
    pub span: Span,
    /// Why it was discarded.
    pub reason: DiscardReason,
}

impl Discard {
    fn new(entity: &QueryEntity, form: TextForm, reason: DiscardReason) -> Self {
        Self {
            text: entity.text(TextForm::Raw).to_string(),
            entity_type: entity.entity().entity_type.clone(),
            span: entity.span(form),
            reason,
        }
    }
}

/// Resolves subset, duplicate and overlap conflicts in a proposed entity
/// sequence.
///
/// The comparison form is an explicit part of the contract: the whole pass
/// compares spans in one form's coordinates, normalized by default.
///
/// # Example
///
/// ```rust
/// use textform::{ConflictResolver, TextForm};
///
/// let resolver = ConflictResolver::new().compare_on(TextForm::Raw);
/// let survivors = resolver.resolve(Vec::new());
/// assert!(survivors.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver {
    form: TextForm,
}

impl ConflictResolver {
    /// Create a resolver comparing on normalized-form spans.
    #[must_use]
    pub fn new() -> Self {
        Self {
            form: TextForm::Normalized,
        }
    }

    /// Compare spans in the given form's coordinates instead.
    #[must_use]
    pub fn compare_on(mut self, form: TextForm) -> Self {
        self.form = form;
        self
    }

    /// The form whose spans the resolver compares.
    #[must_use]
    pub fn comparison_form(&self) -> TextForm {
        self.form
    }

    /// Resolve conflicts, returning the surviving entities in their original
    /// relative order.
    #[must_use]
    pub fn resolve(&self, entities: Vec<QueryEntity>) -> Vec<QueryEntity> {
        self.resolve_with_trace(entities).0
    }

    /// Resolve conflicts, also returning one [`Discard`] record per removed
    /// entity, in removal order.
    ///
    /// Accepts any sequence, including empty, and always terminates: every
    /// removal strictly shrinks the working list. Worst case is quadratic in
    /// the input size.
    #[must_use]
    pub fn resolve_with_trace(&self, entities: Vec<QueryEntity>) -> (Vec<QueryEntity>, Vec<Discard>) {
        let form = self.form;
        let mut filtered = entities;
        let mut discards = Vec::new();

        // Two-cursor scan over the shrinking working list. Removing at `j`
        // re-examines the same position; removing the target itself aborts
        // the inner scan and re-runs the outer position, which now holds a
        // different element.
        let mut i = 0;
        while i < filtered.len() {
            let mut include_target = true;
            let mut j = i + 1;
            while j < filtered.len() {
                let target = filtered[i].span(form);
                let other = filtered[j].span(form);

                if target.contains_span(&other) && target != other {
                    discards.push(Discard::new(&filtered[j], form, DiscardReason::Subsumed));
                    filtered.remove(j);
                    continue;
                } else if target.within(&other) && target != other {
                    discards.push(Discard::new(&filtered[i], form, DiscardReason::Subsumed));
                    filtered.remove(i);
                    include_target = false;
                    break;
                } else if target == other || target.intersects(&other) {
                    if confidence_of(&filtered[i]) >= confidence_of(&filtered[j]) {
                        discards.push(Discard::new(&filtered[j], form, DiscardReason::Outscored));
                        filtered.remove(j);
                        continue;
                    } else {
                        discards.push(Discard::new(&filtered[i], form, DiscardReason::Outscored));
                        filtered.remove(i);
                        include_target = false;
                        break;
                    }
                }
                j += 1;
            }
            if include_target {
                i += 1;
            }
        }

        (filtered, discards)
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence used for arbitration; an unscored entity loses to any scored
/// one.
fn confidence_of(entity: &QueryEntity) -> f64 {
    entity.entity().confidence.map_or(0.0, Confidence::get)
}
