//! Entity-list reconciliation
//!
//! Folds human-reviewer annotations into a baseline entity list and
//! decides whether the result warrants retraining. Pure in-memory logic;
//! reading and writing snapshots is the staging layer's job.

use crate::models::{EntityList, EntityRecord};

/// Result of one reconciliation pass
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Baseline records in original order, followed by genuinely new
    /// entities in first-seen order
    pub merged: EntityList,
    /// Whether the merged list differs from the baseline
    pub retraining_required: bool,
    /// Count of entities added by this pass
    pub new_entities: usize,
}

/// Merge reviewer annotations into a baseline entity list
///
/// An annotation is new only if its span text is absent from the
/// baseline (case-sensitive on text). Labels are normalized to uppercase
/// by `EntityRecord`; duplicate span texts across annotations collapse
/// to the first-seen pair. The retraining signal is a record-count
/// comparison between merged and baseline: additions that net to the
/// same count (all duplicates) report "not required".
pub fn reconcile(baseline: &EntityList, annotations: &[(String, String)]) -> Reconciliation {
    let mut merged = baseline.clone();

    for (text, label) in annotations {
        if !merged.push(EntityRecord::new(text.clone(), label)) {
            tracing::debug!(%text, "Annotated entity already present in training list");
        }
    }

    let retraining_required = merged.len() != baseline.len();
    let new_entities = merged.len() - baseline.len();

    Reconciliation {
        merged,
        retraining_required,
        new_entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> EntityList {
        EntityList::parse("Text,Type\nAcme,ORG\n")
    }

    fn ann(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(t, l)| (t.to_string(), l.to_string()))
            .collect()
    }

    #[test]
    fn new_entity_triggers_retraining() {
        let result = reconcile(&baseline(), &ann(&[("Jones", "PER")]));

        assert!(result.retraining_required);
        assert_eq!(result.new_entities, 1);
        assert_eq!(result.merged.len(), 2);
        assert_eq!(result.merged.records()[0], EntityRecord::new("Acme", "ORG"));
        assert_eq!(result.merged.records()[1], EntityRecord::new("Jones", "PER"));
    }

    #[test]
    fn duplicate_annotations_do_not_trigger_retraining() {
        let result = reconcile(&baseline(), &ann(&[("Acme", "org"), ("Acme", "ORG")]));

        assert!(!result.retraining_required);
        assert_eq!(result.new_entities, 0);
        assert_eq!(result.merged.len(), 1);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let annotations = ann(&[("Jones", "PER"), ("Globex", "org")]);
        let first = reconcile(&baseline(), &annotations);
        let second = reconcile(&baseline(), &annotations);

        assert_eq!(first.merged, second.merged);
        assert_eq!(first.retraining_required, second.retraining_required);
    }

    #[test]
    fn malformed_baseline_rows_are_excluded_from_count() {
        let baseline = EntityList::parse("Text,Type\nAcme,ORG\nx,y,z\nJones,PER\n");
        assert_eq!(baseline.len(), 2);

        // Re-annotating an entity from a valid row is still a duplicate
        let result = reconcile(&baseline, &ann(&[("Jones", "per")]));
        assert!(!result.retraining_required);

        // The malformed row's text was never parsed, so it counts as new
        let result = reconcile(&baseline, &ann(&[("x", "MISC")]));
        assert!(result.retraining_required);
    }

    #[test]
    fn empty_annotations_change_nothing() {
        let result = reconcile(&baseline(), &[]);
        assert!(!result.retraining_required);
        assert_eq!(result.merged, baseline());
    }

    #[test]
    fn new_entity_label_is_uppercased() {
        let result = reconcile(&baseline(), &ann(&[("Jones", "per")]));
        assert_eq!(result.merged.records()[1].entity_type, "PER");
    }
}
