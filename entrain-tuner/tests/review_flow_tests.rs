//! Review-completion flow tests
//!
//! Exercises the reconciliation path from a review notification through
//! working-list staging to (possible) training submission.

mod helpers;

use entrain_common::Error;
use entrain_tuner::models::ReviewNotice;
use entrain_tuner::services::ReviewOutcome;
use entrain_tuner::stores::ObjectStore;
use helpers::{harness, review_output_json, FLOW_ID, REVIEW_OUTPUT_KEY, WORKING_KEY};

const BASELINE: &str = "Text,Type\nAcme,ORG\n";

fn notice(flow_id: &str, status: &str) -> ReviewNotice {
    ReviewNotice {
        flow_id: flow_id.to_string(),
        status: status.to_string(),
        output_location: REVIEW_OUTPUT_KEY.to_string(),
    }
}

#[tokio::test]
async fn notification_for_other_flow_is_ignored() {
    let h = harness(BASELINE).await;

    let outcome = h
        .lifecycle
        .handle_review_completed(&notice("some-other-flow", "Completed"))
        .await
        .unwrap();

    assert!(matches!(outcome, ReviewOutcome::Ignored { .. }));
    // Nothing was staged or submitted
    assert!(h.store.get(WORKING_KEY).await.is_err());
    assert!(h.recognizer.submissions().is_empty());
}

#[tokio::test]
async fn incomplete_review_is_ignored() {
    let h = harness(BASELINE).await;

    let outcome = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Stopped"))
        .await
        .unwrap();

    assert!(matches!(outcome, ReviewOutcome::Ignored { .. }));
    assert!(h.recognizer.submissions().is_empty());
}

#[tokio::test]
async fn review_without_annotations_changes_nothing() {
    let h = harness(BASELINE).await;
    h.store
        .put(REVIEW_OUTPUT_KEY, &review_output_json("Acme Jones", &[]))
        .await
        .unwrap();

    let outcome = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap();

    assert!(matches!(outcome, ReviewOutcome::NoAnnotations));
    assert!(h.store.get(WORKING_KEY).await.is_err());
}

#[tokio::test]
async fn already_known_entities_do_not_trigger_retraining() {
    let h = harness(BASELINE).await;
    // Reviewer re-annotated "Acme" (0..4), already in the baseline
    h.store
        .put(
            REVIEW_OUTPUT_KEY,
            &review_output_json("Acme Jones", &[(0, 4, "org")]),
        )
        .await
        .unwrap();

    let outcome = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap();

    assert!(matches!(outcome, ReviewOutcome::NoNewEntities));
    // The working copy was seeded from the baseline but not retrained on
    assert_eq!(h.store.get(WORKING_KEY).await.unwrap(), BASELINE);
    assert!(h.recognizer.submissions().is_empty());
}

#[tokio::test]
async fn new_entity_triggers_staging_and_submission() {
    let h = harness(BASELINE).await;
    // "Jones" (5..10) is new
    h.store
        .put(
            REVIEW_OUTPUT_KEY,
            &review_output_json("Acme Jones", &[(0, 4, "org"), (5, 10, "per")]),
        )
        .await
        .unwrap();

    let outcome = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap();

    match outcome {
        ReviewOutcome::TrainingStarted { job_id, new_entities } => {
            assert_eq!(job_id, "rec-1");
            assert_eq!(new_entities, 1);
        }
        other => panic!("expected training to start, got {other:?}"),
    }

    // Merged list staged as the working snapshot
    assert_eq!(
        h.store.get(WORKING_KEY).await.unwrap(),
        "Text,Type\nAcme,ORG\nJones,PER\n"
    );

    // Submission covers both entity types and points at the working list
    let submissions = h.recognizer.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].entity_types, vec!["ORG", "PER"]);
    assert_eq!(submissions[0].entity_list_location, WORKING_KEY);

    assert!(h.lifecycle.status().await.unwrap().polling);
}

#[tokio::test]
async fn second_review_extends_existing_working_list() {
    let h = harness(BASELINE).await;
    h.store
        .put(
            REVIEW_OUTPUT_KEY,
            &review_output_json("Acme Jones", &[(5, 10, "per")]),
        )
        .await
        .unwrap();
    h.lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap();

    // Resolve the first job so the slot frees up
    h.recognizer.script(entrain_tuner::models::JobStatus::Trained);
    h.lifecycle.poll_once().await.unwrap();

    // A later review adds "Globex" (0..6) on top of the new baseline
    h.store
        .put(
            REVIEW_OUTPUT_KEY,
            &review_output_json("Globex won.", &[(0, 6, "org")]),
        )
        .await
        .unwrap();
    let outcome = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap();

    assert!(matches!(outcome, ReviewOutcome::TrainingStarted { .. }));
    assert_eq!(
        h.store.get(WORKING_KEY).await.unwrap(),
        "Text,Type\nAcme,ORG\nJones,PER\nGlobex,ORG\n"
    );
}

#[tokio::test]
async fn malformed_review_output_is_invalid_input() {
    let h = harness(BASELINE).await;
    h.store.put(REVIEW_OUTPUT_KEY, "not json").await.unwrap();

    let err = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn missing_review_output_propagates_not_found() {
    let h = harness(BASELINE).await;

    let err = h
        .lifecycle
        .handle_review_completed(&notice(FLOW_ID, "Completed"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
