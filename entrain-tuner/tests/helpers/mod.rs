//! Shared test harness: in-memory collaborators wired into a lifecycle
//! controller, plus builders for review output documents.

#![allow(dead_code)]

use async_trait::async_trait;
use entrain_common::events::EventBus;
use entrain_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use entrain_tuner::db;
use entrain_tuner::db::params::TunerParams;
use entrain_tuner::models::JobStatus;
use entrain_tuner::services::{RecognizerClient, TrainingLifecycle, TrainingRequest};
use entrain_tuner::stores::{MemoryObjectStore, ObjectStore, StateStore};

pub const BASE_KEY: &str = "lists/entities.csv";
pub const WORKING_KEY: &str = "lists/updated_entities.csv";
pub const FLOW_ID: &str = "flow-test";
pub const REVIEW_OUTPUT_KEY: &str = "reviews/output-1.json";

/// Scripted recognizer-service fake
///
/// `describe` pops pre-scripted statuses in order; submissions and
/// deletions are recorded for assertions.
#[derive(Default)]
pub struct FakeRecognizer {
    statuses: Mutex<VecDeque<JobStatus>>,
    submissions: Mutex<Vec<TrainingRequest>>,
    deletions: Mutex<Vec<String>>,
    counter: AtomicU32,
    fail_next_submit: AtomicBool,
}

impl FakeRecognizer {
    pub fn script(&self, status: JobStatus) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn fail_next_submit(&self) {
        self.fail_next_submit.store(true, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<TrainingRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecognizerClient for FakeRecognizer {
    async fn submit_training(&self, request: &TrainingRequest) -> Result<String> {
        if self.fail_next_submit.swap(false, Ordering::SeqCst) {
            return Err(Error::Recognizer("scripted submission failure".to_string()));
        }
        self.submissions.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("rec-{n}"))
    }

    async fn describe(&self, _job_id: &str) -> Result<JobStatus> {
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Recognizer("no scripted status".to_string()))
    }

    async fn delete(&self, recognizer_id: &str) -> Result<()> {
        self.deletions.lock().unwrap().push(recognizer_id.to_string());
        Ok(())
    }
}

/// Fully wired test fixture
pub struct Harness {
    pub db: SqlitePool,
    pub store: Arc<MemoryObjectStore>,
    pub recognizer: Arc<FakeRecognizer>,
    pub bus: EventBus,
    pub lifecycle: TrainingLifecycle,
}

impl Harness {
    /// State store over the same database, for assertions
    pub fn state(&self) -> StateStore {
        StateStore::new(self.db.clone())
    }
}

/// Build a harness with the given baseline entity-list document
pub async fn harness(baseline_csv: &str) -> Harness {
    let db = SqlitePool::connect(":memory:").await.unwrap();
    db::init_tables(&db).await.unwrap();

    let params = TunerParams {
        review_flow_id: FLOW_ID.to_string(),
        entity_list_location: BASE_KEY.to_string(),
        training_docs_location: "corpus/".to_string(),
        execution_role_id: "role-test".to_string(),
    };
    params.store(&db).await.unwrap();

    let store = Arc::new(MemoryObjectStore::new().with_object(BASE_KEY, baseline_csv));
    let recognizer = Arc::new(FakeRecognizer::default());
    let bus = EventBus::new(100);

    let object_store: Arc<dyn ObjectStore> = store.clone();
    let lifecycle = TrainingLifecycle::new(
        db.clone(),
        object_store,
        recognizer.clone(),
        bus.clone(),
        params,
        // Long enough that the gate task never ticks during a test;
        // polling is driven manually through poll_once.
        Duration::from_secs(3600),
    );

    Harness {
        db,
        store,
        recognizer,
        bus,
        lifecycle,
    }
}

/// Build a review output JSON document
///
/// `spans` are (start, end, label) character offsets into
/// `original_text`.
pub fn review_output_json(original_text: &str, spans: &[(usize, usize, &str)]) -> String {
    let entities: Vec<serde_json::Value> = spans
        .iter()
        .map(|(start, end, label)| {
            serde_json::json!({
                "startOffset": start,
                "endOffset": end,
                "label": label,
            })
        })
        .collect();

    serde_json::json!({
        "inputContent": {"originalText": original_text},
        "humanAnswers": [
            {"answerContent": {"crowd-entity-annotation": {"entities": entities}}}
        ]
    })
    .to_string()
}
