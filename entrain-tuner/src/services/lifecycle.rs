//! Training lifecycle controller
//!
//! Drives a recognizer training job from submission to terminal state:
//!
//! IDLE → SUBMITTED → TRAINING → {TRAINED, IN_ERROR} → IDLE
//!
//! Each entry point is one short, non-blocking invocation; everything
//! that must survive between invocations lives in the state store and
//! the object store. A TRAINED poll promotes the working entity list and
//! swaps the active-recognizer pointer; an IN_ERROR poll quarantines the
//! working list and leaves production inference untouched.

use chrono::Utc;
use entrain_common::events::{EventBus, TunerEvent};
use entrain_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::params::TunerParams;
use crate::db::runs;
use crate::models::{EntityList, JobStatus, ReviewNotice, ReviewOutput, TrainingRun};
use crate::services::polling_gate::PollingGate;
use crate::services::reconciler;
use crate::services::recognizer::{RecognizerClient, TrainingRequest};
use crate::services::staging::EntityListStaging;
use crate::stores::{ObjectStore, StateStore, TRAINING_JOB_IDLE};

/// Outcome of processing a review-completed notification
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// Notification did not match the configured flow or was not a
    /// completed review
    Ignored { reason: String },
    /// Review completed without annotating any entities
    NoAnnotations,
    /// All annotated entities were already in the training list
    NoNewEntities,
    /// New entities were merged and a training job submitted
    TrainingStarted { job_id: String, new_entities: usize },
}

/// Outcome of one poll step
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// No training job is active; the gate should not have been open
    Idle,
    /// Job still in flight; nothing to do
    StillRunning { status: JobStatus },
    /// Job trained; model promoted to active
    Promoted {
        recognizer_id: String,
        previous_recognizer_id: Option<String>,
    },
    /// Job failed; working list quarantined
    Quarantined {
        job_id: String,
        quarantine_key: String,
    },
    /// Service reported a status this controller does not recognize
    Unknown,
}

/// Current controller state, for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleStatus {
    pub training_job_id: String,
    pub polling: bool,
    pub active_recognizer_id: Option<String>,
}

/// The lifecycle controller
///
/// Cheap to clone; clones share the underlying pool, stores, and gate.
#[derive(Clone)]
pub struct TrainingLifecycle {
    db: SqlitePool,
    state: StateStore,
    staging: EntityListStaging,
    store: Arc<dyn ObjectStore>,
    recognizer: Arc<dyn RecognizerClient>,
    gate: Arc<PollingGate>,
    event_bus: EventBus,
    params: TunerParams,
}

impl TrainingLifecycle {
    pub fn new(
        db: SqlitePool,
        store: Arc<dyn ObjectStore>,
        recognizer: Arc<dyn RecognizerClient>,
        event_bus: EventBus,
        params: TunerParams,
        poll_interval: Duration,
    ) -> Self {
        let state = StateStore::new(db.clone());
        let staging = EntityListStaging::new(store.clone(), params.entity_list_location.clone());

        Self {
            db,
            state,
            staging,
            store,
            recognizer,
            gate: Arc::new(PollingGate::new(poll_interval)),
            event_bus,
            params,
        }
    }

    /// Snapshot staging layer (shared with tests and the API)
    pub fn staging(&self) -> &EntityListStaging {
        &self.staging
    }

    /// Current controller state
    pub async fn status(&self) -> Result<LifecycleStatus> {
        Ok(LifecycleStatus {
            training_job_id: self.state.training_job_id().await?,
            polling: self.gate.is_open(),
            active_recognizer_id: self.state.active_recognizer_id().await?,
        })
    }

    /// Reopen the polling gate if a training job was in flight when the
    /// process stopped
    ///
    /// Called once at startup. Polling is level-triggered, so resuming
    /// it is always safe: the next tick observes whatever state the job
    /// is actually in.
    pub async fn resume_if_active(&self) -> Result<bool> {
        let job_id = self.state.training_job_id().await?;
        if job_id == TRAINING_JOB_IDLE {
            return Ok(false);
        }

        tracing::info!(%job_id, "Training job found at startup; resuming completion polling");
        self.open_gate();
        Ok(true)
    }

    /// Process a review-completed notification
    ///
    /// Ignores notifications for other review flows or non-completed
    /// reviews; otherwise loads the review output, reconciles its
    /// annotations into the working entity list, and submits a training
    /// job when the list genuinely changed.
    pub async fn handle_review_completed(&self, notice: &ReviewNotice) -> Result<ReviewOutcome> {
        if notice.flow_id != self.params.review_flow_id {
            tracing::info!(
                flow_id = %notice.flow_id,
                "Review notification for a different flow; ignoring"
            );
            self.event_bus.emit_lossy(TunerEvent::ReviewIgnored {
                flow_id: notice.flow_id.clone(),
                status: notice.status.clone(),
                timestamp: Utc::now(),
            });
            return Ok(ReviewOutcome::Ignored {
                reason: "flow mismatch".to_string(),
            });
        }

        if !notice.is_completed() {
            tracing::info!(status = %notice.status, "Review did not complete; ignoring");
            self.event_bus.emit_lossy(TunerEvent::ReviewIgnored {
                flow_id: notice.flow_id.clone(),
                status: notice.status.clone(),
                timestamp: Utc::now(),
            });
            return Ok(ReviewOutcome::Ignored {
                reason: format!("review status {}", notice.status),
            });
        }

        let content = self.store.get(&notice.output_location).await?;
        let output: ReviewOutput = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidInput(format!("Malformed review output: {e}")))?;

        self.event_bus.emit_lossy(TunerEvent::ReviewCompleted {
            output_location: notice.output_location.clone(),
            timestamp: Utc::now(),
        });

        let annotations = output.annotations();
        if annotations.is_empty() {
            tracing::info!("No entities were annotated in the human review");
            return Ok(ReviewOutcome::NoAnnotations);
        }

        let working = self.staging.load_working().await?;
        let reconciliation = reconciler::reconcile(&working, &annotations);

        self.event_bus.emit_lossy(TunerEvent::ReconciliationCompleted {
            new_entities: reconciliation.new_entities,
            total_entities: reconciliation.merged.len(),
            retraining_required: reconciliation.retraining_required,
            timestamp: Utc::now(),
        });

        if !reconciliation.retraining_required {
            tracing::info!("All annotated entities already present in the training list");
            return Ok(ReviewOutcome::NoNewEntities);
        }

        tracing::info!(
            new_entities = reconciliation.new_entities,
            total_entities = reconciliation.merged.len(),
            "New entities found; updating working list and retraining"
        );
        self.staging.write_working(&reconciliation.merged).await?;

        let job_id = self.submit_training(&reconciliation.merged).await?;
        Ok(ReviewOutcome::TrainingStarted {
            job_id,
            new_entities: reconciliation.new_entities,
        })
    }

    /// Submit a training job over the working entity list
    ///
    /// The job slot is claimed by compare-and-swap before the external
    /// call: if another job is active the claim fails and nothing is
    /// submitted. A failed submission releases the slot.
    pub async fn submit_training(&self, list: &EntityList) -> Result<String> {
        let marker = format!("pending:{}", Uuid::new_v4());
        if !self.state.claim_training_slot(&marker).await? {
            let current = self.state.training_job_id().await?;
            tracing::error!(
                active_job = %current,
                "Refusing to submit: a training job is already active"
            );
            return Err(Error::Conflict(format!(
                "training job {current} is already active"
            )));
        }

        let request = TrainingRequest {
            name: TrainingRequest::generate_name(),
            entity_types: list.entity_types(),
            entity_list_location: self.staging.working_key(),
            documents_location: self.params.training_docs_location.clone(),
            execution_role: self.params.execution_role_id.clone(),
        };

        let job_id = match self.recognizer.submit_training(&request).await {
            Ok(job_id) => job_id,
            Err(e) => {
                self.state.release_training_slot().await?;
                return Err(e);
            }
        };

        self.state.set_training_job_id(&job_id).await?;
        runs::save_run(&self.db, &TrainingRun::submitted(job_id.as_str())).await?;

        tracing::info!(
            %job_id,
            entity_types = ?request.entity_types,
            "Training job submitted"
        );
        self.event_bus.emit_lossy(TunerEvent::TrainingSubmitted {
            job_id: job_id.clone(),
            entity_types: request.entity_types,
            timestamp: Utc::now(),
        });

        self.open_gate();
        Ok(job_id)
    }

    /// One poll step: check the active job's status and apply the
    /// matching transition
    ///
    /// Non-blocking; returns after a single status check. Transient
    /// errors propagate to the caller and leave the gate open, so the
    /// next tick retries.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let job_id = self.state.training_job_id().await?;
        if job_id == TRAINING_JOB_IDLE {
            tracing::warn!("Poll tick with no active training job; closing gate");
            self.close_gate();
            return Ok(PollOutcome::Idle);
        }

        let status = self.recognizer.describe(&job_id).await?;
        self.event_bus.emit_lossy(TunerEvent::TrainingPolled {
            job_id: job_id.clone(),
            status: status.as_str().to_string(),
            timestamp: Utc::now(),
        });

        match status {
            JobStatus::Submitted | JobStatus::Training => {
                tracing::info!(%job_id, status = %status, "Training job still in flight");
                Ok(PollOutcome::StillRunning { status })
            }
            JobStatus::Trained => self.complete_training(&job_id).await,
            JobStatus::InError => self.fail_training(&job_id).await,
            JobStatus::Unknown => {
                // Fail-safe: an unrecognized status must not silently
                // stop polling a job that may still finish.
                tracing::warn!(%job_id, "Training job reported an unexpected status");
                Ok(PollOutcome::Unknown)
            }
        }
    }

    /// TRAINED transition: promote the working list and swap the active
    /// recognizer
    ///
    /// The pointer swap happens before the superseded recognizer is torn
    /// down, so inference consumers always have an addressable model.
    async fn complete_training(&self, job_id: &str) -> Result<PollOutcome> {
        self.state.release_training_slot().await?;

        self.staging.promote().await?;
        tracing::info!("Working entity list promoted to baseline");

        let previous = self.state.active_recognizer_id().await?;
        self.state.set_active_recognizer_id(job_id).await?;
        tracing::info!(recognizer_id = job_id, "Active recognizer updated");

        if let Some(previous_id) = previous.as_deref().filter(|p| *p != job_id) {
            if let Err(e) = self.recognizer.delete(previous_id).await {
                tracing::warn!(
                    recognizer_id = previous_id,
                    error = %e,
                    "Failed to delete superseded recognizer; continuing"
                );
            } else {
                tracing::info!(recognizer_id = previous_id, "Deleted superseded recognizer");
            }
        }

        self.staging.clear_working().await?;
        runs::resolve_run(&self.db, job_id, JobStatus::Trained, None).await?;
        self.close_gate();

        self.event_bus.emit_lossy(TunerEvent::ModelPromoted {
            recognizer_id: job_id.to_string(),
            previous_recognizer_id: previous.clone(),
            timestamp: Utc::now(),
        });

        Ok(PollOutcome::Promoted {
            recognizer_id: job_id.to_string(),
            previous_recognizer_id: previous,
        })
    }

    /// IN_ERROR transition: quarantine the working list and reset
    ///
    /// The baseline and the active recognizer are untouched; a failed
    /// retraining attempt never affects production inference.
    async fn fail_training(&self, job_id: &str) -> Result<PollOutcome> {
        self.state.release_training_slot().await?;

        let quarantine_key = self.staging.quarantine().await?;
        tracing::warn!(
            %job_id,
            %quarantine_key,
            "Training failed; working entity list quarantined"
        );

        self.staging.clear_working().await?;

        if let Err(e) = self.recognizer.delete(job_id).await {
            tracing::warn!(
                recognizer_id = job_id,
                error = %e,
                "Failed to delete errored recognizer; continuing"
            );
        }

        runs::resolve_run(&self.db, job_id, JobStatus::InError, Some(&quarantine_key)).await?;
        self.close_gate();

        self.event_bus.emit_lossy(TunerEvent::TrainingFailed {
            job_id: job_id.to_string(),
            quarantine_key: quarantine_key.clone(),
            timestamp: Utc::now(),
        });

        Ok(PollOutcome::Quarantined {
            job_id: job_id.to_string(),
            quarantine_key,
        })
    }

    fn open_gate(&self) {
        if self.gate.is_open() {
            return;
        }

        let lifecycle = self.clone();
        self.gate.open(move || {
            let lifecycle = lifecycle.clone();
            async move {
                if let Err(e) = lifecycle.poll_once().await {
                    tracing::warn!(error = %e, "Training completion poll failed; will retry");
                }
            }
        });

        self.event_bus.emit_lossy(TunerEvent::PollingStarted {
            timestamp: Utc::now(),
        });
    }

    fn close_gate(&self) {
        if !self.gate.is_open() {
            return;
        }

        self.gate.close();
        self.event_bus.emit_lossy(TunerEvent::PollingStopped {
            timestamp: Utc::now(),
        });
    }
}
