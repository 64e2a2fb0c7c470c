//! Controller-owned dynamic state slots
//!
//! The lifecycle controller is stateless between invocations; the two
//! values that outlive an invocation — the active training job and the
//! active recognizer — live in the settings table. Every write is a
//! single atomic upsert, and claiming the training slot is a
//! compare-and-swap so at most one job can ever be active.

use entrain_common::Result;
use sqlx::SqlitePool;

/// Sentinel stored in the job slot while no training job is active
pub const TRAINING_JOB_IDLE: &str = "none";

const KEY_TRAINING_JOB_ID: &str = "TrainingJobId";
const KEY_ACTIVE_RECOGNIZER_ID: &str = "ActiveRecognizerId";

/// Dynamic state slots over the settings table
#[derive(Clone)]
pub struct StateStore {
    db: SqlitePool,
}

impl StateStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Current training job id, or the idle sentinel if unset
    pub async fn training_job_id(&self) -> Result<String> {
        Ok(self
            .get(KEY_TRAINING_JOB_ID)
            .await?
            .unwrap_or_else(|| TRAINING_JOB_IDLE.to_string()))
    }

    /// Whether a training job is currently recorded as active
    pub async fn training_active(&self) -> Result<bool> {
        Ok(self.training_job_id().await? != TRAINING_JOB_IDLE)
    }

    /// Claim the training slot: transition it from the idle sentinel to
    /// `value` atomically
    ///
    /// Returns false without writing if the slot already holds a job,
    /// enforcing the at-most-one-active-job invariant.
    pub async fn claim_training_slot(&self, value: &str) -> Result<bool> {
        // Seed the slot so the conditional update has a row to match.
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(KEY_TRAINING_JOB_ID)
            .bind(TRAINING_JOB_IDLE)
            .execute(&self.db)
            .await?;

        let result = sqlx::query("UPDATE settings SET value = ? WHERE key = ? AND value = ?")
            .bind(value)
            .bind(KEY_TRAINING_JOB_ID)
            .bind(TRAINING_JOB_IDLE)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrite the training slot with a job id
    pub async fn set_training_job_id(&self, job_id: &str) -> Result<()> {
        self.set(KEY_TRAINING_JOB_ID, job_id).await
    }

    /// Reset the training slot to the idle sentinel
    pub async fn release_training_slot(&self) -> Result<()> {
        self.set(KEY_TRAINING_JOB_ID, TRAINING_JOB_IDLE).await
    }

    /// Identifier of the recognizer currently used for inference
    pub async fn active_recognizer_id(&self) -> Result<Option<String>> {
        self.get(KEY_ACTIVE_RECOGNIZER_ID).await
    }

    /// Swap the active-recognizer pointer
    pub async fn set_active_recognizer_id(&self, recognizer_id: &str) -> Result<()> {
        self.set(KEY_ACTIVE_RECOGNIZER_ID, recognizer_id).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
