//! Static tuner parameters
//!
//! The parameters that never change during a process's lifetime are
//! loaded from the settings table once at startup into a typed struct,
//! instead of string-keyed lookups scattered through the code. The
//! dynamic slots (training job, active recognizer) stay in
//! `stores::StateStore` because they change while the service runs.

use entrain_common::{Error, Result};
use sqlx::SqlitePool;

const KEY_REVIEW_FLOW_ID: &str = "ReviewFlowId";
const KEY_ENTITY_LIST_LOCATION: &str = "EntityTrainingListLocation";
const KEY_TRAINING_DOCS_LOCATION: &str = "EntityTrainingDocumentsLocation";
const KEY_EXECUTION_ROLE_ID: &str = "ExecutionRoleId";

/// Static configuration of the tuner, loaded once at startup
#[derive(Debug, Clone)]
pub struct TunerParams {
    /// Review flow whose completions this service accepts
    pub review_flow_id: String,
    /// Base object-store key of the baseline entity list
    pub entity_list_location: String,
    /// Object-store location of the training document corpus
    pub training_docs_location: String,
    /// Role identifier the recognizer service trains under
    pub execution_role_id: String,
}

impl TunerParams {
    /// Load all static parameters from the settings table
    ///
    /// Every key must be present; a missing key is a configuration error
    /// and the service refuses to start.
    pub async fn load(db: &SqlitePool) -> Result<Self> {
        Ok(Self {
            review_flow_id: require(db, KEY_REVIEW_FLOW_ID).await?,
            entity_list_location: require(db, KEY_ENTITY_LIST_LOCATION).await?,
            training_docs_location: require(db, KEY_TRAINING_DOCS_LOCATION).await?,
            execution_role_id: require(db, KEY_EXECUTION_ROLE_ID).await?,
        })
    }

    /// Write all static parameters (test setup and first-run seeding)
    pub async fn store(&self, db: &SqlitePool) -> Result<()> {
        for (key, value) in [
            (KEY_REVIEW_FLOW_ID, &self.review_flow_id),
            (KEY_ENTITY_LIST_LOCATION, &self.entity_list_location),
            (KEY_TRAINING_DOCS_LOCATION, &self.training_docs_location),
            (KEY_EXECUTION_ROLE_ID, &self.execution_role_id),
        ] {
            sqlx::query(
                "INSERT INTO settings (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(key)
            .bind(value)
            .execute(db)
            .await?;
        }
        Ok(())
    }
}

async fn require(db: &SqlitePool, key: &str) -> Result<String> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "Required setting '{key}' is not configured"
        ))),
    }
}
