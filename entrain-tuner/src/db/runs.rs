//! Training-run audit persistence

use chrono::{DateTime, Utc};
use entrain_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::models::{JobStatus, TrainingRun};

/// Insert or update a training run
pub async fn save_run(pool: &SqlitePool, run: &TrainingRun) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO training_runs (job_id, status, submitted_at, resolved_at, quarantine_key)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(job_id) DO UPDATE SET
            status = excluded.status,
            resolved_at = excluded.resolved_at,
            quarantine_key = excluded.quarantine_key
        "#,
    )
    .bind(&run.job_id)
    .bind(run.status.as_str())
    .bind(run.submitted_at.to_rfc3339())
    .bind(run.resolved_at.map(|dt| dt.to_rfc3339()))
    .bind(&run.quarantine_key)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a training run by job id
pub async fn load_run(pool: &SqlitePool, job_id: &str) -> Result<Option<TrainingRun>> {
    let row = sqlx::query(
        "SELECT job_id, status, submitted_at, resolved_at, quarantine_key
         FROM training_runs WHERE job_id = ?",
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.map(run_from_row).transpose()
}

/// All training runs, newest submission first
pub async fn list_runs(pool: &SqlitePool) -> Result<Vec<TrainingRun>> {
    let rows = sqlx::query(
        "SELECT job_id, status, submitted_at, resolved_at, quarantine_key
         FROM training_runs ORDER BY submitted_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(run_from_row).collect()
}

/// Record a run's terminal transition
pub async fn resolve_run(
    pool: &SqlitePool,
    job_id: &str,
    status: JobStatus,
    quarantine_key: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE training_runs SET status = ?, resolved_at = ?, quarantine_key = ?
         WHERE job_id = ?",
    )
    .bind(status.as_str())
    .bind(Utc::now().to_rfc3339())
    .bind(quarantine_key)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

fn run_from_row(row: sqlx::sqlite::SqliteRow) -> Result<TrainingRun> {
    let status: String = row.get("status");
    let status = JobStatus::from_str(&status)
        .map_err(|_| Error::Internal(format!("Unparseable run status: {status}")))?;

    let submitted_at: String = row.get("submitted_at");
    let submitted_at = parse_timestamp(&submitted_at)?;

    let resolved_at: Option<String> = row.get("resolved_at");
    let resolved_at = resolved_at.as_deref().map(parse_timestamp).transpose()?;

    Ok(TrainingRun {
        job_id: row.get("job_id"),
        status,
        submitted_at,
        resolved_at,
        quarantine_key: row.get("quarantine_key"),
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn setup() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn save_and_load_run() {
        let pool = setup().await;
        let run = TrainingRun::submitted("rec-1");
        save_run(&pool, &run).await.unwrap();

        let loaded = load_run(&pool, "rec-1").await.unwrap().unwrap();
        assert_eq!(loaded.job_id, "rec-1");
        assert_eq!(loaded.status, JobStatus::Submitted);
        assert!(loaded.resolved_at.is_none());
    }

    #[tokio::test]
    async fn resolve_marks_terminal_state() {
        let pool = setup().await;
        save_run(&pool, &TrainingRun::submitted("rec-1")).await.unwrap();

        resolve_run(&pool, "rec-1", JobStatus::InError, Some("lists/ERRORED_ENTITY_LIST_12345_e.csv"))
            .await
            .unwrap();

        let loaded = load_run(&pool, "rec-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::InError);
        assert!(loaded.resolved_at.is_some());
        assert!(loaded.quarantine_key.unwrap().contains("ERRORED_ENTITY_LIST"));
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let pool = setup().await;
        let mut first = TrainingRun::submitted("rec-1");
        first.submitted_at = Utc::now() - chrono::Duration::hours(1);
        save_run(&pool, &first).await.unwrap();
        save_run(&pool, &TrainingRun::submitted("rec-2")).await.unwrap();

        let runs = list_runs(&pool).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].job_id, "rec-2");
    }
}
