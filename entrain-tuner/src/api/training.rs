//! Training lifecycle endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::runs;
use crate::error::ApiResult;
use crate::models::TrainingRun;
use crate::services::{LifecycleStatus, PollOutcome};
use crate::AppState;

/// Training history response
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub runs: Vec<TrainingRun>,
}

/// GET /training/status
///
/// Current job slot, gate state, and active recognizer.
pub async fn training_status(State(state): State<AppState>) -> ApiResult<Json<LifecycleStatus>> {
    Ok(Json(state.lifecycle.status().await?))
}

/// POST /training/poll
///
/// Manual poll step, equivalent to one gate tick. Useful for operators
/// and for driving the state machine without waiting out the interval.
pub async fn training_poll(State(state): State<AppState>) -> ApiResult<Json<PollOutcome>> {
    let outcome = state.lifecycle.poll_once().await?;
    Ok(Json(outcome))
}

/// GET /training/history
///
/// All recorded training runs, newest submission first.
pub async fn training_history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    let runs = runs::list_runs(&state.db).await?;
    Ok(Json(HistoryResponse { runs }))
}

/// Build training routes
pub fn training_routes() -> Router<AppState> {
    Router::new()
        .route("/training/status", get(training_status))
        .route("/training/poll", post(training_poll))
        .route("/training/history", get(training_history))
}
