//! Review-completion webhook

use axum::{extract::State, routing::post, Json, Router};

use crate::error::ApiResult;
use crate::models::ReviewNotice;
use crate::services::ReviewOutcome;
use crate::AppState;

/// POST /review/completed
///
/// Entry point for the external review system's completion
/// notifications. Notifications for other review flows, or for reviews
/// that did not complete, are acknowledged but ignored.
pub async fn review_completed(
    State(state): State<AppState>,
    Json(notice): Json<ReviewNotice>,
) -> ApiResult<Json<ReviewOutcome>> {
    tracing::info!(
        flow_id = %notice.flow_id,
        status = %notice.status,
        output_location = %notice.output_location,
        "Review notification received"
    );

    let outcome = state.lifecycle.handle_review_completed(&notice).await?;
    Ok(Json(outcome))
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/review/completed", post(review_completed))
}
