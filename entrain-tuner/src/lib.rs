//! entrain-tuner library interface
//!
//! The Model Tuner keeps a custom entity recognizer in step with human
//! review: completed reviews are reconciled into the training entity
//! list, and the model is retrained only when the list genuinely
//! changed. Exposed as a library for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod stores;

pub use crate::error::{ApiError, ApiResult};

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use entrain_common::events::EventBus;
use sqlx::SqlitePool;

use crate::services::TrainingLifecycle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Training lifecycle controller
    pub lifecycle: TrainingLifecycle,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, lifecycle: TrainingLifecycle) -> Self {
        Self {
            db,
            event_bus,
            lifecycle,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::review_routes())
        .merge(api::training_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state)
}
