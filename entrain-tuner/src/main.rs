//! entrain-tuner - Model Tuner microservice
//!
//! Folds human-review corrections into the entity training list and
//! drives recognizer retraining to completion: reconcile on review
//! completion, submit when the list changed, poll the training job,
//! promote on success, quarantine on failure.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use entrain_common::events::EventBus;
use entrain_tuner::config::TunerConfig;
use entrain_tuner::db::params::TunerParams;
use entrain_tuner::services::HttpRecognizerClient;
use entrain_tuner::services::TrainingLifecycle;
use entrain_tuner::stores::{FsObjectStore, ObjectStore};
use entrain_tuner::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting entrain-tuner (Model Tuner) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve service configuration (ENV over TOML over defaults)
    let config = TunerConfig::resolve()?;
    info!("Data directory: {}", config.data_dir.display());

    // Open or create the database
    let db_pool = entrain_tuner::db::init_database_pool(&config.database_path()).await?;
    info!("Database connection established");

    // Load static domain parameters; the service refuses to start
    // without them
    let params = TunerParams::load(&db_pool).await?;
    info!(
        review_flow_id = %params.review_flow_id,
        entity_list = %params.entity_list_location,
        "Tuner parameters loaded"
    );

    // Collaborators: filesystem object store + HTTP recognizer client
    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(config.store_root()));
    let recognizer = Arc::new(HttpRecognizerClient::new(config.recognizer_url.clone())?);

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    // Lifecycle controller
    let lifecycle = TrainingLifecycle::new(
        db_pool.clone(),
        store,
        recognizer,
        event_bus.clone(),
        params,
        Duration::from_secs(config.poll_interval_secs),
    );

    // Resume completion polling if a training job was in flight when the
    // previous process stopped
    if lifecycle.resume_if_active().await? {
        info!("Completion polling resumed for in-flight training job");
    }

    // Build router and serve
    let state = AppState::new(db_pool, event_bus, lifecycle);
    let app = entrain_tuner::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
