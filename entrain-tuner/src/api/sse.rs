//! Server-Sent Events stream of tuner events

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::AppState;

/// GET /events - SSE stream of all tuner events
///
/// Streams every `TunerEvent` (review handling, reconciliation, training
/// lifecycle, polling gate) as it is broadcast.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected");

    let mut rx = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        loop {
            tokio::select! {
                // Heartbeat so idle connections stay alive through proxies
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    yield Ok(Event::default().comment("heartbeat"));
                }

                result = rx.recv() => {
                    match result {
                        Ok(event) => {
                            let event_type = event.event_type().to_string();
                            match serde_json::to_string(&event) {
                                Ok(event_json) => {
                                    debug!("SSE: broadcasting {}", event_type);
                                    yield Ok(Event::default()
                                        .event(event_type)
                                        .data(event_json));
                                }
                                Err(e) => {
                                    warn!("SSE: failed to serialize {}: {}", event_type, e);
                                }
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("SSE client lagged; {} events dropped", skipped);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new().interval(Duration::from_secs(15)),
    )
}
