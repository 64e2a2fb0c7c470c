//! Event types for the Entrain event system
//!
//! Provides the shared event definitions and EventBus used by the Model
//! Tuner. Events are broadcast in-process and serialized for SSE
//! transmission to connected clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entrain event types
///
/// All events flow through this central enum for type safety and
/// exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TunerEvent {
    /// A matching human review completed and its output was accepted
    /// for reconciliation
    ReviewCompleted {
        /// Object-store key of the review output document
        output_location: String,
        /// When the notification was processed
        timestamp: DateTime<Utc>,
    },

    /// A review notification was ignored (wrong flow, or not completed)
    ReviewIgnored {
        /// Review flow identifier carried by the notification
        flow_id: String,
        /// Review status carried by the notification
        status: String,
        /// When the notification was processed
        timestamp: DateTime<Utc>,
    },

    /// Reconciliation of reviewer annotations against the working entity
    /// list finished
    ReconciliationCompleted {
        /// Entities added by this reconciliation pass
        new_entities: usize,
        /// Total entities in the merged working list
        total_entities: usize,
        /// Whether the merged list warrants retraining
        retraining_required: bool,
        /// When reconciliation finished
        timestamp: DateTime<Utc>,
    },

    /// A training job was submitted to the recognizer service
    TrainingSubmitted {
        /// Identifier of the submitted job (doubles as recognizer id)
        job_id: String,
        /// Distinct entity types covered by the training list
        entity_types: Vec<String>,
        /// When the job was submitted
        timestamp: DateTime<Utc>,
    },

    /// A poll tick observed a still-running training job (no transition)
    TrainingPolled {
        /// Identifier of the polled job
        job_id: String,
        /// Status reported by the recognizer service
        status: String,
        /// When the poll ran
        timestamp: DateTime<Utc>,
    },

    /// A trained model was promoted to active
    ModelPromoted {
        /// Identifier of the newly active recognizer
        recognizer_id: String,
        /// Identifier of the recognizer it replaced, if any
        previous_recognizer_id: Option<String>,
        /// When promotion completed
        timestamp: DateTime<Utc>,
    },

    /// A training job failed and its entity list was quarantined
    TrainingFailed {
        /// Identifier of the failed job
        job_id: String,
        /// Object-store key the working list was quarantined under
        quarantine_key: String,
        /// When the failure was handled
        timestamp: DateTime<Utc>,
    },

    /// Completion polling started (gate opened)
    PollingStarted {
        /// When the gate opened
        timestamp: DateTime<Utc>,
    },

    /// Completion polling stopped (gate closed)
    PollingStopped {
        /// When the gate closed
        timestamp: DateTime<Utc>,
    },
}

impl TunerEvent {
    /// Event type name for SSE event framing
    pub fn event_type(&self) -> &str {
        match self {
            TunerEvent::ReviewCompleted { .. } => "ReviewCompleted",
            TunerEvent::ReviewIgnored { .. } => "ReviewIgnored",
            TunerEvent::ReconciliationCompleted { .. } => "ReconciliationCompleted",
            TunerEvent::TrainingSubmitted { .. } => "TrainingSubmitted",
            TunerEvent::TrainingPolled { .. } => "TrainingPolled",
            TunerEvent::ModelPromoted { .. } => "ModelPromoted",
            TunerEvent::TrainingFailed { .. } => "TrainingFailed",
            TunerEvent::PollingStarted { .. } => "PollingStarted",
            TunerEvent::PollingStopped { .. } => "PollingStopped",
        }
    }
}

/// In-process event broadcaster
///
/// Wraps a tokio broadcast channel. Cloning shares the underlying
/// channel, so one bus can be handed to every component.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TunerEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// Older events are dropped for lagging subscribers once the buffer
    /// fills.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<TunerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring whether any subscriber is listening
    ///
    /// Events are advisory; no component depends on receiving them.
    pub fn emit_lossy(&self, event: TunerEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
