//! Model Tuner services

pub mod lifecycle;
pub mod polling_gate;
pub mod reconciler;
pub mod recognizer;
pub mod staging;

pub use lifecycle::{LifecycleStatus, PollOutcome, ReviewOutcome, TrainingLifecycle};
pub use polling_gate::PollingGate;
pub use reconciler::{reconcile, Reconciliation};
pub use recognizer::{HttpRecognizerClient, RecognizerClient, TrainingRequest};
pub use staging::EntityListStaging;
