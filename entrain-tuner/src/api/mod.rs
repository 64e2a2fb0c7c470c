//! HTTP API handlers for the Model Tuner

pub mod health;
pub mod review;
pub mod sse;
pub mod training;

pub use health::health_routes;
pub use review::review_routes;
pub use sse::event_stream;
pub use training::training_routes;
