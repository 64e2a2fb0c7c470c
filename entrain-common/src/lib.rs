//! Shared types for the Entrain services
//!
//! Provides the common error taxonomy and the event bus used by the
//! Model Tuner microservice.

pub mod error;
pub mod events;

pub use error::{Error, Result};
