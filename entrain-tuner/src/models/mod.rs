//! Data models for the Model Tuner

pub mod entity_record;
pub mod review;
pub mod training_job;

pub use entity_record::{EntityList, EntityRecord, ENTITY_LIST_HEADER};
pub use review::{ReviewNotice, ReviewOutput};
pub use training_job::{JobStatus, TrainingRun};
