//! Durable-state collaborators
//!
//! All coordination between invocations goes through these stores: the
//! object store holds entity-list snapshots and review output documents,
//! the state store holds the controller's dynamic slots.

pub mod object_store;
pub mod state_store;

pub use object_store::{FsObjectStore, MemoryObjectStore, ObjectStore};
pub use state_store::{StateStore, TRAINING_JOB_IDLE};
