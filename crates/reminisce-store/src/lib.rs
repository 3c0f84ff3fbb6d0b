//! reminisce-store — the persistence collaborator.
//!
//! Implements the core `Store` trait over in-memory maps, with a JSON
//! snapshot format so CLI invocations keep durable state between runs.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;
