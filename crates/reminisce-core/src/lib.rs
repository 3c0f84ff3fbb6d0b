//! reminisce-core — scheduling, quiz assembly, and scoring engine.
//!
//! This crate defines the data model, collaborator traits, and the
//! mastery/spaced-repetition logic that the rest of the reminisce system
//! builds on.

pub mod assemble;
pub mod due;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod parser;
pub mod schedule;
pub mod session;
pub mod traits;
