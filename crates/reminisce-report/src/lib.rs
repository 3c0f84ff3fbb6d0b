//! reminisce-report — progress analytics and rendering.
//!
//! Summarizes stored quiz history and mastery state into a per-patient
//! progress view, with JSON persistence and a Markdown renderer.

pub mod markdown;
pub mod summary;

pub use markdown::generate_markdown;
pub use summary::{analytics_summary, summary_at, AnalyticsSummary};
