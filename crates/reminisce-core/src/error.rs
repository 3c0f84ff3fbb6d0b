//! Error taxonomy for the core engine and generation collaborators.
//!
//! `GeneratorError` is defined here so the quiz assembler can classify
//! provider failures without string matching; every generator failure is
//! recovered locally via fallback drafting and never reaches the caller.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the session orchestrator. Each one rejects the
/// whole request; no partial processing happens.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// A submission referenced a question id outside the session.
    #[error("unknown question id: {0}")]
    QuestionNotFound(Uuid),

    /// The session was already scored; resubmission is rejected rather
    /// than silently double-scoring mastery.
    #[error("session {0} is already completed")]
    SessionCompleted(Uuid),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Errors from a question-generation collaborator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The configured deployment or model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The provider answered but the structured output did not match the
    /// question schema.
    #[error("malformed generator output: {0}")]
    Malformed(String),
}
