//! Error types for the RustCrew domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type. Only failures that abort
//! a task reach the top-level [`Error`]; tool failures are folded into the
//! agent's result text.
//!
//! "No suitable agent" is deliberately absent: routing misses are a normal
//! outcome and are reported as a message, not as an error.

use thiserror::Error;

/// The top-level error type for all RustCrew operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion service errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Task execution errors ---
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// The completion service was unreachable or rejected the request.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures scoped to a single tool call.
///
/// The agent folds these into its result text instead of propagating them.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },
}

/// Failures of a whole task or of the crew's synthesis step.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("Agent {agent} received neither text nor tool calls ({stage} response)")]
    UnexpectedResponse { agent: String, stage: &'static str },

    #[error("Agent {agent} produced no result")]
    EmptyResult { agent: String },

    #[error("No summary was produced for crew goal: {goal}")]
    NoSummary { goal: String },

    #[error("Crew has no completion service configured")]
    NoCrewModel,
}
