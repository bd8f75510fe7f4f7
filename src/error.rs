//! Error types for examforge operations.
//!
//! Defines error types for the major subsystems:
//! - Topic usage event store access
//! - Question generation through the agent runtime
//! - Webhook notification delivery

use thiserror::Error;

/// Errors that can occur when talking to the topic usage event store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Event store unavailable: {0}")]
    Unavailable(String),

    #[error("Event store rejected the request ({code}): {message}")]
    Rejected { code: u16, message: String },

    #[error("Failed to decode event store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors that can occur during question generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Missing runtime endpoint: EXAMFORGE_RUNTIME_ENDPOINT environment variable not set")]
    MissingEndpoint,

    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    #[error("Generation runtime returned an error ({code}): {message}")]
    RuntimeError { code: u16, message: String },

    #[error("Failed to parse generated question: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during webhook notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing notification configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Webhook rejected the delivery (HTTP {status}): {body}")]
    DeliveryRejected { status: u16, body: String },

    #[error("Webhook delivery timed out after {seconds} seconds")]
    DeliveryTimeout { seconds: u64 },

    #[error("Webhook delivery failed: {0}")]
    DeliveryError(String),
}
