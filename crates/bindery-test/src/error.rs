//! Test error types.

use thiserror::Error;

/// Errors that can occur while building or sending a test request.
#[derive(Debug, Error)]
pub enum TestError {
    /// Request building failed
    #[error("request build error: {0}")]
    RequestBuild(String),
    /// Response body reading failed
    #[error("body read error: {0}")]
    BodyRead(String),
    /// Header name or value is invalid
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Form encoding failed
    #[error("form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
}
