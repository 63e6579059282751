//! Error types for the service

use thiserror::Error;

/// Result type alias for the service
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors reported by the key-value store
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The key-value store could not be reached at all
    #[error("Key-value store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Session lookups that must find a session
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Admin authorization failures
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
