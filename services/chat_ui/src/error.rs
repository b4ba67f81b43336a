//! services/chat_ui/src/error.rs
//!
//! Defines the primary error type for the chat front-end service.

use crate::config::ConfigError;

/// The primary error type for the `chat_ui` service.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the HTTP client used to reach the RAG backend.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
