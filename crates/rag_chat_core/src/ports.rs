//! crates/rag_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) the chat front end depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the HTTP client and of the platform clipboard.

use async_trait::async_trait;

use crate::domain::{
    BackendStatus, ChatReply, ConversationHistory, DocumentDetail, DocumentSummary, UploadReceipt,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The request never completed (connection refused, reset, DNS, ...).
    #[error("Network error: {0}")]
    Transport(String),
    /// The backend answered with a non-2xx status and a `detail` message.
    #[error("{detail}")]
    Backend { status: u16, detail: String },
    /// The backend answered 2xx but the body did not have the expected shape.
    #[error("Unexpected response payload: {0}")]
    Payload(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The message shown to the user, falling back to `default` when the
    /// backend gave no usable detail.
    pub fn user_detail(&self, default: &str) -> String {
        match self {
            PortError::Backend { detail, .. } if !detail.trim().is_empty() => detail.clone(),
            PortError::Backend { .. } => default.to_string(),
            PortError::NotFound(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The REST surface of the RAG backend.
#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn upload_document(&self, file_name: &str, bytes: Vec<u8>) -> PortResult<UploadReceipt>;

    async fn list_documents(&self) -> PortResult<Vec<DocumentSummary>>;

    async fn get_document(&self, document_id: &str) -> PortResult<DocumentDetail>;

    async fn delete_document(&self, document_id: &str) -> PortResult<()>;

    /// Removes every document from the backend.
    async fn clear_documents(&self) -> PortResult<()>;

    async fn status(&self) -> PortResult<BackendStatus>;

    /// Sends a user message together with the history the backend should use.
    async fn chat(&self, message: &str, history: &ConversationHistory) -> PortResult<ChatReply>;
}

/// Writes text to the user's clipboard.
pub trait ClipboardService: Send + Sync {
    fn copy_text(&self, text: &str) -> PortResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_detail_is_shown_verbatim() {
        let err = PortError::Backend {
            status: 400,
            detail: "File type exe not supported".to_string(),
        };
        assert_eq!(err.user_detail("Upload failed"), "File type exe not supported");
    }

    #[test]
    fn blank_backend_detail_uses_default() {
        let err = PortError::Backend {
            status: 500,
            detail: "  ".to_string(),
        };
        assert_eq!(err.user_detail("Chat request failed"), "Chat request failed");
    }

    #[test]
    fn not_found_shows_its_detail() {
        let err = PortError::NotFound("Document not found".to_string());
        assert_eq!(err.user_detail("Failed to load document"), "Document not found");
    }

    #[test]
    fn transport_error_describes_itself() {
        let err = PortError::Transport("connection refused".to_string());
        assert_eq!(err.user_detail("Upload failed"), "Network error: connection refused");
    }
}
