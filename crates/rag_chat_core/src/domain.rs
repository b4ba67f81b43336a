//! crates/rag_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the chat front end.
//! These structs are independent of any wire or serialization format; the
//! HTTP adapter maps the backend's JSON records onto them.

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

/// Who authored a message or history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// The lowercase name used both in CSS classes and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// The backend's operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    FullContext,
    Rag,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::FullContext => "full_context",
            Mode::Rag => "rag",
        }
    }

    /// `full_context` -> `full context`, as shown in message metadata.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// Which token budget the context fill percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitType {
    DocumentLimit,
    RagLimit,
}

/// A scored, attributed excerpt of a source document returned as retrieval evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub document_name: String,
    pub content: String,
    pub similarity_score: f64,
    pub chunk_index: usize,
}

/// One rendered entry of the scrollback. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
    pub is_error: bool,
    pub metadata: Option<String>,
    pub chunks: Vec<Chunk>,
    pub mode: Option<Mode>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Local::now(),
            is_error,
            metadata: None,
            chunks: Vec::new(),
            mode: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, false)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, false)
    }

    pub fn system_error(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, true)
    }

    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, true)
    }

    /// Builds an assistant reply. Chunks are kept only for RAG answers, so a
    /// message carries chunks iff its mode is `Rag` and retrieval returned any.
    pub fn assistant(
        content: impl Into<String>,
        mode: Mode,
        metadata: Option<String>,
        chunks: Vec<Chunk>,
    ) -> Self {
        let mut message = Self::new(Role::Assistant, content, false);
        message.mode = Some(mode);
        message.metadata = metadata;
        if mode == Mode::Rag {
            message.chunks = chunks;
        }
        message
    }

    /// Whether the chunk inspector belongs under this message.
    pub fn has_chunks(&self) -> bool {
        self.mode == Some(Mode::Rag) && !self.chunks.is_empty()
    }
}

/// A `{role, content}` pair as sent back to the backend on every chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// The conversation the backend has actually seen.
///
/// Entries are only ever appended as a completed user/assistant pair, so the
/// length is even whenever no send is in flight.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.push(HistoryEntry {
            role: Role::User,
            content: question.into(),
        });
        self.entries.push(HistoryEntry {
            role: Role::Assistant,
            content: answer.into(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context budget usage as reported by the backend. Never computed client-side.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMetrics {
    pub context_tokens_used: u64,
    pub max_context_tokens: u64,
    pub context_fill_percentage: f64,
    pub context_limit_type: LimitType,
}

/// A row of the document list.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub token_count: u64,
    pub upload_time: DateTime<Utc>,
}

/// The content shown in the document preview modal.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDetail {
    pub name: String,
    pub token_count: u64,
    pub upload_time: DateTime<Utc>,
    pub full_content_length: u64,
    pub content_preview: String,
}

/// The backend's answer to a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub name: String,
    pub token_count: u64,
    pub mode_switched_to_rag: bool,
    pub total_tokens: u64,
}

/// Global backend state polled for the status panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendStatus {
    pub current_mode: Mode,
    pub total_tokens: u64,
    pub total_documents: u64,
    pub context_metrics: ContextMetrics,
}

/// The backend's answer to a chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub mode: Mode,
    pub relevant_chunks_count: u64,
    pub context_tokens_used: u64,
    pub enhanced_query: Option<String>,
    pub relevant_chunks: Vec<Chunk>,
    pub context_metrics: ContextMetrics,
}

/// A file picked or dropped by the user, waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub id: Uuid,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PendingUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk {
            document_name: "notes.txt".to_string(),
            content: "some text".to_string(),
            similarity_score: 0.5,
            chunk_index: 0,
        }
    }

    #[test]
    fn full_context_reply_drops_chunks() {
        let message = Message::assistant("hi", Mode::FullContext, None, vec![chunk()]);
        assert!(message.chunks.is_empty());
        assert!(!message.has_chunks());
    }

    #[test]
    fn rag_reply_keeps_chunks() {
        let message = Message::assistant("hi", Mode::Rag, None, vec![chunk()]);
        assert!(message.has_chunks());
        let empty = Message::assistant("hi", Mode::Rag, None, Vec::new());
        assert!(!empty.has_chunks());
    }

    #[test]
    fn history_grows_in_pairs() {
        let mut history = ConversationHistory::new();
        history.record_exchange("q1", "a1");
        history.record_exchange("q2", "a2");
        assert_eq!(history.len(), 4);
        assert_eq!(history.entries()[0].role, Role::User);
        assert_eq!(history.entries()[3].role, Role::Assistant);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn mode_display_name_replaces_underscore() {
        assert_eq!(Mode::FullContext.display_name(), "full context");
        assert_eq!(Mode::Rag.display_name(), "rag");
    }
}
