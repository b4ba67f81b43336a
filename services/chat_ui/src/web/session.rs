//! services/chat_ui/src/web/session.rs
//!
//! The explicit application state of the chat page: scrollback, the history the
//! backend has seen, per-message inspectors, modals, the last good panels and
//! the upload queue.
//!
//! `ChatSession` is plain data. The task modules lock it, read or mutate it,
//! and release the lock before awaiting the backend.

use rag_chat_core::domain::{ContextMetrics, ConversationHistory, Message, PendingUpload};
use rag_chat_core::inspector::ChunkInspector;
use rag_chat_core::modal::{ModalKind, Modals};
use rag_chat_core::status::{DocumentPanel, StatusPanel};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str = "Welcome to the RAG Experimentation System!\n\nUpload documents and start chatting. The system will automatically switch between full context mode (<10k tokens) and RAG mode (≥10k tokens).";

//=========================================================================================
// Update (what a task changed)
//=========================================================================================

/// Describes what a task changed, so the web layer knows which fragments to emit.
#[derive(Debug, Default)]
pub struct Update {
    /// Messages appended to the scrollback, in order.
    pub appended: Vec<Message>,
    pub documents_changed: bool,
    pub status_changed: bool,
    pub modals_changed: bool,
    /// A blocking notice for the user (`window.alert` equivalent).
    pub alert: Option<String>,
    /// The scrollback was replaced wholesale.
    pub reset: bool,
    /// Uploads whose transient progress entry can be removed.
    pub finished_uploads: Vec<Uuid>,
}

//=========================================================================================
// ChatSession
//=========================================================================================

/// A chat message that was accepted but whose reply has not arrived yet.
#[derive(Debug, Clone)]
struct PendingSend {
    id: Uuid,
    text: String,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<Message>,
    history: ConversationHistory,
    inspectors: HashMap<Uuid, ChunkInspector>,
    modals: Modals,
    documents: DocumentPanel,
    documents_error: Option<String>,
    status: Option<StatusPanel>,
    status_error: Option<String>,
    upload_queue: VecDeque<PendingUpload>,
    /// The running drain, if any. At most one drain pops the queue.
    drain: Option<Uuid>,
    pending_send: Option<PendingSend>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::system(WELCOME_MESSAGE)],
            history: ConversationHistory::new(),
            inspectors: HashMap::new(),
            modals: Modals::new(),
            documents: DocumentPanel::default(),
            documents_error: None,
            status: None,
            status_error: None,
            upload_queue: VecDeque::new(),
            drain: None,
            pending_send: None,
        }
    }

    // --- Scrollback ---

    /// Appends a message and, for RAG answers with chunks, its inspector.
    /// Returns a copy for rendering.
    pub fn push(&mut self, message: Message) -> Message {
        if message.has_chunks() {
            self.inspectors
                .insert(message.id, ChunkInspector::new(message.chunks.clone()));
        }
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn inspector(&self, message_id: Uuid) -> Option<&ChunkInspector> {
        self.inspectors.get(&message_id)
    }

    pub fn inspector_mut(&mut self, message_id: Uuid) -> Option<&mut ChunkInspector> {
        self.inspectors.get_mut(&message_id)
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Clears scrollback, history, inspectors and the chunk modal, and shows
    /// the welcome message again. Uploads and panels are left alone.
    pub fn reset_conversation(&mut self) {
        self.history.clear();
        self.inspectors.clear();
        self.modals.close(ModalKind::Chunk);
        self.messages = vec![Message::system(WELCOME_MESSAGE)];
    }

    // --- Sending ---

    /// Accepts a chat message. Returns `None` for blank input or while another
    /// send is still waiting for its reply.
    pub fn begin_send(&mut self, text: &str) -> Option<Message> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.pending_send.is_some() {
            return None;
        }
        let message = self.push(Message::user(trimmed));
        self.pending_send = Some(PendingSend {
            id: message.id,
            text: trimmed.to_string(),
        });
        Some(message)
    }

    /// The text and a history snapshot for the pending send `id`.
    pub fn pending_request(&self, id: Uuid) -> Option<(String, ConversationHistory)> {
        self.pending_send
            .as_ref()
            .filter(|pending| pending.id == id)
            .map(|pending| (pending.text.clone(), self.history.clone()))
    }

    pub fn finish_send(&mut self, id: Uuid) {
        if self.pending_send.as_ref().is_some_and(|pending| pending.id == id) {
            self.pending_send = None;
        }
    }

    pub fn is_sending(&self) -> bool {
        self.pending_send.is_some()
    }

    /// The user message still waiting for its reply.
    pub fn pending_send_id(&self) -> Option<Uuid> {
        self.pending_send.as_ref().map(|pending| pending.id)
    }

    /// Records a completed exchange in the history sent on the next call.
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        self.history.record_exchange(question, answer);
    }

    // --- Uploads ---

    /// Queues files in order. Returns the id of a new drain the caller must
    /// run, or `None` when a running drain will pick them up.
    pub fn enqueue_uploads(&mut self, files: Vec<PendingUpload>) -> Option<Uuid> {
        if files.is_empty() {
            return None;
        }
        self.upload_queue.extend(files);
        match self.drain {
            Some(_) => None,
            None => {
                let id = Uuid::new_v4();
                self.drain = Some(id);
                Some(id)
            }
        }
    }

    /// Pops the next queued file. Ends the drain when the queue is empty.
    pub fn next_upload(&mut self) -> Option<PendingUpload> {
        let next = self.upload_queue.pop_front();
        if next.is_none() {
            self.drain = None;
        }
        next
    }

    pub fn is_draining(&self) -> bool {
        self.drain.is_some()
    }

    pub fn active_drain(&self) -> Option<Uuid> {
        self.drain
    }

    pub fn queued_uploads(&self) -> impl Iterator<Item = &PendingUpload> {
        self.upload_queue.iter()
    }

    // --- Panels ---

    pub fn set_documents(&mut self, panel: DocumentPanel) {
        self.documents = panel;
        self.documents_error = None;
    }

    /// Keeps the last good list and records the failure.
    pub fn fail_documents(&mut self, message: impl Into<String>) {
        self.documents_error = Some(message.into());
    }

    pub fn documents(&self) -> &DocumentPanel {
        &self.documents
    }

    pub fn documents_error(&self) -> Option<&str> {
        self.documents_error.as_deref()
    }

    pub fn set_status(&mut self, panel: StatusPanel) {
        self.status = Some(panel);
        self.status_error = None;
    }

    pub fn fail_status(&mut self, message: impl Into<String>) {
        self.status_error = Some(message.into());
    }

    /// Updates only the progress bar from a chat reply's metrics.
    pub fn apply_metrics(&mut self, metrics: &ContextMetrics) {
        if let Some(status) = self.status.take() {
            self.status = Some(status.with_metrics(metrics));
        }
    }

    pub fn status(&self) -> Option<&StatusPanel> {
        self.status.as_ref()
    }

    pub fn status_error(&self) -> Option<&str> {
        self.status_error.as_deref()
    }

    // --- Modals ---

    pub fn modals(&self) -> &Modals {
        &self.modals
    }

    pub fn modals_mut(&mut self) -> &mut Modals {
        &mut self.modals
    }
}
