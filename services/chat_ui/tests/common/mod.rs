//! Shared fixtures for the `chat_ui` integration tests: an in-memory RAG
//! backend that records every call, and a clipboard that never works.

#![allow(dead_code)]

use async_trait::async_trait;
use chat_ui_lib::config::Config;
use chat_ui_lib::web::state::AppState;
use chrono::{TimeZone, Utc};
use rag_chat_core::domain::{
    BackendStatus, ChatReply, Chunk, ContextMetrics, ConversationHistory, DocumentDetail,
    DocumentSummary, LimitType, Mode, UploadReceipt,
};
use rag_chat_core::ports::{ClipboardService, PortError, PortResult, RagBackend};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;

pub const RAG_THRESHOLD: u64 = 10_000;

/// Every uploaded byte counts as one token, which keeps thresholds easy to hit.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub documents: Mutex<Vec<DocumentSummary>>,
    /// History lengths seen by `chat`, in call order.
    pub seen_history: Mutex<Vec<usize>>,
    pub rejected_uploads: Mutex<HashSet<String>>,
    pub chunks_per_answer: Mutex<usize>,
    pub chat_down: Mutex<bool>,
    pub delete_down: Mutex<bool>,
    /// Added to every upload and chat call.
    pub latency: Mutex<Duration>,
    uploads_in_flight: AtomicUsize,
    max_uploads_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reject_upload(&self, name: &str) {
        self.rejected_uploads.lock().unwrap().insert(name.to_string());
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// The most uploads that were ever running at the same time.
    pub fn max_uploads_in_flight(&self) -> usize {
        self.max_uploads_in_flight.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn total_tokens(&self) -> u64 {
        self.documents.lock().unwrap().iter().map(|d| d.token_count).sum()
    }

    fn mode(&self) -> Mode {
        if self.total_tokens() >= RAG_THRESHOLD {
            Mode::Rag
        } else {
            Mode::FullContext
        }
    }

    fn metrics(&self) -> ContextMetrics {
        let used = self.total_tokens();
        let (max, limit) = match self.mode() {
            Mode::FullContext => (RAG_THRESHOLD, LimitType::DocumentLimit),
            Mode::Rag => (4_000, LimitType::RagLimit),
        };
        let used = used.min(max);
        ContextMetrics {
            context_tokens_used: used,
            max_context_tokens: max,
            context_fill_percentage: used as f64 / max as f64 * 100.0,
            context_limit_type: limit,
        }
    }
}

#[async_trait]
impl RagBackend for FakeBackend {
    async fn upload_document(&self, file_name: &str, bytes: Vec<u8>) -> PortResult<UploadReceipt> {
        self.record(format!("upload:{}", file_name));
        let running = self.uploads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_uploads_in_flight.fetch_max(running, Ordering::SeqCst);
        self.pause().await;
        self.uploads_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.rejected_uploads.lock().unwrap().contains(file_name) {
            return Err(PortError::Backend {
                status: 400,
                detail: "File type not supported".to_string(),
            });
        }

        let before = self.total_tokens();
        let token_count = bytes.len() as u64;
        let mut documents = self.documents.lock().unwrap();
        let id = format!("doc-{}", documents.len() + 1);
        documents.push(DocumentSummary {
            id,
            name: file_name.to_string(),
            token_count,
            upload_time: Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap(),
        });
        drop(documents);

        let total_tokens = before + token_count;
        Ok(UploadReceipt {
            name: file_name.to_string(),
            token_count,
            mode_switched_to_rag: before < RAG_THRESHOLD && total_tokens >= RAG_THRESHOLD,
            total_tokens,
        })
    }

    async fn list_documents(&self) -> PortResult<Vec<DocumentSummary>> {
        self.record("documents");
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn get_document(&self, document_id: &str) -> PortResult<DocumentDetail> {
        self.record(format!("get:{}", document_id));
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == document_id)
            .map(|d| DocumentDetail {
                name: d.name.clone(),
                token_count: d.token_count,
                upload_time: d.upload_time,
                full_content_length: d.token_count * 4,
                content_preview: "# Heading\nSome **bold** text".to_string(),
            })
            .ok_or_else(|| PortError::NotFound("Document not found".to_string()))
    }

    async fn delete_document(&self, document_id: &str) -> PortResult<()> {
        self.record(format!("delete:{}", document_id));
        if *self.delete_down.lock().unwrap() {
            return Err(PortError::Transport("connection refused".to_string()));
        }
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| d.id != document_id);
        if documents.len() == before {
            return Err(PortError::NotFound("Document not found".to_string()));
        }
        Ok(())
    }

    async fn clear_documents(&self) -> PortResult<()> {
        self.record("clear");
        self.documents.lock().unwrap().clear();
        Ok(())
    }

    async fn status(&self) -> PortResult<BackendStatus> {
        self.record("status");
        let total_documents = self.documents.lock().unwrap().len() as u64;
        Ok(BackendStatus {
            current_mode: self.mode(),
            total_tokens: self.total_tokens(),
            total_documents,
            context_metrics: self.metrics(),
        })
    }

    async fn chat(&self, message: &str, history: &ConversationHistory) -> PortResult<ChatReply> {
        self.record("chat");
        self.seen_history.lock().unwrap().push(history.len());
        self.pause().await;
        if *self.chat_down.lock().unwrap() {
            return Err(PortError::Transport("connection refused".to_string()));
        }

        let mode = self.mode();
        let relevant_chunks: Vec<Chunk> = match mode {
            Mode::Rag => (0..*self.chunks_per_answer.lock().unwrap())
                .map(|i| Chunk {
                    document_name: "big.txt".to_string(),
                    content: format!("Passage {} about {}", i, message),
                    similarity_score: 0.9 - i as f64 * 0.05,
                    chunk_index: i,
                })
                .collect(),
            Mode::FullContext => Vec::new(),
        };
        let metrics = self.metrics();

        Ok(ChatReply {
            response: format!("Answer to: {}", message),
            mode,
            relevant_chunks_count: relevant_chunks.len() as u64,
            context_tokens_used: metrics.context_tokens_used,
            enhanced_query: None,
            relevant_chunks,
            context_metrics: metrics,
        })
    }
}

pub struct UnavailableClipboard;

impl ClipboardService for UnavailableClipboard {
    fn copy_text(&self, _text: &str) -> PortResult<()> {
        Err(PortError::Unexpected("no clipboard on this host".to_string()))
    }
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        rag_api_base: "http://127.0.0.1:9".to_string(),
        log_level: Level::DEBUG,
        max_upload_bytes: 1024 * 1024,
        allowed_origin: "http://127.0.0.1:3000".to_string(),
    }
}

/// Polls `condition` until it holds or a few seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

pub fn app_state(backend: Arc<FakeBackend>) -> Arc<AppState> {
    Arc::new(AppState::new(
        backend,
        Arc::new(UnavailableClipboard),
        Arc::new(test_config()),
    ))
}
