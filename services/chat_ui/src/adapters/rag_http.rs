//! services/chat_ui/src/adapters/rag_http.rs
//!
//! This module contains the HTTP adapter for the RAG backend's REST API.
//! It implements the `RagBackend` port from the `core` crate using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rag_chat_core::domain::{
    BackendStatus, ChatReply, Chunk, ContextMetrics, ConversationHistory, DocumentDetail,
    DocumentSummary, LimitType, Mode, UploadReceipt,
};
use rag_chat_core::ports::{PortError, PortResult, RagBackend};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `RagBackend` port over HTTP.
///
/// No request timeout is configured: a slow chat or upload simply waits.
#[derive(Clone)]
pub struct HttpRagBackend {
    client: Client,
    base_url: String,
}

impl HttpRagBackend {
    /// Creates a new `HttpRagBackend` for a base address without a trailing slash.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// "Impure" Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct ErrorRecord {
    detail: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct HistoryRecord<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequestRecord<'a> {
    message: &'a str,
    conversation_history: Vec<HistoryRecord<'a>>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum ModeRecord {
    FullContext,
    Rag,
}
impl ModeRecord {
    fn to_domain(self) -> Mode {
        match self {
            ModeRecord::FullContext => Mode::FullContext,
            ModeRecord::Rag => Mode::Rag,
        }
    }
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum LimitTypeRecord {
    DocumentLimit,
    RagLimit,
}

#[derive(Deserialize)]
struct ContextMetricsRecord {
    context_tokens_used: u64,
    max_context_tokens: u64,
    context_fill_percentage: f64,
    context_limit_type: LimitTypeRecord,
}
impl ContextMetricsRecord {
    fn to_domain(self) -> ContextMetrics {
        ContextMetrics {
            context_tokens_used: self.context_tokens_used,
            max_context_tokens: self.max_context_tokens,
            context_fill_percentage: self.context_fill_percentage,
            context_limit_type: match self.context_limit_type {
                LimitTypeRecord::DocumentLimit => LimitType::DocumentLimit,
                LimitTypeRecord::RagLimit => LimitType::RagLimit,
            },
        }
    }
}

#[derive(Deserialize)]
struct UploadRecord {
    name: String,
    token_count: u64,
    mode_switched_to_rag: bool,
    total_tokens: u64,
}
impl UploadRecord {
    fn to_domain(self) -> UploadReceipt {
        UploadReceipt {
            name: self.name,
            token_count: self.token_count,
            mode_switched_to_rag: self.mode_switched_to_rag,
            total_tokens: self.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct DocumentRecord {
    id: String,
    name: String,
    token_count: u64,
    upload_time: String,
}
impl DocumentRecord {
    fn to_domain(self) -> PortResult<DocumentSummary> {
        Ok(DocumentSummary {
            upload_time: parse_upload_time(&self.upload_time)?,
            id: self.id,
            name: self.name,
            token_count: self.token_count,
        })
    }
}

#[derive(Deserialize)]
struct DocumentListRecord {
    documents: Vec<DocumentRecord>,
}

#[derive(Deserialize)]
struct DocumentDetailRecord {
    name: String,
    token_count: u64,
    upload_time: String,
    full_content_length: u64,
    content_preview: String,
}
impl DocumentDetailRecord {
    fn to_domain(self) -> PortResult<DocumentDetail> {
        Ok(DocumentDetail {
            upload_time: parse_upload_time(&self.upload_time)?,
            name: self.name,
            token_count: self.token_count,
            full_content_length: self.full_content_length,
            content_preview: self.content_preview,
        })
    }
}

#[derive(Deserialize)]
struct StatusRecord {
    current_mode: ModeRecord,
    total_tokens: u64,
    total_documents: u64,
    context_metrics: ContextMetricsRecord,
}
impl StatusRecord {
    fn to_domain(self) -> BackendStatus {
        BackendStatus {
            current_mode: self.current_mode.to_domain(),
            total_tokens: self.total_tokens,
            total_documents: self.total_documents,
            context_metrics: self.context_metrics.to_domain(),
        }
    }
}

#[derive(Deserialize)]
struct ChunkRecord {
    document_name: String,
    content: String,
    similarity_score: f64,
    chunk_index: usize,
}
impl ChunkRecord {
    fn to_domain(self) -> Chunk {
        Chunk {
            document_name: self.document_name,
            content: self.content,
            similarity_score: self.similarity_score,
            chunk_index: self.chunk_index,
        }
    }
}

#[derive(Deserialize)]
struct ChatRecord {
    response: String,
    mode: ModeRecord,
    #[serde(default)]
    relevant_chunks_count: u64,
    #[serde(default)]
    context_tokens_used: u64,
    #[serde(default)]
    enhanced_query: Option<String>,
    #[serde(default)]
    relevant_chunks: Option<Vec<ChunkRecord>>,
    context_metrics: ContextMetricsRecord,
}
impl ChatRecord {
    fn to_domain(self) -> ChatReply {
        ChatReply {
            response: self.response,
            mode: self.mode.to_domain(),
            relevant_chunks_count: self.relevant_chunks_count,
            context_tokens_used: self.context_tokens_used,
            enhanced_query: self.enhanced_query,
            relevant_chunks: self
                .relevant_chunks
                .unwrap_or_default()
                .into_iter()
                .map(ChunkRecord::to_domain)
                .collect(),
            context_metrics: self.context_metrics.to_domain(),
        }
    }
}

/// The backend emits naive ISO timestamps; they are treated as UTC.
fn parse_upload_time(raw: &str) -> PortResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| PortError::Payload(format!("invalid upload_time '{}': {}", raw, e)))
}

//=========================================================================================
// Response Handling
//=========================================================================================

fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Transport(e.to_string())
}

/// Turns a non-2xx response into a `PortError`, reading `{detail}` when present.
async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorRecord>(&body)
        .ok()
        .and_then(|record| record.detail)
        .map(|detail| match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        })
        .unwrap_or_default();

    if status == StatusCode::NOT_FOUND {
        let what = if detail.is_empty() {
            "Resource not found".to_string()
        } else {
            detail
        };
        return Err(PortError::NotFound(what));
    }

    Err(PortError::Backend {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let response = check_status(response).await?;
    let body = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&body).map_err(|e| PortError::Payload(e.to_string()))
}

//=========================================================================================
// `RagBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl RagBackend for HttpRagBackend {
    async fn upload_document(&self, file_name: &str, bytes: Vec<u8>) -> PortResult<UploadReceipt> {
        debug!("Uploading '{}' ({} bytes)", file_name, bytes.len());
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload-document"))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        decode::<UploadRecord>(response).await.map(UploadRecord::to_domain)
    }

    async fn list_documents(&self) -> PortResult<Vec<DocumentSummary>> {
        let response = self
            .client
            .get(self.url("/documents"))
            .send()
            .await
            .map_err(transport_error)?;

        decode::<DocumentListRecord>(response)
            .await?
            .documents
            .into_iter()
            .map(DocumentRecord::to_domain)
            .collect()
    }

    async fn get_document(&self, document_id: &str) -> PortResult<DocumentDetail> {
        let response = self
            .client
            .get(self.url(&format!("/documents/{}", document_id)))
            .send()
            .await
            .map_err(transport_error)?;

        decode::<DocumentDetailRecord>(response).await?.to_domain()
    }

    async fn delete_document(&self, document_id: &str) -> PortResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/documents/{}", document_id)))
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response).await.map(|_| ())
    }

    async fn clear_documents(&self) -> PortResult<()> {
        let response = self
            .client
            .delete(self.url("/documents"))
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response).await.map(|_| ())
    }

    async fn status(&self) -> PortResult<BackendStatus> {
        let response = self
            .client
            .get(self.url("/status"))
            .send()
            .await
            .map_err(transport_error)?;

        decode::<StatusRecord>(response).await.map(StatusRecord::to_domain)
    }

    async fn chat(&self, message: &str, history: &ConversationHistory) -> PortResult<ChatReply> {
        let request = ChatRequestRecord {
            message,
            conversation_history: history
                .entries()
                .iter()
                .map(|entry| HistoryRecord {
                    role: entry.role.as_str(),
                    content: &entry.content,
                })
                .collect(),
        };
        debug!(
            "Sending chat message with {} history entries",
            request.conversation_history.len()
        );

        let response = self
            .client
            .post(self.url("/chat"))
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        decode::<ChatRecord>(response).await.map(ChatRecord::to_domain)
    }
}
