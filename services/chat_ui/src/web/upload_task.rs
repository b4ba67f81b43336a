//! services/chat_ui/src/web/upload_task.rs
//!
//! The upload queue drain. Files are uploaded strictly one at a time in the
//! order they were queued; files queued while a drain runs join it.
//!
//! The server owns the drain: `start_uploads` spawns it, and the page only
//! collects the result through `collect_drain`.

use crate::web::panel_task::{refresh_documents, refresh_status};
use crate::web::session::Update;
use crate::web::state::AppState;
use rag_chat_core::domain::{Message, PendingUpload};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Queues files. Returns the id of a new drain the caller must run, or `None`
/// when a running drain picks them up.
pub async fn enqueue_uploads(app_state: &AppState, files: Vec<PendingUpload>) -> Option<Uuid> {
    let mut session = app_state.session.lock().await;
    let new_drain = session.enqueue_uploads(files);
    info!(
        "{} file(s) waiting for upload (new drain: {:?})",
        session.queued_uploads().count(),
        new_drain
    );
    new_drain
}

/// Queues files and, if no drain is running, spawns one. Returns the id under
/// which the new drain's result can be collected.
pub async fn start_uploads(app_state: &Arc<AppState>, files: Vec<PendingUpload>) -> Option<Uuid> {
    let drain_id = enqueue_uploads(app_state, files).await?;
    let task_state = app_state.clone();
    let handle = tokio::spawn(async move { drain_uploads(&task_state).await });
    app_state.tasks.register(drain_id, handle).await;
    Some(drain_id)
}

/// Waits for drain `drain_id`. Only the first caller gets its results.
pub async fn collect_drain(app_state: &AppState, drain_id: Uuid) -> Update {
    app_state.tasks.collect(drain_id).await.unwrap_or_default()
}

/// Uploads every queued file, then refreshes the panels once. Run this only
/// for a drain id handed out by `enqueue_uploads`.
pub async fn drain_uploads(app_state: &AppState) -> Update {
    let mut update = Update::default();

    loop {
        let Some(upload) = app_state.session.lock().await.next_upload() else {
            break;
        };
        let PendingUpload {
            id,
            file_name,
            bytes,
        } = upload;

        let result = app_state.backend.upload_document(&file_name, bytes).await;

        let mut session = app_state.session.lock().await;
        match result {
            Ok(receipt) => {
                info!("Uploaded '{}' ({} tokens)", receipt.name, receipt.token_count);
                let message = Message::system(format!(
                    "✅ Uploaded \"{}\" ({} tokens)",
                    receipt.name, receipt.token_count
                ));
                update.appended.push(session.push(message));
                if receipt.mode_switched_to_rag {
                    info!("Backend switched to RAG mode at {} tokens", receipt.total_tokens);
                    session.modals_mut().open_mode_switch(receipt.total_tokens);
                    update.modals_changed = true;
                }
            }
            Err(e) => {
                warn!("Failed to upload '{}': {}", file_name, e);
                let message = Message::system_error(format!(
                    "❌ Failed to upload \"{}\": {}",
                    file_name,
                    e.user_detail("Upload failed")
                ));
                update.appended.push(session.push(message));
            }
        }
        update.finished_uploads.push(id);
    }

    refresh_documents(app_state).await;
    refresh_status(app_state).await;
    update.documents_changed = true;
    update.status_changed = true;
    update
}

/// Queues `files` and drains the queue if no drain is running.
pub async fn upload_files(app_state: &AppState, files: Vec<PendingUpload>) -> Update {
    if enqueue_uploads(app_state, files).await.is_some() {
        drain_uploads(app_state).await
    } else {
        Update::default()
    }
}
