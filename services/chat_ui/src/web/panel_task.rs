//! services/chat_ui/src/web/panel_task.rs
//!
//! Document list and status panel refreshes, document deletion, clearing,
//! the document preview and starting a new conversation.

use crate::web::session::Update;
use crate::web::state::AppState;
use rag_chat_core::domain::Message;
use rag_chat_core::status::{DocumentPanel, StatusPanel};
use tracing::{info, warn};

/// Fetches the document list. On failure the last good list stays visible.
pub async fn refresh_documents(app_state: &AppState) -> bool {
    let result = app_state.backend.list_documents().await;
    let mut session = app_state.session.lock().await;
    match result {
        Ok(documents) => {
            session.set_documents(DocumentPanel::from(documents.as_slice()));
            true
        }
        Err(e) => {
            warn!("Failed to load documents: {}", e);
            session.fail_documents("Failed to load documents");
            false
        }
    }
}

/// Fetches the backend status. On failure the last good panel stays visible.
pub async fn refresh_status(app_state: &AppState) -> bool {
    let result = app_state.backend.status().await;
    let mut session = app_state.session.lock().await;
    match result {
        Ok(status) => {
            session.set_status(StatusPanel::from(&status));
            true
        }
        Err(e) => {
            warn!("Failed to load status: {}", e);
            session.fail_status("Failed to load status");
            false
        }
    }
}

async fn refresh_panels(app_state: &AppState, update: &mut Update) {
    refresh_documents(app_state).await;
    refresh_status(app_state).await;
    update.documents_changed = true;
    update.status_changed = true;
}

pub async fn delete_document(app_state: &AppState, document_id: &str) -> Update {
    let mut update = Update::default();
    match app_state.backend.delete_document(document_id).await {
        Ok(()) => {
            info!("Deleted document {}", document_id);
            refresh_panels(app_state, &mut update).await;
            let message = app_state
                .session
                .lock()
                .await
                .push(Message::system("Document deleted"));
            update.appended.push(message);
        }
        Err(e) => {
            warn!("Failed to delete document {}: {}", document_id, e);
            let message = app_state
                .session
                .lock()
                .await
                .push(Message::system_error("Failed to delete document"));
            update.appended.push(message);
        }
    }
    update
}

/// Removes every document. The conversation history goes with them since the
/// backend can no longer ground earlier answers.
pub async fn clear_documents(app_state: &AppState) -> Update {
    let mut update = Update::default();
    match app_state.backend.clear_documents().await {
        Ok(()) => {
            info!("Cleared all documents");
            refresh_panels(app_state, &mut update).await;
            let mut session = app_state.session.lock().await;
            session.clear_history();
            update
                .appended
                .push(session.push(Message::system("All documents cleared")));
        }
        Err(e) => {
            warn!("Failed to clear documents: {}", e);
            let message = app_state
                .session
                .lock()
                .await
                .push(Message::system_error("Failed to clear documents"));
            update.appended.push(message);
        }
    }
    update
}

/// Opens the preview modal in its loading state.
pub async fn open_preview(app_state: &AppState, document_id: &str) {
    app_state
        .session
        .lock()
        .await
        .modals_mut()
        .open_preview(document_id);
}

/// Fetches the document and fills the preview modal. A result that arrives
/// after the user closed the modal, or moved on to another document, is
/// dropped. A failure with no preview open becomes an alert.
pub async fn load_preview(app_state: &AppState, document_id: &str) -> Update {
    let mut update = Update::default();
    let result = app_state.backend.get_document(document_id).await;
    let mut session = app_state.session.lock().await;
    match result {
        Ok(detail) => {
            update.modals_changed = session.modals_mut().resolve_preview(document_id, detail);
        }
        Err(e) => {
            warn!("Failed to load document {}: {}", document_id, e);
            let text = format!(
                "Failed to load document: {}",
                e.user_detail("Failed to load document")
            );
            if session.modals_mut().fail_preview(document_id, text.clone()) {
                update.modals_changed = true;
            } else if session.modals().preview().is_none() {
                update.alert = Some(text);
            }
        }
    }
    update
}

pub async fn new_conversation(app_state: &AppState) -> Update {
    let mut session = app_state.session.lock().await;
    session.reset_conversation();
    let message = session.push(Message::system("New conversation started"));
    info!("Started a new conversation");
    Update {
        appended: vec![message],
        modals_changed: true,
        reset: true,
        ..Update::default()
    }
}
