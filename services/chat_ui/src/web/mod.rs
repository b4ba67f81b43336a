pub mod chat_task;
pub mod page;
pub mod panel_task;
pub mod rest;
pub mod session;
pub mod state;
pub mod upload_task;
pub mod views;

use axum::{
    routing::{delete, get, post},
    Router,
};
use rest::*;
use state::AppState;
use std::sync::Arc;

/// Builds the page and fragment routes. Layers are added by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ui/status", get(status_panel_handler))
        .route(
            "/ui/documents",
            get(documents_panel_handler).delete(clear_documents_handler),
        )
        .route("/ui/documents/{id}", delete(delete_document_handler))
        .route("/ui/documents/{id}/preview", get(open_preview_handler))
        .route(
            "/ui/documents/{id}/preview/content",
            get(load_preview_handler),
        )
        .route("/ui/uploads", post(upload_handler))
        .route("/ui/uploads/drain/{id}", post(drain_uploads_handler))
        .route("/ui/messages", post(send_message_handler))
        .route("/ui/messages/{id}/reply", post(reply_handler))
        .route(
            "/ui/messages/{id}/chunks/{position}",
            get(expand_chunk_handler),
        )
        .route(
            "/ui/messages/{id}/carousel/{direction}",
            post(navigate_carousel_handler),
        )
        .route("/ui/messages/{id}/copy", post(copy_message_handler))
        .route("/ui/messages/{id}/copy-button", get(copy_button_handler))
        .route("/ui/conversation", post(new_conversation_handler))
        .route("/ui/modals/escape", post(escape_handler))
        .route("/ui/modals/{kind}", delete(close_modal_handler))
        .with_state(app_state)
}
