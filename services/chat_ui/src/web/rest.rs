//! services/chat_ui/src/web/rest.rs
//!
//! Contains the Axum handlers for the page and its htmx fragment endpoints,
//! and the master definition for the OpenAPI specification.

use crate::web::{
    chat_task, page, panel_task,
    session::Update,
    state::AppState,
    upload_task,
    views::{self, render_update},
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    Form,
};
use chrono::Local;
use rag_chat_core::copy::{copy_with_fallback, CopyOutcome};
use rag_chat_core::domain::PendingUpload;
use rag_chat_core::inspector::{ChunkDetail, Direction};
use rag_chat_core::modal::ModalKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

type HandlerResult = Result<Html<String>, (StatusCode, String)>;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        index_handler,
        health_handler,
        documents_panel_handler,
        status_panel_handler,
        upload_handler,
        drain_uploads_handler,
        send_message_handler,
        reply_handler,
        delete_document_handler,
        clear_documents_handler,
        new_conversation_handler,
        open_preview_handler,
        load_preview_handler,
        close_modal_handler,
        escape_handler,
        expand_chunk_handler,
        navigate_carousel_handler,
        copy_message_handler,
        copy_button_handler,
    ),
    components(
        schemas(HealthResponse, SendMessageForm)
    ),
    tags(
        (name = "RAG Chat UI", description = "The chat page and the htmx fragments that drive it.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// The chat input form.
#[derive(Deserialize, ToSchema)]
pub struct SendMessageForm {
    message: String,
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> (StatusCode, String) {
    error!("{}: {}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

async fn render(app_state: &AppState, update: &Update) -> String {
    let session = app_state.session.lock().await;
    render_update(update, &session, Local::now())
}

//=========================================================================================
// Page and Panels
//=========================================================================================

/// The chat page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "The full chat page", content_type = "text/html", body = String))
)]
pub async fn index_handler(State(app_state): State<Arc<AppState>>) -> Html<String> {
    let session = app_state.session.lock().await;
    Html(page::render_index(&session))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Re-fetches the document list and returns the panel.
#[utoipa::path(
    get,
    path = "/ui/documents",
    responses((status = 200, description = "Document list panel", content_type = "text/html", body = String))
)]
pub async fn documents_panel_handler(State(app_state): State<Arc<AppState>>) -> Html<String> {
    panel_task::refresh_documents(&app_state).await;
    let session = app_state.session.lock().await;
    Html(views::render_documents_panel(
        session.documents(),
        session.documents_error(),
        false,
    ))
}

/// Re-fetches the backend status and returns the panel.
#[utoipa::path(
    get,
    path = "/ui/status",
    responses((status = 200, description = "Status panel", content_type = "text/html", body = String))
)]
pub async fn status_panel_handler(State(app_state): State<Arc<AppState>>) -> Html<String> {
    panel_task::refresh_status(&app_state).await;
    let session = app_state.session.lock().await;
    Html(views::render_status_panel(
        session.status(),
        session.status_error(),
        false,
    ))
}

//=========================================================================================
// Uploads
//=========================================================================================

/// Queue picked or dropped files for upload.
///
/// Accepts a multipart/form-data request with any number of file parts.
/// Returns one progress entry per file, plus a trigger that starts the drain
/// when none is running.
#[utoipa::path(
    post,
    path = "/ui/uploads",
    request_body(content_type = "multipart/form-data", description = "The documents to upload."),
    responses(
        (status = 200, description = "Progress entries", content_type = "text/html", body = String),
        (status = 400, description = "Malformed multipart body")
    )
)]
pub async fn upload_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> HandlerResult {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            continue;
        }
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        files.push(PendingUpload::new(file_name, data.to_vec()));
    }

    let mut html: String = files.iter().map(views::render_upload_progress).collect();
    if let Some(drain_id) = upload_task::start_uploads(&app_state, files).await {
        html.push_str(&views::render_drain_trigger(drain_id));
    }
    Ok(Html(html))
}

/// Collects the results of the upload drain `id`.
///
/// The drain runs on the server whether or not this is called. A second call
/// for the same drain returns only the trigger removal.
#[utoipa::path(
    post,
    path = "/ui/uploads/drain/{id}",
    params(("id" = Uuid, Path, description = "The drain started by an upload.")),
    responses((status = 200, description = "Upload results and refreshed panels", content_type = "text/html", body = String))
)]
pub async fn drain_uploads_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Html<String> {
    let update = upload_task::collect_drain(&app_state, id).await;
    let mut html = render(&app_state, &update).await;
    html.push_str(&views::remove_element(&views::drain_trigger_id(id)));
    Html(html)
}

//=========================================================================================
// Chat
//=========================================================================================

/// Send a chat message.
///
/// Appends the user's message and a typing indicator that fetches the reply.
/// Blank input, or input while another reply is pending, returns nothing.
#[utoipa::path(
    post,
    path = "/ui/messages",
    request_body(content = SendMessageForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, description = "User message and typing indicator", content_type = "text/html", body = String))
)]
pub async fn send_message_handler(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<SendMessageForm>,
) -> Html<String> {
    let Some(message) = chat_task::start_send(&app_state, &form.message).await else {
        debug!("Ignoring blank or concurrent chat submission");
        return Html(String::new());
    };

    let mut html = views::render_message(&message, None, Local::now());
    html.push_str(&views::render_typing_indicator(message.id));
    html.push_str(&views::render_send_button(true));
    Html(html)
}

/// Waits for the backend's reply to the pending message `id`.
///
/// The reply is produced on the server whether or not this is called.
#[utoipa::path(
    post,
    path = "/ui/messages/{id}/reply",
    params(("id" = Uuid, Path, description = "The user message awaiting a reply.")),
    responses((status = 200, description = "Assistant reply or error message", content_type = "text/html", body = String))
)]
pub async fn reply_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Html<String> {
    let update = chat_task::collect_reply(&app_state, id).await;
    let (mut html, sending) = {
        let session = app_state.session.lock().await;
        (render_update(&update, &session, Local::now()), session.is_sending())
    };
    html.push_str(&views::remove_element(&format!("typing-{}", id)));
    html.push_str(&views::render_send_button(sending));
    Html(html)
}

/// Start a new conversation.
#[utoipa::path(
    post,
    path = "/ui/conversation",
    responses((status = 200, description = "The reset scrollback", content_type = "text/html", body = String))
)]
pub async fn new_conversation_handler(State(app_state): State<Arc<AppState>>) -> Html<String> {
    let update = panel_task::new_conversation(&app_state).await;
    Html(render(&app_state, &update).await)
}

//=========================================================================================
// Documents
//=========================================================================================

/// Delete one document.
#[utoipa::path(
    delete,
    path = "/ui/documents/{id}",
    params(("id" = String, Path, description = "The backend's document id.")),
    responses((status = 200, description = "Outcome message and refreshed panels", content_type = "text/html", body = String))
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Html<String> {
    let update = panel_task::delete_document(&app_state, &document_id).await;
    Html(render(&app_state, &update).await)
}

/// Delete every document and reset the conversation history.
#[utoipa::path(
    delete,
    path = "/ui/documents",
    responses((status = 200, description = "Outcome message and refreshed panels", content_type = "text/html", body = String))
)]
pub async fn clear_documents_handler(State(app_state): State<Arc<AppState>>) -> Html<String> {
    let update = panel_task::clear_documents(&app_state).await;
    Html(render(&app_state, &update).await)
}

/// Open the preview modal in its loading state.
#[utoipa::path(
    get,
    path = "/ui/documents/{id}/preview",
    params(("id" = String, Path, description = "The backend's document id.")),
    responses((status = 200, description = "Preview modal, loading", content_type = "text/html", body = String))
)]
pub async fn open_preview_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Html<String> {
    panel_task::open_preview(&app_state, &document_id).await;
    let session = app_state.session.lock().await;
    Html(views::render_preview_modal(session.modals().preview(), false))
}

/// Fetch the previewed document and fill the modal.
#[utoipa::path(
    get,
    path = "/ui/documents/{id}/preview/content",
    params(("id" = String, Path, description = "The backend's document id.")),
    responses((status = 200, description = "Preview modal or alert, out of band", content_type = "text/html", body = String))
)]
pub async fn load_preview_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Html<String> {
    let update = panel_task::load_preview(&app_state, &document_id).await;
    Html(render(&app_state, &update).await)
}

//=========================================================================================
// Modals
//=========================================================================================

/// Close a modal via its close control or an overlay click.
#[utoipa::path(
    delete,
    path = "/ui/modals/{kind}",
    params(("kind" = String, Path, description = "`chunk`, `mode-switch` or `document-preview`.")),
    responses(
        (status = 200, description = "The closed modal placeholder", content_type = "text/html", body = String),
        (status = 404, description = "Unknown modal kind")
    )
)]
pub async fn close_modal_handler(
    State(app_state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> HandlerResult {
    let kind = ModalKind::parse(&kind)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown modal '{}'", kind)))?;

    let mut session = app_state.session.lock().await;
    session.modals_mut().close(kind);
    let modals = session.modals();
    let html = match kind {
        ModalKind::Chunk => views::render_chunk_modal(modals.chunk(), false),
        ModalKind::ModeSwitch => views::render_mode_switch_modal(modals.mode_switch_text(), false),
        ModalKind::DocumentPreview => views::render_preview_modal(modals.preview(), false),
    };
    Ok(Html(html))
}

/// Escape key: closes the topmost open modal.
#[utoipa::path(
    post,
    path = "/ui/modals/escape",
    responses((status = 200, description = "All modals, out of band", content_type = "text/html", body = String))
)]
pub async fn escape_handler(State(app_state): State<Arc<AppState>>) -> Html<String> {
    let mut session = app_state.session.lock().await;
    if let Some(kind) = session.modals_mut().escape() {
        debug!("Escape closed the {} modal", kind.as_str());
    }
    Html(views::render_modals(session.modals(), true))
}

//=========================================================================================
// Chunk Inspector and Copy
//=========================================================================================

/// Show one retrieved chunk in the shared chunk modal.
#[utoipa::path(
    get,
    path = "/ui/messages/{id}/chunks/{position}",
    params(
        ("id" = Uuid, Path, description = "The assistant message."),
        ("position" = usize, Path, description = "Zero-based chunk position.")
    ),
    responses(
        (status = 200, description = "The chunk modal", content_type = "text/html", body = String),
        (status = 404, description = "No such message or chunk")
    )
)]
pub async fn expand_chunk_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, position)): Path<(Uuid, usize)>,
) -> HandlerResult {
    let mut session = app_state.session.lock().await;
    let detail: ChunkDetail = session
        .inspector(id)
        .and_then(|inspector| inspector.detail(position))
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Chunk not found".to_string()))?;

    session.modals_mut().open_chunk(detail);
    Ok(Html(views::render_chunk_modal(session.modals().chunk(), false)))
}

/// Scroll a message's chunk carousel.
#[utoipa::path(
    post,
    path = "/ui/messages/{id}/carousel/{direction}",
    params(
        ("id" = Uuid, Path, description = "The assistant message."),
        ("direction" = String, Path, description = "`back` or `forward`.")
    ),
    responses(
        (status = 200, description = "The re-rendered inspector", content_type = "text/html", body = String),
        (status = 404, description = "No inspector for this message")
    )
)]
pub async fn navigate_carousel_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, direction)): Path<(Uuid, String)>,
) -> HandlerResult {
    let direction = match direction.as_str() {
        "back" => Direction::Back,
        "forward" => Direction::Forward,
        other => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("Unknown direction '{}'", other),
            ))
        }
    };

    let mut session = app_state.session.lock().await;
    let inspector = session
        .inspector_mut(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Inspector not found".to_string()))?;
    let navigation = inspector.navigate(direction);
    debug!(
        "Carousel {} moved to offset {} (materialized now: {})",
        id, navigation.offset, navigation.materialized
    );
    Ok(Html(views::render_inspector(id, inspector)))
}

/// Copy a message's raw text to the clipboard.
#[utoipa::path(
    post,
    path = "/ui/messages/{id}/copy",
    params(("id" = Uuid, Path, description = "The message to copy.")),
    responses(
        (status = 200, description = "Copy feedback or the manual selection fallback", content_type = "text/html", body = String),
        (status = 404, description = "No such message")
    )
)]
pub async fn copy_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let text = app_state
        .session
        .lock()
        .await
        .message(id)
        .map(|message| message.content.clone())
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Message not found".to_string()))?;

    let clipboard = app_state.clipboard.clone();
    let outcome = tokio::task::spawn_blocking(move || copy_with_fallback(clipboard.as_ref(), &text))
        .await
        .map_err(|e| internal_error("Clipboard task failed", e))?;

    let html = match outcome {
        CopyOutcome::Copied => views::render_copy_success(id),
        CopyOutcome::SelectForManualCopy(text) => views::render_copy_fallback(id, &text),
    };
    Ok(Html(html))
}

/// The plain copy button, used to revert the feedback state.
#[utoipa::path(
    get,
    path = "/ui/messages/{id}/copy-button",
    params(("id" = Uuid, Path, description = "The message.")),
    responses((status = 200, description = "The copy button", content_type = "text/html", body = String))
)]
pub async fn copy_button_handler(Path(id): Path<Uuid>) -> Html<String> {
    Html(views::render_copy_button(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_doc_lists_the_collector_routes() {
        let api = ApiDoc::openapi();
        for path in [
            "/ui/uploads",
            "/ui/uploads/drain/{id}",
            "/ui/messages",
            "/ui/messages/{id}/reply",
            "/ui/documents/{id}/preview/content",
        ] {
            assert!(api.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
