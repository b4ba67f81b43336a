//! services/chat_ui/src/web/views.rs
//!
//! HTML fragments for the chat page. Every fragment that can be refreshed
//! carries a stable element id so handlers can replace it with an htmx
//! out-of-band swap.

use crate::web::session::{ChatSession, Update};
use chrono::{DateTime, Local};
use rag_chat_core::copy::COPY_FEEDBACK;
use rag_chat_core::domain::{Message, PendingUpload};
use rag_chat_core::format::{escape_html, format_message};
use rag_chat_core::inspector::ChunkInspector;
use rag_chat_core::modal::{ChunkModal, ModalKind, Modals, PreviewState};
use rag_chat_core::render::{format_timestamp, offers_copy};
use rag_chat_core::status::{format_thousands, local_datetime, DocumentPanel, StatusPanel, EMPTY_DOCUMENTS};
use std::fmt::Write;
use uuid::Uuid;

pub const MESSAGES_ID: &str = "chat-messages";
pub const DOCUMENTS_ID: &str = "documents-panel";
pub const STATUS_ID: &str = "status-panel";
pub const ALERT_ID: &str = "alert-slot";
pub const SEND_BUTTON_ID: &str = "send-button";

fn oob_attr(oob: bool) -> &'static str {
    if oob {
        r#" hx-swap-oob="true""#
    } else {
        ""
    }
}

fn modal_id(kind: ModalKind) -> String {
    format!("{}-modal", kind.as_str())
}

//=========================================================================================
// Messages
//=========================================================================================

pub fn render_message(message: &Message, inspector: Option<&ChunkInspector>, now: DateTime<Local>) -> String {
    let mut classes = format!("message {}-message", message.role.as_str());
    let inspector = inspector.filter(|_| message.has_chunks());
    if inspector.is_some() {
        classes.push_str(" has-chunks");
    }
    let content_class = if message.is_error {
        "message-content error-message"
    } else {
        "message-content"
    };

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{}" id="message-{}"><div class="message-wrapper"><div class="{}">{}</div>"#,
        classes,
        message.id,
        content_class,
        format_message(&message.content)
    );
    if offers_copy(message) {
        html.push_str(&render_copy_button(message.id));
    }
    html.push_str("</div>");
    let _ = write!(
        html,
        r#"<div class="message-timestamp">{}</div>"#,
        format_timestamp(message.timestamp, now)
    );
    if let Some(metadata) = message.metadata.as_deref() {
        let _ = write!(html, r#"<div class="message-meta">{}</div>"#, escape_html(metadata));
    }
    if let Some(inspector) = inspector {
        html.push_str(&render_inspector(message.id, inspector));
    }
    html.push_str("</div>");
    html
}

/// All messages of the session, each with its inspector.
pub fn render_scrollback(session: &ChatSession, now: DateTime<Local>) -> String {
    session
        .messages()
        .iter()
        .map(|message| render_message(message, session.inspector(message.id), now))
        .collect()
}

pub fn render_typing_indicator(pending_id: Uuid) -> String {
    format!(
        r##"<div class="message assistant-message typing-indicator" id="typing-{id}" hx-post="/ui/messages/{id}/reply" hx-trigger="load" hx-target="#{target}" hx-swap="beforeend"><div class="message-content"><div class="typing-animation"><span></span><span></span><span></span></div><span class="typing-text">Assistant is thinking...</span></div></div>"##,
        id = pending_id,
        target = MESSAGES_ID
    )
}

pub fn render_upload_progress(upload: &PendingUpload) -> String {
    format!(
        r#"<div class="message system-message upload-progress" id="upload-{}"><div class="message-content"><div class="upload-spinner"></div><span>Uploading "{}"...</span></div></div>"#,
        upload.id,
        escape_html(&upload.file_name)
    )
}

pub fn drain_trigger_id(drain_id: Uuid) -> String {
    format!("upload-drain-{}", drain_id)
}

/// Collects the drain's results once the progress entries are on the page.
pub fn render_drain_trigger(drain_id: Uuid) -> String {
    format!(
        r##"<div id="{element}" hx-post="/ui/uploads/drain/{id}" hx-trigger="load" hx-target="#{target}" hx-swap="beforeend"></div>"##,
        element = drain_trigger_id(drain_id),
        id = drain_id,
        target = MESSAGES_ID
    )
}

/// Work still running on the server: the typing indicator of a pending send,
/// and the progress entries and collector of a running drain.
pub fn render_in_flight(session: &ChatSession) -> String {
    let mut html = String::new();
    if let Some(pending_id) = session.pending_send_id() {
        html.push_str(&render_typing_indicator(pending_id));
    }
    if let Some(drain_id) = session.active_drain() {
        html.extend(session.queued_uploads().map(render_upload_progress));
        html.push_str(&render_drain_trigger(drain_id));
    }
    html
}

pub fn remove_element(id: &str) -> String {
    format!(r#"<div id="{}" hx-swap-oob="delete"></div>"#, id)
}

pub fn render_send_button(disabled: bool) -> String {
    format!(
        r#"<button type="submit" id="{}" class="btn btn-primary" hx-swap-oob="true"{}>Send</button>"#,
        SEND_BUTTON_ID,
        if disabled { " disabled" } else { "" }
    )
}

//=========================================================================================
// Copy button
//=========================================================================================

pub fn render_copy_button(message_id: Uuid) -> String {
    format!(
        r#"<button class="copy-btn" id="copy-{id}" title="Copy message" hx-post="/ui/messages/{id}/copy" hx-swap="outerHTML">📋</button>"#,
        id = message_id
    )
}

/// Success state; reverts to the plain button after `COPY_FEEDBACK`.
pub fn render_copy_success(message_id: Uuid) -> String {
    format!(
        r#"<button class="copy-btn copied" id="copy-{id}" title="Copied" hx-get="/ui/messages/{id}/copy-button" hx-trigger="load delay:{delay}ms" hx-swap="outerHTML">✅</button>"#,
        id = message_id,
        delay = COPY_FEEDBACK.as_millis()
    )
}

/// The selection fallback: the text pre-selected in a read-only area.
pub fn render_copy_fallback(message_id: Uuid, text: &str) -> String {
    format!(
        r##"<span class="copy-fallback" id="copy-{id}"><textarea class="copy-fallback-text" readonly autofocus onfocus="this.select()">{text}</textarea><button class="btn btn-secondary" hx-get="/ui/messages/{id}/copy-button" hx-target="#copy-{id}" hx-swap="outerHTML">Done</button></span>"##,
        id = message_id,
        text = escape_html(text)
    )
}

//=========================================================================================
// Chunk inspector
//=========================================================================================

pub fn render_inspector(message_id: Uuid, inspector: &ChunkInspector) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="chunk-inspector" id="inspector-{}"><div class="chunk-inspector-header"><span>📚 Retrieved Chunks ({})</span></div><div class="chunk-carousel-container"><div class="chunk-carousel-wrapper">"#,
        message_id,
        inspector.len()
    );
    html.push_str(&carousel_button(message_id, "back", "carousel-prev", "‹"));
    let _ = write!(
        html,
        r#"<div class="chunk-carousel" style="--carousel-offset: {}">"#,
        inspector.offset()
    );

    for card in inspector.cards() {
        let _ = write!(
            html,
            r##"<div class="chunk-card"><div class="chunk-card-header"><div class="chunk-card-source">{}</div><div class="chunk-card-score">{}</div></div><div class="chunk-card-preview">{}</div><div class="chunk-card-footer"><span class="chunk-index">Chunk {}</span><button class="chunk-expand-btn" hx-get="/ui/messages/{}/chunks/{}" hx-target="#{}" hx-swap="outerHTML">View Full</button></div></div>"##,
            escape_html(&card.document_name),
            card.similarity,
            escape_html(&card.preview),
            card.chunk_number,
            message_id,
            card.position,
            modal_id(ModalKind::Chunk)
        );
    }

    if let Some(hidden) = inspector.more_placeholder() {
        let _ = write!(
            html,
            r#"<div class="chunk-card chunk-more-card"><div class="chunk-more-content"><div class="chunk-more-text">+{} more</div><div class="chunk-more-subtitle">Use navigation arrows to see all chunks</div></div></div>"#,
            hidden
        );
    }

    html.push_str("</div>");
    html.push_str(&carousel_button(message_id, "forward", "carousel-next", "›"));
    html.push_str("</div></div></div>");
    html
}

fn carousel_button(message_id: Uuid, direction: &str, class: &str, label: &str) -> String {
    format!(
        r##"<button class="carousel-nav {class}" hx-post="/ui/messages/{id}/carousel/{direction}" hx-target="#inspector-{id}" hx-swap="outerHTML">{label}</button>"##,
        class = class,
        id = message_id,
        direction = direction,
        label = label
    )
}

//=========================================================================================
// Panels
//=========================================================================================

pub fn render_documents_panel(panel: &DocumentPanel, error: Option<&str>, oob: bool) -> String {
    let mut html = format!(r#"<div id="{}" class="documents-list"{}>"#, DOCUMENTS_ID, oob_attr(oob));
    if let Some(error) = error {
        let _ = write!(html, r#"<p class="panel-error">{}</p>"#, escape_html(error));
    }
    if panel.is_empty() {
        let _ = write!(html, r#"<p class="empty-state">{}</p>"#, EMPTY_DOCUMENTS);
    }
    for row in &panel.rows {
        let id = escape_html(&row.id);
        let _ = write!(
            html,
            r##"<div class="document-item"><div class="document-info"><div class="document-name clickable" title="Click to preview document" hx-get="/ui/documents/{id}/preview" hx-target="#{modal}" hx-swap="outerHTML">{name}</div><div class="document-meta">{meta}</div></div><button class="delete-btn" title="Delete document" hx-delete="/ui/documents/{id}" hx-target="#{messages}" hx-swap="beforeend">×</button></div>"##,
            id = id,
            modal = modal_id(ModalKind::DocumentPreview),
            name = escape_html(&row.name),
            meta = escape_html(&row.meta),
            messages = MESSAGES_ID
        );
    }
    html.push_str("</div>");
    html
}

pub fn render_status_panel(status: Option<&StatusPanel>, error: Option<&str>, oob: bool) -> String {
    let mut html = format!(r#"<div id="{}" class="status-panel"{}>"#, STATUS_ID, oob_attr(oob));
    if let Some(error) = error {
        let _ = write!(html, r#"<p class="panel-error">{}</p>"#, escape_html(error));
    }
    match status {
        Some(status) => {
            let bar_class = match status.progress.level.css_class() {
                Some(level) => format!("progress-bar {}", level),
                None => "progress-bar".to_string(),
            };
            let _ = write!(
                html,
                r#"<div class="status-line"><span id="mode-indicator" class="{}">{}</span><span class="token-count">{}</span><span class="document-count">{}</span></div><div class="context-progress"><div class="{}" style="width: {:.1}%"></div></div><div class="progress-label">{}</div>"#,
                status.mode_class(),
                status.mode_label,
                status.tokens_label,
                status.documents_label,
                bar_class,
                status.progress.width_percent,
                status.progress.label
            );
        }
        None => html.push_str(r#"<div class="status-line">Loading status...</div>"#),
    }
    html.push_str("</div>");
    html
}

//=========================================================================================
// Modals and alert
//=========================================================================================

fn close_attrs(kind: ModalKind) -> String {
    format!(
        r##"hx-delete="/ui/modals/{kind}" hx-target="#{id}" hx-swap="outerHTML""##,
        kind = kind.as_str(),
        id = modal_id(kind)
    )
}

/// The overlay closes its modal when the click lands on the overlay itself.
fn overlay_open(kind: ModalKind, extra_class: &str, oob: bool) -> String {
    format!(
        r##"<div id="{id}" class="modal-overlay show {extra}"{oob} hx-delete="/ui/modals/{kind}" hx-trigger="click target:#{id}" hx-swap="outerHTML">"##,
        id = modal_id(kind),
        extra = extra_class,
        oob = oob_attr(oob),
        kind = kind.as_str()
    )
}

fn modal_placeholder(kind: ModalKind, oob: bool) -> String {
    format!(
        r#"<div id="{}" class="modal-overlay"{}></div>"#,
        modal_id(kind),
        oob_attr(oob)
    )
}

pub fn render_chunk_modal(modal: Option<&ChunkModal>, oob: bool) -> String {
    let Some(modal) = modal.filter(|modal| modal.open) else {
        return modal_placeholder(ModalKind::Chunk, oob);
    };
    let close = close_attrs(ModalKind::Chunk);
    let detail = &modal.detail;
    format!(
        r#"{open}<div class="modal-content chunk-modal-content"><div class="modal-header"><h3>Chunk Details</h3><button class="modal-close" {close}>&times;</button></div><div class="modal-body"><div class="chunk-modal-meta"><div class="chunk-meta-item"><span class="meta-label">Document:</span><span>{document}</span></div><div class="chunk-meta-item"><span class="meta-label">Chunk:</span><span>{chunk}</span></div><div class="chunk-meta-item"><span class="meta-label">Similarity:</span><span>{similarity}</span></div></div><div class="chunk-modal-content-wrapper"><div class="chunk-modal-text">{content}</div></div></div><div class="modal-footer"><button class="btn btn-secondary" autofocus {close}>Close</button></div></div></div>"#,
        open = overlay_open(ModalKind::Chunk, "chunk-modal", oob),
        close = close,
        document = escape_html(&detail.document_name),
        chunk = detail.chunk_number,
        similarity = detail.similarity,
        content = detail.content_html
    )
}

pub fn render_mode_switch_modal(text: Option<String>, oob: bool) -> String {
    let Some(text) = text else {
        return modal_placeholder(ModalKind::ModeSwitch, oob);
    };
    let close = close_attrs(ModalKind::ModeSwitch);
    format!(
        r#"{open}<div class="modal-content"><div class="modal-header"><h3>🔄 Switched to RAG Mode</h3><button class="modal-close" {close}>&times;</button></div><div class="modal-body"><p>Your documents now exceed the full context limit, so answers will be built from the most relevant chunks.</p><p class="mode-switch-tokens">{text}</p></div><div class="modal-footer"><button class="btn btn-primary" autofocus {close}>Got it</button></div></div></div>"#,
        open = overlay_open(ModalKind::ModeSwitch, "mode-switch-modal", oob),
        close = close,
        text = text
    )
}

pub fn render_preview_modal(state: Option<&PreviewState>, oob: bool) -> String {
    let Some(state) = state else {
        return modal_placeholder(ModalKind::DocumentPreview, oob);
    };
    let close = close_attrs(ModalKind::DocumentPreview);

    let (title, tokens, uploaded, length, body) = match state {
        PreviewState::Loading { document_id } => (
            "Loading...".to_string(),
            "Loading...".to_string(),
            "Loading...".to_string(),
            "Loading...".to_string(),
            format!(
                r#"<div class="preview-loader" hx-get="/ui/documents/{}/preview/content" hx-trigger="load" hx-swap="none">Loading document preview...</div>"#,
                escape_html(document_id)
            ),
        ),
        PreviewState::Loaded(detail) => (
            escape_html(&detail.name),
            format!("{} tokens", format_thousands(detail.token_count)),
            local_datetime(detail.upload_time),
            format!("{} characters", format_thousands(detail.full_content_length)),
            format_message(&detail.content_preview),
        ),
        PreviewState::Failed(message) => (
            "Error".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            escape_html(message),
        ),
    };

    format!(
        r#"{open}<div class="modal-content document-preview-content"><div class="modal-header"><h3>{title}</h3><button class="modal-close" {close}>&times;</button></div><div class="modal-body"><div class="preview-meta"><span>{tokens}</span><span>{uploaded}</span><span>{length}</span></div><div class="document-preview-text">{body}</div></div><div class="modal-footer"><button class="btn btn-secondary" autofocus {close}>Close</button></div></div></div>"#,
        open = overlay_open(ModalKind::DocumentPreview, "document-preview-modal", oob),
        close = close,
        title = title,
        tokens = tokens,
        uploaded = uploaded,
        length = length,
        body = body
    )
}

pub fn render_modals(modals: &Modals, oob: bool) -> String {
    let mut html = render_chunk_modal(modals.chunk(), oob);
    html.push_str(&render_mode_switch_modal(modals.mode_switch_text(), oob));
    html.push_str(&render_preview_modal(modals.preview(), oob));
    html
}

/// A blocking notice the user has to dismiss.
pub fn render_alert(text: &str) -> String {
    format!(
        r#"<div id="{}" hx-swap-oob="true"><div class="alert-overlay"><div class="alert-box"><p>{}</p><button class="btn btn-primary" autofocus onclick="this.closest('.alert-overlay').remove()">OK</button></div></div></div>"#,
        ALERT_ID,
        escape_html(text)
    )
}

//=========================================================================================
// Task updates
//=========================================================================================

/// Renders what a task changed: new messages in place, everything else out of band.
pub fn render_update(update: &Update, session: &ChatSession, now: DateTime<Local>) -> String {
    let mut html = if update.reset {
        render_scrollback(session, now)
    } else {
        update
            .appended
            .iter()
            .map(|message| render_message(message, session.inspector(message.id), now))
            .collect()
    };

    for upload_id in &update.finished_uploads {
        html.push_str(&remove_element(&format!("upload-{}", upload_id)));
    }
    if update.documents_changed {
        html.push_str(&render_documents_panel(session.documents(), session.documents_error(), true));
    }
    if update.status_changed {
        html.push_str(&render_status_panel(session.status(), session.status_error(), true));
    }
    if update.modals_changed {
        html.push_str(&render_modals(session.modals(), true));
    }
    if let Some(alert) = update.alert.as_deref() {
        html.push_str(&render_alert(alert));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_chat_core::domain::{Chunk, Mode};

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk {
                document_name: "guide.md".to_string(),
                content: format!("<b>chunk</b> number {i}"),
                similarity_score: 0.873,
                chunk_index: i,
            })
            .collect()
    }

    #[test]
    fn error_messages_have_no_copy_button() {
        let now = Local::now();
        let html = render_message(&Message::assistant_error("Error: boom"), None, now);
        assert!(html.contains("error-message"));
        assert!(!html.contains("copy-btn"));

        let html = render_message(&Message::user("hi"), None, now);
        assert!(html.contains("user-message"));
        assert!(html.contains("copy-btn"));
    }

    #[test]
    fn system_messages_have_no_copy_button() {
        let html = render_message(&Message::system("Document deleted"), None, Local::now());
        assert!(html.contains("system-message"));
        assert!(!html.contains("copy-btn"));
    }

    #[test]
    fn rag_message_renders_inspector_with_placeholder() {
        let message = Message::assistant("answer", Mode::Rag, Some("Mode: rag".to_string()), chunks(8));
        let inspector = ChunkInspector::new(message.chunks.clone());
        let html = render_message(&message, Some(&inspector), Local::now());
        assert!(html.contains("has-chunks"));
        assert_eq!(html.matches(r#"<div class="chunk-card">"#).count(), 6);
        assert!(html.contains("+2 more"));
        assert!(html.contains("87%"));
        assert!(!html.contains("<b>chunk</b>"));
    }

    #[test]
    fn full_context_message_never_renders_inspector() {
        let message = Message::assistant("answer", Mode::FullContext, None, chunks(2));
        let inspector = ChunkInspector::new(chunks(2));
        let html = render_message(&message, Some(&inspector), Local::now());
        assert!(!html.contains("chunk-inspector"));
        assert!(!html.contains("has-chunks"));
    }

    #[test]
    fn closed_modals_render_placeholders() {
        let html = render_modals(&Modals::new(), true);
        assert!(html.contains(r#"id="chunk-modal""#));
        assert!(html.contains(r#"id="mode-switch-modal""#));
        assert!(html.contains(r#"id="document-preview-modal""#));
        assert!(!html.contains("show"));
    }

    #[test]
    fn empty_document_panel_shows_empty_state() {
        let html = render_documents_panel(&DocumentPanel::default(), None, false);
        assert!(html.contains(EMPTY_DOCUMENTS));
        assert!(!html.contains("hx-swap-oob"));
    }
}
