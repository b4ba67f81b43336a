//! services/chat_ui/src/web/page.rs
//!
//! The single page served at `/`. Everything after the first load arrives as
//! htmx fragments rendered by `views`.

use crate::web::session::ChatSession;
use crate::web::views::{
    render_documents_panel, render_in_flight, render_modals, render_scrollback,
    render_status_panel, ALERT_ID, DOCUMENTS_ID, MESSAGES_ID, SEND_BUTTON_ID, STATUS_ID,
};
use chrono::Local;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f4f6fb; color: #1f2933; }
.app { display: grid; grid-template-columns: 320px 1fr; height: 100vh; }
.sidebar { background: #fff; border-right: 1px solid #e1e5ee; padding: 16px; overflow-y: auto; display: flex; flex-direction: column; gap: 16px; }
.sidebar h2 { font-size: 15px; margin: 0 0 8px; }
.upload-area { border: 2px dashed #b8c2d6; border-radius: 8px; padding: 20px; text-align: center; cursor: pointer; }
.upload-area.dragover { border-color: #4c6ef5; background: #eef2ff; }
.status-line { display: flex; flex-direction: column; gap: 4px; font-size: 13px; }
.rag-mode { color: #7048e8; font-weight: 600; }
.full-context-mode { color: #2b8a3e; font-weight: 600; }
.context-progress { height: 8px; background: #e9ecef; border-radius: 4px; overflow: hidden; margin-top: 8px; }
.progress-bar { height: 100%; background: #4c6ef5; transition: width 0.3s; }
.progress-bar.warning { background: #f59f00; }
.progress-bar.danger { background: #e03131; }
.progress-label { font-size: 12px; color: #5c677d; margin-top: 4px; }
.panel-error { color: #e03131; font-size: 12px; margin: 0 0 6px; }
.empty-state { color: #8592a6; font-size: 13px; }
.document-item { display: flex; justify-content: space-between; align-items: center; padding: 8px; border-radius: 6px; background: #f8f9fc; margin-bottom: 6px; }
.document-name.clickable { cursor: pointer; font-weight: 600; font-size: 13px; }
.document-meta { font-size: 11px; color: #5c677d; }
.delete-btn { border: none; background: none; font-size: 18px; cursor: pointer; color: #868e96; }
.chat { display: flex; flex-direction: column; height: 100vh; }
.chat-header { display: flex; justify-content: space-between; align-items: center; padding: 12px 20px; background: #fff; border-bottom: 1px solid #e1e5ee; }
#chat-messages { flex: 1; overflow-y: auto; padding: 20px; display: flex; flex-direction: column; gap: 12px; }
.message { max-width: 80%; }
.user-message { align-self: flex-end; }
.assistant-message, .system-message { align-self: flex-start; }
.message.has-chunks { max-width: 95%; }
.message-wrapper { position: relative; }
.message-content { padding: 10px 14px; border-radius: 10px; background: #fff; line-height: 1.5; }
.user-message .message-content { background: #4c6ef5; color: #fff; }
.system-message .message-content { background: #e7f5ff; font-size: 13px; }
.message-content.error-message { background: #fff5f5; color: #c92a2a; border: 1px solid #ffc9c9; }
.message-content pre { background: #1e1e2e; color: #e9ecef; padding: 10px; border-radius: 6px; overflow-x: auto; }
.message-content code { font-family: "SFMono-Regular", Consolas, monospace; font-size: 13px; }
.message-timestamp, .message-meta { font-size: 11px; color: #8592a6; margin-top: 4px; }
.copy-btn { position: absolute; top: 4px; right: -30px; border: none; background: none; cursor: pointer; opacity: 0.6; }
.copy-fallback { display: flex; gap: 6px; margin-top: 6px; }
.copy-fallback-text { width: 100%; min-height: 60px; font-size: 12px; }
.typing-animation { display: inline-flex; gap: 3px; margin-right: 8px; }
.typing-animation span { width: 6px; height: 6px; border-radius: 50%; background: #adb5bd; animation: blink 1.2s infinite; }
.typing-animation span:nth-child(2) { animation-delay: 0.2s; }
.typing-animation span:nth-child(3) { animation-delay: 0.4s; }
@keyframes blink { 0%, 80%, 100% { opacity: 0.3; } 40% { opacity: 1; } }
.upload-spinner { display: inline-block; width: 12px; height: 12px; border: 2px solid #adb5bd; border-top-color: #4c6ef5; border-radius: 50%; animation: spin 0.8s linear infinite; margin-right: 8px; }
@keyframes spin { to { transform: rotate(360deg); } }
.chunk-inspector { margin-top: 8px; background: #fff; border-radius: 8px; padding: 8px; }
.chunk-inspector-header { font-size: 12px; font-weight: 600; margin-bottom: 6px; }
.chunk-carousel-wrapper { display: flex; align-items: center; gap: 6px; }
.chunk-carousel-container { overflow: hidden; }
.chunk-carousel { --card-width: 200px; --card-gap: 8px; display: flex; gap: var(--card-gap); overflow: hidden; flex: 1; }
.chunk-carousel > .chunk-card { transform: translateX(calc(var(--carousel-offset, 0) * -1 * (var(--card-width) + var(--card-gap)))); transition: transform 0.3s; }
.chunk-card { flex: 0 0 var(--card-width); border: 1px solid #e1e5ee; border-radius: 6px; padding: 8px; font-size: 12px; }
.chunk-card-header { display: flex; justify-content: space-between; font-weight: 600; }
.chunk-card-preview { color: #495057; margin: 6px 0; }
.chunk-card-footer { display: flex; justify-content: space-between; align-items: center; }
.chunk-more-card { display: flex; align-items: center; justify-content: center; text-align: center; background: #f8f9fc; }
.chunk-more-text { font-weight: 600; }
.chunk-more-subtitle { font-size: 11px; color: #8592a6; }
.carousel-nav { border: none; background: #e9ecef; border-radius: 50%; width: 26px; height: 26px; cursor: pointer; }
.chat-input { display: flex; gap: 8px; padding: 12px 20px; background: #fff; border-top: 1px solid #e1e5ee; }
.chat-input textarea { flex: 1; resize: none; padding: 8px; border-radius: 6px; border: 1px solid #ced4da; font: inherit; }
.btn { border: none; border-radius: 6px; padding: 8px 14px; cursor: pointer; }
.btn-primary { background: #4c6ef5; color: #fff; }
.btn-primary:disabled { opacity: 0.5; cursor: default; }
.btn-secondary { background: #e9ecef; }
.btn-danger { background: #ffe3e3; color: #c92a2a; }
.modal-overlay { display: none; }
.modal-overlay.show { display: flex; position: fixed; inset: 0; background: rgba(15, 23, 42, 0.45); align-items: center; justify-content: center; z-index: 10; }
.modal-content { background: #fff; border-radius: 10px; width: min(720px, 92vw); max-height: 85vh; display: flex; flex-direction: column; }
.modal-header, .modal-footer { display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; }
.modal-body { padding: 0 16px; overflow-y: auto; }
.modal-close { border: none; background: none; font-size: 22px; cursor: pointer; }
.chunk-modal-meta, .preview-meta { display: flex; gap: 16px; font-size: 12px; color: #5c677d; margin-bottom: 10px; }
.meta-label { font-weight: 600; margin-right: 4px; }
.alert-overlay { position: fixed; inset: 0; background: rgba(15, 23, 42, 0.45); display: flex; align-items: center; justify-content: center; z-index: 20; }
.alert-box { background: #fff; border-radius: 8px; padding: 16px 20px; max-width: 420px; }
"#;

/// Enter sends, Shift+Enter inserts a newline, Escape closes the topmost
/// modal, files can be dropped anywhere on the upload area, and new
/// scrollback entries are brought into view.
const SCRIPT: &str = r#"
document.addEventListener('keydown', function (event) {
    if (event.key === 'Escape') {
        htmx.ajax('POST', '/ui/modals/escape', { swap: 'none' });
    }
});
document.addEventListener('DOMContentLoaded', function () {
    var input = document.getElementById('message-input');
    input.addEventListener('keydown', function (event) {
        if (event.key === 'Enter' && !event.shiftKey) {
            event.preventDefault();
            htmx.trigger('#chat-form', 'submit');
        }
    });
    var area = document.getElementById('upload-area');
    var picker = document.getElementById('file-input');
    area.addEventListener('click', function () { picker.click(); });
    area.addEventListener('dragover', function (event) { event.preventDefault(); area.classList.add('dragover'); });
    area.addEventListener('dragleave', function () { area.classList.remove('dragover'); });
    area.addEventListener('drop', function (event) {
        event.preventDefault();
        area.classList.remove('dragover');
        picker.files = event.dataTransfer.files;
        htmx.trigger('#upload-form', 'submit');
    });
    picker.addEventListener('change', function () { htmx.trigger('#upload-form', 'submit'); });
});
document.addEventListener('htmx:afterSettle', function () {
    var messages = document.getElementById('chat-messages');
    if (messages) { messages.scrollTop = messages.scrollHeight; }
});
"#;

/// Renders the full page from the current session.
pub fn render_index(session: &ChatSession) -> String {
    let now = Local::now();
    let send_disabled = if session.is_sending() { " disabled" } else { "" };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>RAG Experimentation System</title>
<script src="{htmx}"></script>
<style>{style}</style>
</head>
<body>
<div class="app">
  <aside class="sidebar">
    <section>
      <h2>Upload Documents</h2>
      <form id="upload-form" hx-post="/ui/uploads" hx-encoding="multipart/form-data" hx-target="#{messages}" hx-swap="beforeend" hx-on::after-request="this.reset()">
        <div id="upload-area" class="upload-area">📄 Drop files here or click to browse</div>
        <input id="file-input" type="file" name="files" multiple hidden>
      </form>
    </section>
    <section>
      <h2>System Status</h2>
      <div hidden hx-get="/ui/status" hx-trigger="load" hx-target="#{status_id}" hx-swap="outerHTML"></div>
      {status}
    </section>
    <section>
      <h2>Documents</h2>
      <div hidden hx-get="/ui/documents" hx-trigger="load" hx-target="#{documents_id}" hx-swap="outerHTML"></div>
      {documents}
      <button class="btn btn-danger" hx-delete="/ui/documents" hx-confirm="Are you sure you want to clear all documents?" hx-target="#{messages}" hx-swap="beforeend">Clear All</button>
    </section>
  </aside>
  <main class="chat">
    <header class="chat-header">
      <h1>RAG Chat</h1>
      <button class="btn btn-secondary" hx-post="/ui/conversation" hx-confirm="Start a new conversation? This will clear the current chat history." hx-target="#{messages}" hx-swap="innerHTML">New Conversation</button>
    </header>
    <div id="{messages}">{scrollback}{in_flight}</div>
    <form id="chat-form" class="chat-input" hx-post="/ui/messages" hx-target="#{messages}" hx-swap="beforeend" hx-on::after-request="this.reset()">
      <textarea id="message-input" name="message" rows="2" placeholder="Ask a question about your documents..."></textarea>
      <button type="submit" id="{send}" class="btn btn-primary"{send_disabled}>Send</button>
    </form>
  </main>
</div>
{modals}
<div id="{alert}"></div>
<script>{script}</script>
</body>
</html>"##,
        htmx = HTMX_SRC,
        style = STYLE,
        messages = MESSAGES_ID,
        status_id = STATUS_ID,
        documents_id = DOCUMENTS_ID,
        status = render_status_panel(session.status(), session.status_error(), false),
        documents = render_documents_panel(session.documents(), session.documents_error(), false),
        scrollback = render_scrollback(session, now),
        in_flight = render_in_flight(session),
        send = SEND_BUTTON_ID,
        send_disabled = send_disabled,
        modals = render_modals(session.modals(), false),
        alert = ALERT_ID,
        script = SCRIPT,
    )
}
