//! services/chat_ui/src/web/chat_task.rs
//!
//! This module contains the two halves of a chat exchange: accepting the
//! user's message, and completing it with the backend's reply.
//!
//! The server owns the second half. `start_send` spawns it right away, so a
//! reply lands in the session even if the page never asks for it.

use crate::web::session::Update;
use crate::web::state::AppState;
use rag_chat_core::domain::Message;
use rag_chat_core::render::reply_metadata;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Appends the user's message and marks a send as pending.
/// Returns `None` when the input is blank or a send is already in flight.
pub async fn begin_send(app_state: &AppState, text: &str) -> Option<Message> {
    app_state.session.lock().await.begin_send(text)
}

/// Accepts the message and spawns `complete_send` for it.
pub async fn start_send(app_state: &Arc<AppState>, text: &str) -> Option<Message> {
    let message = begin_send(app_state, text).await?;
    let task_state = app_state.clone();
    let pending_id = message.id;
    let handle = tokio::spawn(async move { complete_send(&task_state, pending_id).await });
    app_state.tasks.register(pending_id, handle).await;
    Some(message)
}

/// Waits for the reply to `pending_id`. Only the first caller gets it.
pub async fn collect_reply(app_state: &AppState, pending_id: Uuid) -> Update {
    app_state.tasks.collect(pending_id).await.unwrap_or_default()
}

/// Calls the backend for the pending send `pending_id` and appends the reply.
pub async fn complete_send(app_state: &AppState, pending_id: Uuid) -> Update {
    let mut update = Update::default();

    let Some((text, history)) = app_state.session.lock().await.pending_request(pending_id) else {
        warn!("No pending send with id {}", pending_id);
        return update;
    };

    let start_time = Instant::now();
    let result = app_state.backend.chat(&text, &history).await;

    let mut session = app_state.session.lock().await;
    session.finish_send(pending_id);

    match result {
        Ok(reply) => {
            info!(
                "⏱️ Chat reply in {:?} (mode: {}, {} chunks)",
                start_time.elapsed(),
                reply.mode.as_str(),
                reply.relevant_chunks.len()
            );
            session.record_exchange(&text, &reply.response);
            session.apply_metrics(&reply.context_metrics);

            let metadata = reply_metadata(&reply, &text);
            let assistant = Message::assistant(
                reply.response,
                reply.mode,
                Some(metadata),
                reply.relevant_chunks,
            );
            update.appended.push(session.push(assistant));
            update.status_changed = true;
        }
        Err(e) => {
            warn!("Chat request failed: {}", e);
            let detail = e.user_detail("Chat request failed");
            update
                .appended
                .push(session.push(Message::assistant_error(format!("Error: {}", detail))));
        }
    }

    update
}

/// Both halves in one call.
pub async fn send_message(app_state: &AppState, text: &str) -> Update {
    match begin_send(app_state, text).await {
        Some(user_message) => {
            let mut update = complete_send(app_state, user_message.id).await;
            update.appended.insert(0, user_message);
            update
        }
        None => Update::default(),
    }
}
