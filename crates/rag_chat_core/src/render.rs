//! crates/rag_chat_core/src/render.rs
//!
//! Platform-independent parts of the message renderer: timestamps, the
//! metadata line under assistant replies, and which affordances a message gets.

use chrono::{DateTime, Local};

use crate::domain::{ChatReply, Message, Role};
use crate::status::format_thousands;

/// Time only for messages from today, otherwise a compact date and time.
pub fn format_timestamp(at: DateTime<Local>, now: DateTime<Local>) -> String {
    if at.date_naive() == now.date_naive() {
        at.format("%H:%M").to_string()
    } else {
        at.format("%b %-d, %H:%M").to_string()
    }
}

/// Builds the metadata line shown under an assistant reply, e.g.
/// `Mode: rag • 4 chunks retrieved • Context: 1,234 tokens`.
pub fn reply_metadata(reply: &ChatReply, sent_message: &str) -> String {
    let mut metadata = format!("Mode: {}", reply.mode.display_name());
    if reply.relevant_chunks_count > 0 {
        metadata.push_str(&format!(
            " • {} chunks retrieved",
            reply.relevant_chunks_count
        ));
    }
    metadata.push_str(&format!(
        " • Context: {} tokens",
        format_thousands(reply.context_tokens_used)
    ));

    if let Some(query) = reply.enhanced_query.as_deref() {
        if !query.is_empty() && query != sent_message {
            metadata.push_str(&format!(" • Enhanced query: \"{query}\""));
        }
    }

    metadata
}

/// User and assistant messages get a copy button unless they report an error.
pub fn offers_copy(message: &Message) -> bool {
    message.role != Role::System && !message.is_error
}
