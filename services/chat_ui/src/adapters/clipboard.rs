//! services/chat_ui/src/adapters/clipboard.rs
//!
//! Implements the `ClipboardService` port on top of the host clipboard.

use arboard::Clipboard;
use rag_chat_core::ports::{ClipboardService, PortError, PortResult};
use std::sync::Mutex;
use tracing::debug;

/// Clipboard access through `arboard`.
///
/// The handle is opened lazily on the first copy and kept afterwards. A
/// headless host has no clipboard, so opening can fail on every call; the
/// caller then falls back to manual selection.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardService for SystemClipboard {
    fn copy_text(&self, text: &str) -> PortResult<()> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| PortError::Unexpected("clipboard lock poisoned".to_string()))?;

        if guard.is_none() {
            let clipboard = Clipboard::new()
                .map_err(|e| PortError::Unexpected(format!("clipboard unavailable: {}", e)))?;
            *guard = Some(clipboard);
        }

        let clipboard = guard
            .as_mut()
            .ok_or_else(|| PortError::Unexpected("clipboard unavailable".to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| PortError::Unexpected(format!("clipboard write failed: {}", e)))?;

        debug!("Copied {} characters to the clipboard", text.chars().count());
        Ok(())
    }
}
