//! crates/rag_chat_core/src/copy.rs
//!
//! Copy-to-clipboard for chat messages, with a selection-based fallback when
//! no clipboard is reachable.

use std::time::Duration;

use tracing::warn;

use crate::ports::ClipboardService;

/// How long the "copied" state of a copy button lasts before it reverts.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The text is on the clipboard; show success feedback for `COPY_FEEDBACK`.
    Copied,
    /// The clipboard rejected the write; present the text pre-selected so the
    /// user can copy it by hand.
    SelectForManualCopy(String),
}

pub fn copy_with_fallback(clipboard: &dyn ClipboardService, text: &str) -> CopyOutcome {
    match clipboard.copy_text(text) {
        Ok(()) => CopyOutcome::Copied,
        Err(e) => {
            warn!("Clipboard write failed, falling back to manual selection: {}", e);
            CopyOutcome::SelectForManualCopy(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClipboard {
        written: Mutex<Vec<String>>,
    }

    impl ClipboardService for RecordingClipboard {
        fn copy_text(&self, text: &str) -> PortResult<()> {
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl ClipboardService for BrokenClipboard {
        fn copy_text(&self, _text: &str) -> PortResult<()> {
            Err(PortError::Unexpected("no display".to_string()))
        }
    }

    #[test]
    fn successful_copy() {
        let clipboard = RecordingClipboard::default();
        assert_eq!(copy_with_fallback(&clipboard, "hello"), CopyOutcome::Copied);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn failed_copy_falls_back_to_selection() {
        assert_eq!(
            copy_with_fallback(&BrokenClipboard, "hello"),
            CopyOutcome::SelectForManualCopy("hello".to_string())
        );
    }
}
