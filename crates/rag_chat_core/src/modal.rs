//! crates/rag_chat_core/src/modal.rs
//!
//! The three modals of the chat page and the order in which Escape closes them.

use crate::domain::DocumentDetail;
use crate::inspector::ChunkDetail;
use crate::status::format_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Chunk,
    ModeSwitch,
    DocumentPreview,
}

impl ModalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModalKind::Chunk => "chunk",
            ModalKind::ModeSwitch => "mode-switch",
            ModalKind::DocumentPreview => "document-preview",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chunk" => Some(ModalKind::Chunk),
            "mode-switch" => Some(ModalKind::ModeSwitch),
            "document-preview" => Some(ModalKind::DocumentPreview),
            _ => None,
        }
    }
}

/// The shared chunk modal. Created on first use and reused afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkModal {
    pub open: bool,
    pub detail: ChunkDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Loading { document_id: String },
    Loaded(DocumentDetail),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct Modals {
    chunk: Option<ChunkModal>,
    /// Total token count shown while the mode-switch notice is open.
    mode_switch: Option<u64>,
    preview: Option<PreviewState>,
}

impl Modals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `detail` in the shared chunk modal, creating it on first use.
    pub fn open_chunk(&mut self, detail: ChunkDetail) {
        match self.chunk.as_mut() {
            Some(modal) => {
                modal.detail = detail;
                modal.open = true;
            }
            None => self.chunk = Some(ChunkModal { open: true, detail }),
        }
    }

    pub fn open_mode_switch(&mut self, total_tokens: u64) {
        self.mode_switch = Some(total_tokens);
    }

    pub fn open_preview(&mut self, document_id: impl Into<String>) {
        self.preview = Some(PreviewState::Loading {
            document_id: document_id.into(),
        });
    }

    /// Stores the fetched document if the preview modal is still loading
    /// `document_id`. Returns `false` when the user closed it or opened
    /// another document in the meantime.
    pub fn resolve_preview(&mut self, document_id: &str, detail: DocumentDetail) -> bool {
        self.settle_preview(document_id, PreviewState::Loaded(detail))
    }

    /// Shows the failure inside the preview modal if it is still loading
    /// `document_id`. Returns `false` otherwise, so the caller falls back to
    /// an alert.
    pub fn fail_preview(&mut self, document_id: &str, message: impl Into<String>) -> bool {
        self.settle_preview(document_id, PreviewState::Failed(message.into()))
    }

    fn settle_preview(&mut self, document_id: &str, state: PreviewState) -> bool {
        let loading = matches!(
            &self.preview,
            Some(PreviewState::Loading { document_id: loading }) if loading == document_id
        );
        if loading {
            self.preview = Some(state);
        }
        loading
    }

    /// Close control or overlay click on a specific modal.
    pub fn close(&mut self, kind: ModalKind) {
        match kind {
            ModalKind::Chunk => {
                if let Some(modal) = self.chunk.as_mut() {
                    modal.open = false;
                }
            }
            ModalKind::ModeSwitch => self.mode_switch = None,
            ModalKind::DocumentPreview => self.preview = None,
        }
    }

    /// Closes the topmost open modal: chunk, then mode switch, then preview.
    pub fn escape(&mut self) -> Option<ModalKind> {
        let kind = if self.is_open(ModalKind::Chunk) {
            ModalKind::Chunk
        } else if self.is_open(ModalKind::ModeSwitch) {
            ModalKind::ModeSwitch
        } else if self.is_open(ModalKind::DocumentPreview) {
            ModalKind::DocumentPreview
        } else {
            return None;
        };
        self.close(kind);
        Some(kind)
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        match kind {
            ModalKind::Chunk => self.chunk.as_ref().is_some_and(|modal| modal.open),
            ModalKind::ModeSwitch => self.mode_switch.is_some(),
            ModalKind::DocumentPreview => self.preview.is_some(),
        }
    }

    pub fn chunk(&self) -> Option<&ChunkModal> {
        self.chunk.as_ref()
    }

    pub fn mode_switch_text(&self) -> Option<String> {
        self.mode_switch
            .map(|total| format!("Current tokens: {}", format_thousands(total)))
    }

    pub fn preview(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn detail(name: &str) -> ChunkDetail {
        ChunkDetail {
            document_name: name.to_string(),
            chunk_number: 1,
            similarity: "50.0%".to_string(),
            content_html: "text".to_string(),
        }
    }

    fn document() -> DocumentDetail {
        DocumentDetail {
            name: "a.txt".to_string(),
            token_count: 10,
            upload_time: Utc::now(),
            full_content_length: 40,
            content_preview: "hello".to_string(),
        }
    }

    #[test]
    fn chunk_modal_is_created_once_and_reused() {
        let mut modals = Modals::new();
        assert!(modals.chunk().is_none());

        modals.open_chunk(detail("first"));
        modals.close(ModalKind::Chunk);
        assert!(!modals.is_open(ModalKind::Chunk));
        assert!(modals.chunk().is_some());

        modals.open_chunk(detail("second"));
        let modal = modals.chunk().expect("modal exists");
        assert!(modal.open);
        assert_eq!(modal.detail.document_name, "second");
    }

    #[test]
    fn escape_prefers_chunk_modal() {
        let mut modals = Modals::new();
        modals.open_preview("doc-1");
        modals.open_mode_switch(12000);
        modals.open_chunk(detail("x"));

        assert_eq!(modals.escape(), Some(ModalKind::Chunk));
        assert_eq!(modals.escape(), Some(ModalKind::ModeSwitch));
        assert_eq!(modals.escape(), Some(ModalKind::DocumentPreview));
        assert_eq!(modals.escape(), None);
    }

    #[test]
    fn mode_switch_text_uses_separators() {
        let mut modals = Modals::new();
        modals.open_mode_switch(12345);
        assert_eq!(modals.mode_switch_text().as_deref(), Some("Current tokens: 12,345"));
    }

    #[test]
    fn preview_results_only_land_in_an_open_modal() {
        let mut modals = Modals::new();
        modals.open_preview("doc-1");
        assert!(modals.resolve_preview("doc-1", document()));
        assert!(matches!(modals.preview(), Some(PreviewState::Loaded(_))));

        modals.close(ModalKind::DocumentPreview);
        assert!(!modals.fail_preview("doc-1", "boom"));
        assert!(modals.preview().is_none());
    }

    #[test]
    fn late_result_for_another_document_is_dropped() {
        let mut modals = Modals::new();
        modals.open_preview("doc-1");
        modals.open_preview("doc-2");

        assert!(!modals.resolve_preview("doc-1", document()));
        assert!(!modals.fail_preview("doc-1", "boom"));
        assert_eq!(
            modals.preview(),
            Some(&PreviewState::Loading {
                document_id: "doc-2".to_string()
            })
        );

        assert!(modals.resolve_preview("doc-2", document()));
        assert!(!modals.resolve_preview("doc-2", document()));
    }

    #[test]
    fn modal_kind_round_trips_through_route_names() {
        for kind in [ModalKind::Chunk, ModalKind::ModeSwitch, ModalKind::DocumentPreview] {
            assert_eq!(ModalKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ModalKind::parse("other"), None);
    }
}
