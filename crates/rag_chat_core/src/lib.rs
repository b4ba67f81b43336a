pub mod copy;
pub mod domain;
pub mod format;
pub mod inspector;
pub mod modal;
pub mod ports;
pub mod render;
pub mod status;

pub use domain::{
    BackendStatus, ChatReply, Chunk, ContextMetrics, ConversationHistory, DocumentDetail,
    DocumentSummary, HistoryEntry, LimitType, Message, Mode, PendingUpload, Role, UploadReceipt,
};
pub use format::{escape_html, format_message};
pub use inspector::{ChunkDetail, ChunkInspector, Direction};
pub use modal::{ModalKind, Modals, PreviewState};
pub use ports::{ClipboardService, PortError, PortResult, RagBackend};
pub use status::{DocumentPanel, ProgressBar, StatusPanel};
