pub mod clipboard;
pub mod rag_http;

pub use clipboard::SystemClipboard;
pub use rag_http::HttpRagBackend;
