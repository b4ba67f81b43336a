//! services/chat_ui/src/lib.rs
//!
//! The chat front-end service: HTTP adapters for the RAG backend and the
//! clipboard, and the htmx web layer that drives the chat page.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
