//! services/chat_ui/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::session::{ChatSession, Update};
use rag_chat_core::ports::{ClipboardService, RagBackend};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use uuid::Uuid;

/// Finished tasks nobody collected are pruned once this many are registered.
const MAX_UNCOLLECTED_TASKS: usize = 64;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub backend: Arc<dyn RagBackend>,
    pub clipboard: Arc<dyn ClipboardService>,
    pub config: Arc<Config>,
    /// Never held across a backend call.
    pub session: Mutex<ChatSession>,
    pub tasks: BackgroundTasks,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn RagBackend>,
        clipboard: Arc<dyn ClipboardService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            backend,
            clipboard,
            config,
            session: Mutex::new(ChatSession::new()),
            tasks: BackgroundTasks::default(),
        }
    }
}

//=========================================================================================
// BackgroundTasks (Server-Owned Backend Work)
//=========================================================================================

/// Backend work started by one request and collected by a later one.
///
/// A task runs to completion whether or not anyone collects it; its effects
/// land in the session either way. Each task can be collected once.
#[derive(Default)]
pub struct BackgroundTasks {
    handles: Mutex<HashMap<Uuid, JoinHandle<Update>>>,
}

impl BackgroundTasks {
    pub async fn register(&self, id: Uuid, handle: JoinHandle<Update>) {
        let mut handles = self.handles.lock().await;
        if handles.len() >= MAX_UNCOLLECTED_TASKS {
            handles.retain(|_, handle| !handle.is_finished());
        }
        handles.insert(id, handle);
    }

    /// Waits for task `id` and returns what it changed. Returns `None` when
    /// the task is unknown or another request already collected it.
    pub async fn collect(&self, id: Uuid) -> Option<Update> {
        let handle = self.handles.lock().await.remove(&id);
        let Some(handle) = handle else {
            debug!("No background task {} to collect", id);
            return None;
        };
        match handle.await {
            Ok(update) => Some(update),
            Err(e) => {
                error!("Background task {} failed: {}", id, e);
                None
            }
        }
    }
}
