//! crates/rag_chat_core/src/status.rs
//!
//! View models for the sidebar: the document list and the mode/token status
//! panel with its context progress bar.

use chrono::{DateTime, Local, Utc};

use crate::domain::{BackendStatus, ContextMetrics, DocumentSummary, LimitType, Mode};

pub const WARNING_THRESHOLD: f64 = 70.0;
pub const DANGER_THRESHOLD: f64 = 90.0;

/// Formats a count with comma separators (e.g. 12450 -> "12,450").
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

//=========================================================================================
// Progress bar
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillLevel {
    Normal,
    Warning,
    Danger,
}

impl FillLevel {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= DANGER_THRESHOLD {
            FillLevel::Danger
        } else if percentage >= WARNING_THRESHOLD {
            FillLevel::Warning
        } else {
            FillLevel::Normal
        }
    }

    /// Extra CSS class on the bar; `Normal` uses the default styling.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            FillLevel::Normal => None,
            FillLevel::Warning => Some("warning"),
            FillLevel::Danger => Some("danger"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    /// Bar width in percent, capped to `0..=100`.
    pub width_percent: f64,
    pub level: FillLevel,
    pub label: String,
}

impl From<&ContextMetrics> for ProgressBar {
    fn from(metrics: &ContextMetrics) -> Self {
        let percentage = metrics.context_fill_percentage;
        let limit = match metrics.context_limit_type {
            LimitType::DocumentLimit => "Full Context",
            LimitType::RagLimit => "RAG",
        };

        Self {
            width_percent: percentage.clamp(0.0, 100.0),
            level: FillLevel::for_percentage(percentage),
            label: format!(
                "{}: {} / {} tokens ({:.1}%)",
                limit,
                format_thousands(metrics.context_tokens_used),
                format_thousands(metrics.max_context_tokens),
                percentage
            ),
        }
    }
}

//=========================================================================================
// Status panel
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StatusPanel {
    pub mode: Mode,
    pub mode_label: String,
    pub tokens_label: String,
    pub documents_label: String,
    pub progress: ProgressBar,
}

impl StatusPanel {
    pub fn mode_class(&self) -> &'static str {
        match self.mode {
            Mode::Rag => "rag-mode",
            Mode::FullContext => "full-context-mode",
        }
    }

    /// Applies fresh metrics from a chat reply without re-polling status.
    pub fn with_metrics(mut self, metrics: &ContextMetrics) -> Self {
        self.progress = ProgressBar::from(metrics);
        self
    }
}

impl From<&BackendStatus> for StatusPanel {
    fn from(status: &BackendStatus) -> Self {
        Self {
            mode: status.current_mode,
            mode_label: format!("Mode: {}", status.current_mode.display_name().to_uppercase()),
            tokens_label: format!("Tokens: {}", format_thousands(status.total_tokens)),
            documents_label: format!("Documents: {}", status.total_documents),
            progress: ProgressBar::from(&status.context_metrics),
        }
    }
}

//=========================================================================================
// Document panel
//=========================================================================================

pub const EMPTY_DOCUMENTS: &str = "No documents uploaded yet";

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub meta: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentPanel {
    pub rows: Vec<DocumentRow>,
}

impl DocumentPanel {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&[DocumentSummary]> for DocumentPanel {
    fn from(documents: &[DocumentSummary]) -> Self {
        let rows = documents
            .iter()
            .map(|doc| DocumentRow {
                id: doc.id.clone(),
                name: doc.name.clone(),
                meta: format!(
                    "{} tokens • Uploaded {}",
                    format_thousands(doc.token_count),
                    local_datetime(doc.upload_time)
                ),
            })
            .collect();
        Self { rows }
    }
}

/// Renders a backend timestamp in the viewer's local time zone.
pub fn local_datetime(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
