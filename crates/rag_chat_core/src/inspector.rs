//! crates/rag_chat_core/src/inspector.rs
//!
//! The chunk inspector: a carousel of preview cards for the passages a RAG
//! answer was grounded on, plus the detail view shown in the chunk modal.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Chunk;
use crate::format::format_message;

/// Cards rendered before the carousel is first navigated forward.
pub const MAX_PREVIEW_CARDS: usize = 6;
/// Characters of plain text shown on a card.
pub const PREVIEW_CHARS: usize = 80;
/// Cards scrolled per navigation step.
pub const NAV_STEP_CARDS: usize = 2;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

/// One preview card in the carousel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCard {
    /// Position of the chunk in the message's chunk list; the expand action carries it.
    pub position: usize,
    pub document_name: String,
    pub similarity: String,
    pub preview: String,
    /// 1-based chunk number within its document.
    pub chunk_number: usize,
}

/// What the modal shows for an expanded chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDetail {
    pub document_name: String,
    pub chunk_number: usize,
    pub similarity: String,
    /// Fully formatted HTML body.
    pub content_html: String,
}

impl From<&Chunk> for ChunkDetail {
    fn from(chunk: &Chunk) -> Self {
        Self {
            document_name: chunk.document_name.clone(),
            chunk_number: chunk.chunk_index + 1,
            similarity: similarity_detail(chunk.similarity_score),
            content_html: format_message(&chunk.content),
        }
    }
}

/// Reports what a navigation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// The truncated card set was replaced by the full one.
    pub materialized: bool,
    pub offset: usize,
}

/// Carousel state for one message's chunks.
#[derive(Debug, Clone)]
pub struct ChunkInspector {
    chunks: Vec<Chunk>,
    materialized: bool,
    offset: usize,
}

impl ChunkInspector {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        let materialized = chunks.len() <= MAX_PREVIEW_CARDS;
        Self {
            chunks,
            materialized,
            offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Leftmost visible card, in card units.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub fn cards(&self) -> Vec<ChunkCard> {
        let visible = if self.materialized {
            self.chunks.len()
        } else {
            MAX_PREVIEW_CARDS
        };

        self.chunks
            .iter()
            .take(visible)
            .enumerate()
            .map(|(position, chunk)| ChunkCard {
                position,
                document_name: chunk.document_name.clone(),
                similarity: similarity_percent(chunk.similarity_score),
                preview: plain_preview(&chunk.content),
                chunk_number: chunk.chunk_index + 1,
            })
            .collect()
    }

    /// Number of chunks hidden behind the "+N more" placeholder card, if any.
    pub fn more_placeholder(&self) -> Option<usize> {
        if self.materialized {
            None
        } else {
            Some(self.chunks.len() - MAX_PREVIEW_CARDS)
        }
    }

    /// Scrolls by two cards. The first forward step on a truncated carousel
    /// materializes the full card set; later steps only move the viewport.
    pub fn navigate(&mut self, direction: Direction) -> Navigation {
        let mut materialized = false;
        if direction == Direction::Forward && !self.materialized {
            self.materialized = true;
            materialized = true;
        }

        let last = self.cards_shown().saturating_sub(1);
        self.offset = match direction {
            Direction::Forward => (self.offset + NAV_STEP_CARDS).min(last),
            Direction::Back => self.offset.saturating_sub(NAV_STEP_CARDS),
        };

        Navigation {
            materialized,
            offset: self.offset,
        }
    }

    pub fn detail(&self, position: usize) -> Option<ChunkDetail> {
        self.chunks.get(position).map(ChunkDetail::from)
    }

    fn cards_shown(&self) -> usize {
        let cards = if self.materialized {
            self.chunks.len()
        } else {
            MAX_PREVIEW_CARDS
        };
        cards + usize::from(!self.materialized)
    }
}

/// `0.873` -> `"87%"`. Rounds half away from zero.
pub fn similarity_percent(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

/// `0.873` -> `"87.3%"`.
pub fn similarity_detail(score: f64) -> String {
    format!("{:.1}%", (score * 1000.0).round() / 10.0)
}

/// Strips tags, collapses whitespace and cuts to `PREVIEW_CHARS` characters.
pub fn plain_preview(content: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(content, "");
    let collapsed = WHITESPACE_PATTERN.replace_all(&without_tags, " ");
    let plain = collapsed.trim();

    if plain.chars().count() > PREVIEW_CHARS {
        let cut: String = plain.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        plain.to_string()
    }
}
