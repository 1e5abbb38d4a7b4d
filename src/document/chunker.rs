//! Recursive separator chunking
//!
//! Page text is split on the coarsest separator present (paragraph break,
//! then line break, then space, then single characters) and the pieces are
//! greedily merged back into chunks of at most `chunk_size` characters.
//! Pieces that are still too large are split again with the next, finer
//! separator. Consecutive chunks produced from one run of pieces share up to
//! `chunk_overlap` characters.
//!
//! All sizes are measured in characters, not bytes. Separators stay attached
//! to the piece that follows them, so every chunk is a contiguous span of the
//! page text (trimmed of surrounding whitespace).

use std::collections::VecDeque;
use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::models::PageText;
use crate::models::Passage;
use crate::models::PassageMetadata;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Separators from coarsest to finest; `""` means single characters
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

const fn default_chunk_size() -> usize {
    500
}

const fn default_chunk_overlap() -> usize {
    50
}

fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(ToString::to_string).collect()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: default_separators(),
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        }
    }

    /// # Errors
    /// `ChatPdfError::Config` when the size is zero, the overlap is not
    /// smaller than the size, or no separators are given.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChatPdfError::Config(
                "chunking.chunk_size must be at least 1".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChatPdfError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.separators.is_empty() {
            return Err(ChatPdfError::Config(
                "chunking.separators must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A chunk of one page, before it is attached to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Character offset of `text` within the page
    pub start_index: usize,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// # Errors
    /// Rejects invalid parameters, see [`ChunkingConfig::validate`].
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split every page into passages tagged with page number and source
    #[must_use]
    pub fn split(&self, pages: &[PageText], source_id: &str) -> Vec<Passage> {
        let mut passages = Vec::new();

        for page in pages {
            for chunk in self.split_text(&page.text) {
                let chunk_index = passages.len();
                passages.push(Passage {
                    text: chunk.text,
                    metadata: PassageMetadata {
                        page: Some(page.number),
                        source_id: source_id.to_string(),
                        start_index: chunk.start_index,
                        chunk_index,
                    },
                });
            }
        }

        debug!(
            "Split {} pages into {} passages (size={}, overlap={})",
            pages.len(),
            passages.len(),
            self.config.chunk_size,
            self.config.chunk_overlap
        );
        passages
    }

    /// Split one text into chunks
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<Chunk> {
        let mut spans = Vec::new();
        if text.chars().count() <= self.config.chunk_size {
            spans.push(0..text.len());
        } else {
            self.split_span(text, 0..text.len(), &self.config.separators, &mut spans);
        }

        spans
            .into_iter()
            .filter_map(|span| trim_span(text, span))
            .map(|span| Chunk {
                start_index: text[..span.start].chars().count(),
                text: text[span].to_string(),
            })
            .collect()
    }

    fn split_span(
        &self,
        text: &str,
        span: Range<usize>,
        separators: &[String],
        out: &mut Vec<Range<usize>>,
    ) {
        let segment = &text[span.clone()];

        // Coarsest separator that occurs in this segment; the empty
        // separator always matches and ends the descent.
        let mut separator = separators.last().map_or("", String::as_str);
        let mut finer: &[String] = &[];
        for (idx, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if segment.contains(candidate.as_str()) {
                separator = candidate.as_str();
                finer = &separators[idx + 1..];
                break;
            }
        }

        let mut fitting = Vec::new();
        for piece in split_keeping_separator(segment, span.start, separator) {
            if char_len(text, &piece) <= self.config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                self.merge(text, &fitting, out);
                fitting.clear();
            }
            if finer.is_empty() {
                // Indivisible with the configured separators
                out.push(piece);
            } else {
                self.split_span(text, piece, finer, out);
            }
        }

        if !fitting.is_empty() {
            self.merge(text, &fitting, out);
        }
    }

    /// Greedily join contiguous pieces into spans of at most `chunk_size`
    /// characters, carrying up to `chunk_overlap` characters into the next span.
    fn merge(&self, text: &str, pieces: &[Range<usize>], out: &mut Vec<Range<usize>>) {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(text, piece);

            if total + len > size && !window.is_empty() {
                out.push(window_span(&window));
                while total > overlap || (total + len > size && total > 0) {
                    let Some((_, dropped)) = window.pop_front() else {
                        break;
                    };
                    total -= dropped;
                }
            }

            window.push_back((piece.clone(), len));
            total += len;
        }

        if !window.is_empty() {
            out.push(window_span(&window));
        }
    }
}

/// Byte ranges of the pieces of `segment`, offset by `base`. Each separator
/// occurrence begins a new piece.
fn split_keeping_separator(segment: &str, base: usize, separator: &str) -> Vec<Range<usize>> {
    if separator.is_empty() {
        return segment
            .char_indices()
            .map(|(idx, ch)| base + idx..base + idx + ch.len_utf8())
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in segment.match_indices(separator) {
        if idx > start {
            pieces.push(base + start..base + idx);
        }
        start = idx;
    }
    if start < segment.len() {
        pieces.push(base + start..base + segment.len());
    }
    pieces
}

fn window_span(window: &VecDeque<(Range<usize>, usize)>) -> Range<usize> {
    match (window.front(), window.back()) {
        (Some((first, _)), Some((last, _))) => first.start..last.end,
        _ => 0..0,
    }
}

fn char_len(text: &str, span: &Range<usize>) -> usize {
    text[span.clone()].chars().count()
}

/// Shrink `span` to exclude surrounding whitespace; `None` if nothing is left
fn trim_span(text: &str, span: Range<usize>) -> Option<Range<usize>> {
    let segment = &text[span.clone()];
    let start = span.start + (segment.len() - segment.trim_start().len());
    let end = span.start + segment.trim_end().len();
    (start < end).then_some(start..end)
}
