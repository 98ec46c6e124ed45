//! Recursive character text splitting with configurable size and overlap.
//!
//! Text is split on the first separator of [`SEPARATORS`] that occurs in it.
//! Pieces that still exceed the chunk size are split again with the remaining,
//! finer separators, down to single characters. Adjacent pieces are then
//! merged greedily into chunks of at most `chunk_size` characters, carrying up
//! to `chunk_overlap` trailing characters into the next chunk.

use crate::types::Chunk;
use docqa_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::ops::Range;

/// Separators in priority order: paragraphs, lines, sentences, words.
pub const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "? ", "! ", " "];

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default number of characters shared between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Splits document text into chunks for embedding.
pub trait Chunker: Send + Sync {
    /// Split `text` into ordered, trimmed, non-empty chunks.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// A piece of the source text, addressed by byte offsets.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
}

impl Span {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            chars: text[start..end].chars().count(),
        }
    }
}

/// Recursive separator-based chunker.
///
/// Lengths are measured in Unicode scalar values; a chunk never ends inside a
/// character.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a chunker, rejecting `chunk_size == 0` and `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text[start..end]`, appending the byte ranges of finished chunks.
    fn split_range(
        &self,
        text: &str,
        start: usize,
        end: usize,
        separators: &[&str],
        out: &mut Vec<Range<usize>>,
    ) {
        let segment = &text[start..end];

        let (separator, finer) = match separators.iter().position(|s| segment.contains(s)) {
            Some(i) => (Some(separators[i]), &separators[i + 1..]),
            None => (None, &separators[separators.len()..]),
        };

        let mut fitting: Vec<Span> = Vec::new();
        for piece in pieces(text, start, end, separator) {
            if piece.chars <= self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                self.merge(text, &fitting, out);
                fitting.clear();
            }
            self.split_range(text, piece.start, piece.end, finer, out);
        }

        if !fitting.is_empty() {
            self.merge(text, &fitting, out);
        }
    }

    /// Greedily merge adjacent pieces into chunks, keeping an overlap window.
    fn merge(&self, text: &str, pieces: &[Span], out: &mut Vec<Range<usize>>) {
        let mut window: VecDeque<Span> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            if total + piece.chars > self.chunk_size && !window.is_empty() {
                emit(text, &window, out);

                while total > self.chunk_overlap
                    || (total + piece.chars > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(first) => total -= first.chars,
                        None => break,
                    }
                }
            }

            window.push_back(*piece);
            total += piece.chars;
        }

        emit(text, &window, out);
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut ranges = Vec::new();
        self.split_range(text, 0, text.len(), &SEPARATORS, &mut ranges);

        let chunks: Vec<Chunk> = ranges
            .into_iter()
            .enumerate()
            .map(|(position, byte_range)| Chunk {
                position,
                text: text[byte_range.clone()].to_string(),
                byte_range,
            })
            .collect();

        tracing::debug!(
            "Chunked text into {} chunks (size: {}, overlap: {})",
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        chunks
    }
}

/// Split `text[start..end]` on `separator`, keeping each separator at the end
/// of the piece it terminates. `None` splits into single characters.
fn pieces(text: &str, start: usize, end: usize, separator: Option<&str>) -> Vec<Span> {
    let segment = &text[start..end];

    match separator {
        Some(sep) => {
            let mut spans = Vec::new();
            let mut last = 0;
            for (idx, matched) in segment.match_indices(sep) {
                let piece_end = idx + matched.len();
                spans.push(Span::new(text, start + last, start + piece_end));
                last = piece_end;
            }
            if last < segment.len() {
                spans.push(Span::new(text, start + last, end));
            }
            spans
        }
        None => segment
            .char_indices()
            .map(|(idx, c)| Span {
                start: start + idx,
                end: start + idx + c.len_utf8(),
                chars: 1,
            })
            .collect(),
    }
}

/// Push the trimmed byte range covered by `window`, unless it is blank.
fn emit(text: &str, window: &VecDeque<Span>, out: &mut Vec<Range<usize>>) {
    let (Some(first), Some(last)) = (window.front(), window.back()) else {
        return;
    };

    let raw = &text[first.start..last.end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }

    let lead = raw.len() - raw.trim_start().len();
    let start = first.start + lead;
    out.push(start..start + trimmed.len());
}

/// Split `text` into chunk strings of at most `chunk_size` characters.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> AppResult<Vec<String>> {
    let chunker = RecursiveChunker::new(chunk_size, chunk_overlap)?;
    Ok(chunker.chunk(text).into_iter().map(|c| c.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            RecursiveChunker::new(0, 0),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            RecursiveChunker::new(10, 10),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            RecursiveChunker::new(10, 20),
            Err(AppError::Config(_))
        ));
        assert!(RecursiveChunker::new(10, 0).is_ok());
    }

    #[test]
    fn test_default_parameters() {
        let chunker = RecursiveChunker::default();
        assert_eq!(chunker.chunk_size(), 500);
        assert_eq!(chunker.chunk_overlap(), 50);
    }

    #[test]
    fn test_short_text_single_trimmed_chunk() {
        let chunks = chunk_text("  hello world  ", 100, 10).unwrap();
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert!(chunk_text("", 100, 10).unwrap().is_empty());
        assert!(chunk_text(" \n\n  \n ", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_splits_on_sentences() {
        let chunks = chunk_text("A cat sat. A dog ran.", 12, 0).unwrap();
        assert_eq!(chunks, vec!["A cat sat.", "A dog ran."]);
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let chunks = chunk_text("para one.\n\npara two.", 15, 0).unwrap();
        assert_eq!(chunks, vec!["para one.", "para two."]);
    }

    #[test]
    fn test_word_overlap() {
        let chunks = chunk_text("one two three four five six", 14, 6).unwrap();
        assert_eq!(chunks, vec!["one two three", "three four", "four five six"]);
    }

    #[test]
    fn test_character_fallback() {
        let chunks = chunk_text("abcdefghij", 4, 1).unwrap();
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_positions_and_byte_ranges() {
        let text = "héllo wörld ünïcode çàfé naïve résumé";
        let chunker = RecursiveChunker::new(8, 2).unwrap();
        let chunks = chunker.chunk(text);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position, i);
            assert_eq!(&text[chunk.byte_range.clone()], chunk.text);
            assert!(chunk.text.chars().count() <= 8);
        }
    }

    #[test]
    fn test_covers_every_word_within_size() {
        let text: String = (0..200)
            .map(|i| {
                if i % 7 == 6 {
                    format!("word{}.\n", i)
                } else {
                    format!("word{} ", i)
                }
            })
            .collect();

        let chunker = RecursiveChunker::new(50, 10).unwrap();
        let chunks = chunker.chunk(&text);

        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert!(chunk.text.chars().count() <= 50);
        }

        let mut starts = chunks.iter().map(|c| c.byte_range.start).peekable();
        while let Some(start) = starts.next() {
            if let Some(next) = starts.peek() {
                assert!(start <= *next);
            }
        }

        for i in 0..200 {
            let word = format!("word{}", i);
            assert!(
                chunks.iter().any(|c| c
                    .text
                    .split(|ch: char| ch.is_whitespace() || ch == '.')
                    .any(|w| w == word)),
                "missing {}",
                word
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "First paragraph here.\n\nSecond one! Does it split? Yes it does.";
        let a = chunk_text(text, 20, 5).unwrap();
        let b = chunk_text(text, 20, 5).unwrap();
        assert_eq!(a, b);
    }
}
