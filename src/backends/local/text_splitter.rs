// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use crate::config::consts::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Recursive character splitter.
///
/// Text is cut on the coarsest separator that occurs in it (blank line, then
/// newline, then space, then between characters). Pieces shorter than
/// `chunk_size` are merged back together up to `chunk_size` characters, with
/// roughly `chunk_overlap` characters carried from the end of one chunk into
/// the start of the next. Pieces that are still too long are split again with
/// the next finer separator.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`; a zero size is treated as 1.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    /// Chunks paired with the character offset where each starts in `text`.
    ///
    /// The offset is `None` when a chunk cannot be located verbatim, which
    /// happens when runs of separators were collapsed.
    pub fn split_with_offsets(&self, text: &str) -> Vec<(Option<usize>, String)> {
        let mut search_from = 0;
        self.split(text)
            .into_iter()
            .map(|chunk| {
                let found = text
                    .get(search_from..)
                    .and_then(|rest| rest.find(chunk.as_str()))
                    .map(|i| search_from + i);
                let offset = found.map(|byte| {
                    let step = chunk.chars().next().map_or(1, char::len_utf8);
                    search_from = byte + step;
                    char_len(&text[..byte])
                });
                (offset, chunk)
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep));
        let (separator, finer) = match position {
            Some(i) => (separators[i], &separators[i + 1..]),
            None => ("", &[][..]),
        };

        let pieces: Vec<&str> = text.split(separator).filter(|p| !p.is_empty()).collect();

        let mut chunks = Vec::new();
        let mut short: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() {
                chunks.extend(self.merge(&short, separator));
                short.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }
        if !short.is_empty() {
            chunks.extend(self.merge(&short, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_joined(&mut docs, &window, separator);

                while !window.is_empty()
                    && (total > self.chunk_overlap
                        || total + len + sep_len > self.chunk_size)
                {
                    if let Some(first) = window.pop_front() {
                        total -= char_len(first) + if window.is_empty() { 0 } else { sep_len };
                    }
                }
            }

            let joiner = if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
            total += len + joiner;
        }

        push_joined(&mut docs, &window, separator);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::new(100, 20);
        assert_eq!(splitter.split("Refunds within 30 days."), vec!["Refunds within 30 days."]);
    }

    #[test]
    fn test_empty_and_blank_text_yield_nothing() {
        let splitter = TextSplitter::default();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_words_overlap_between_chunks() {
        let splitter = TextSplitter::new(10, 5);
        let chunks = splitter.split_with_offsets("aaaa bbbb cccc dddd");

        assert_eq!(
            chunks,
            vec![
                (Some(0), "aaaa bbbb".to_string()),
                (Some(5), "bbbb cccc".to_string()),
                (Some(10), "cccc dddd".to_string()),
            ]
        );
    }

    #[test]
    fn test_paragraphs_are_preferred_boundaries() {
        let splitter = TextSplitter::new(30, 0);
        let text = "First paragraph here.\n\nSecond paragraph here.";
        assert_eq!(
            splitter.split(text),
            vec!["First paragraph here.", "Second paragraph here."]
        );
    }

    #[test]
    fn test_long_words_fall_back_to_characters() {
        let splitter = TextSplitter::new(4, 0);
        let chunks = splitter.split("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
    }

    #[test]
    fn test_no_chunk_exceeds_size_for_prose() {
        let splitter = TextSplitter::new(50, 10);
        let text = "The refund policy allows returns within thirty days. \
                    Items must be unused.\nShipping costs are not refunded.\n\n\
                    Contact support for exceptions to this policy.";
        for chunk in splitter.split(text) {
            assert!(chunk.chars().count() <= 50, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn test_overlap_is_clamped_below_size() {
        let splitter = TextSplitter::new(10, 50);
        assert_eq!(splitter.chunk_overlap(), 9);
        assert_eq!(TextSplitter::new(0, 0).chunk_size(), 1);
    }
}
