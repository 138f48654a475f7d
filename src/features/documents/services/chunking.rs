//! Recursive character text splitting with overlap

use std::collections::VecDeque;

/// Separators tried in order: paragraph, line, sentence, word, character
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text into chunks of at most `chunk_size` characters, where
/// consecutive chunks share up to `overlap` characters of context.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text; "" always matches
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut short_pieces: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                short_pieces.push(piece);
                continue;
            }

            if !short_pieces.is_empty() {
                chunks.extend(self.merge(&short_pieces, separator));
                short_pieces.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !short_pieces.is_empty() {
            chunks.extend(self.merge(&short_pieces, separator));
        }

        chunks
    }

    /// Greedily join pieces up to `chunk_size`, carrying a tail of at most
    /// `overlap` characters into the next chunk.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joined_len = |window_len: usize| if window_len > 0 { sep_len } else { 0 };

            if total + len + joined_len(window.len()) > self.chunk_size && !window.is_empty() {
                push_chunk(&mut chunks, &window, separator);

                while total > self.overlap
                    || (total > 0 && total + len + joined_len(window.len()) > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                }
            }

            total += len + joined_len(window.len());
            window.push_back(piece);
        }

        push_chunk(&mut chunks, &window, separator);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
