//! Recursive chunking strategy

use std::collections::HashMap;

use crate::domain::ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, TextUnit};
use crate::domain::DomainError;

/// Separators tried in priority order; the empty separator splits per character
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Chunking strategy that splits text hierarchically
///
/// Splitting order: paragraphs -> lines -> words -> characters. A finer
/// separator is only used for pieces that cannot fit in a chunk after the
/// overlap prefix. Pieces are then packed greedily, and each new chunk starts
/// with the trailing `chunk_overlap` characters of the previous one.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker;

impl RecursiveChunker {
    /// Create a new recursive chunker
    pub fn new() -> Self {
        Self
    }

    /// Split one unit's text into chunk contents
    pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        if text.chars().count() <= config.chunk_size {
            return vec![text.to_string()];
        }

        let mut pieces = Vec::new();
        Self::atomize(text, &SEPARATORS, config.piece_capacity(), &mut pieces);

        Self::merge(&pieces, config)
    }

    /// Break `text` into pieces no longer than `capacity` characters
    fn atomize<'a>(text: &'a str, separators: &[&str], capacity: usize, out: &mut Vec<&'a str>) {
        let Some(pos) = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
        else {
            out.push(text);
            return;
        };

        let finer = &separators[pos + 1..];

        for piece in Self::split_keeping_separator(text, separators[pos]) {
            if !finer.is_empty() && piece.chars().count() > capacity {
                Self::atomize(piece, finer, capacity, out);
            } else {
                out.push(piece);
            }
        }
    }

    /// Split on `separator`, attaching each separator to the piece after it
    fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
        if separator.is_empty() {
            return text
                .char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect();
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        for (idx, _) in text.match_indices(separator) {
            if idx > start {
                pieces.push(&text[start..idx]);
                start = idx;
            }
        }

        if start < text.len() {
            pieces.push(&text[start..]);
        }

        pieces
    }

    /// Pack pieces greedily into chunks of at most `chunk_size` characters
    fn merge(pieces: &[&str], config: &ChunkingConfig) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0;
        // false until the first piece lands; every flush is followed by a push
        let mut has_new = false;

        for piece in pieces {
            let piece_len = piece.chars().count();

            if has_new && buffer_len + piece_len > config.chunk_size {
                let overlap = tail_chars(&buffer, config.chunk_overlap).to_string();
                chunks.push(std::mem::replace(&mut buffer, overlap));
                buffer_len = buffer.chars().count();
            }

            buffer.push_str(piece);
            buffer_len += piece_len;
            has_new = true;
        }

        if has_new {
            chunks.push(buffer);
        }

        chunks
    }
}

/// The last `n` characters of `s`
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }

    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn split(&self, units: &[TextUnit], config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let mut next_index: HashMap<&str, usize> = HashMap::new();
        let mut chunks = Vec::new();

        for unit in units {
            for content in Self::split_text(&unit.content, config) {
                let index = next_index.entry(unit.source_id.as_str()).or_insert(0);
                chunks.push(Chunk::new(content, &unit.source_id, unit.page_index, *index));
                *index += 1;
            }
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
