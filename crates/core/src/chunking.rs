use crate::config::ChunkingConfig;
use crate::error::IngestError;
use crate::models::{Chunk, Document};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self, IngestError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    /// Lazily yields the chunks of `text`. Calling it again restarts the sequence.
    pub fn chunks<'a>(&self, source_id: &'a str, text: &'a str) -> Chunks<'a> {
        Chunks {
            source_id,
            text,
            size: self.config.chunk_size,
            stride: self.config.chunk_size - self.config.chunk_overlap,
            start: 0,
            tail: false,
            index: 0,
            done: text.is_empty(),
        }
    }

    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text();
        self.chunks(&document.source_id, &text).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    source_id: &'a str,
    text: &'a str,
    size: usize,
    stride: usize,
    // Byte offset where the next chunk starts.
    start: usize,
    // The next chunk is the uncovered remainder of the text.
    tail: bool,
    index: u64,
    done: bool,
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rest = &self.text[self.start..];
        let end = if self.tail {
            self.text.len()
        } else {
            self.start + byte_offset(rest, self.size)
        };
        let piece = &self.text[self.start..end];
        let chunk = Chunk {
            chunk_id: make_chunk_id(self.source_id, self.index, piece),
            source_id: self.source_id.to_string(),
            chunk_index: self.index,
            text: piece.to_string(),
        };

        if end == self.text.len() {
            self.done = true;
        } else {
            let next_start = self.start + byte_offset(rest, self.stride);
            // A full window would overrun the text; emit only the uncovered rest.
            if self.text[next_start..].chars().nth(self.size - 1).is_none() {
                self.start = end;
                self.tail = true;
            } else {
                self.start = next_start;
            }
            self.index += 1;
        }

        Some(chunk)
    }
}

fn make_chunk_id(source_id: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
