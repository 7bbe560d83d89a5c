use crate::embeddings::cosine_similarity;
use crate::models::{Chunk, IndexEntry, RetrievedChunk, SourceChunk};
use crate::traits::{EmbeddingProvider, IndexStorage};
use crate::{CopilotError, IndexError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    format_version: u32,
    embedding_model: String,
    dimensions: usize,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub async fn build(
        chunks: &[Chunk],
        embedder: &dyn EmbeddingProvider,
        storage: &dyn IndexStorage,
    ) -> Result<Self, CopilotError> {
        let texts = chunks
            .iter()
            .map(|chunk| chunk.text.clone())
            .collect::<Vec<_>>();
        let embeddings = embedder.embed_batch(&texts).await?;

        let index = Self::from_embeddings(
            embedder.model_id(),
            embedder.dimensions(),
            chunks,
            embeddings,
        )?;
        storage.save(&index)?;

        info!(
            entries = index.len(),
            embedding_model = %index.embedding_model,
            "vector index built"
        );
        Ok(index)
    }

    pub fn from_embeddings(
        embedding_model: &str,
        dimensions: usize,
        chunks: &[Chunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if chunks.len() != embeddings.len() {
            return Err(IndexError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let entries = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                if embedding.len() != dimensions {
                    return Err(IndexError::DimensionMismatch {
                        expected: dimensions,
                        found: embedding.len(),
                    });
                }

                Ok(IndexEntry {
                    chunk: chunk.clone(),
                    embedding,
                })
            })
            .collect::<Result<Vec<_>, IndexError>>()?;

        Ok(Self {
            format_version: INDEX_FORMAT_VERSION,
            embedding_model: embedding_model.to_string(),
            dimensions,
            built_at: Utc::now(),
            entries,
        })
    }

    pub fn open(storage: &dyn IndexStorage) -> Result<Option<Self>, IndexError> {
        let Some(index) = storage.load()? else {
            return Ok(None);
        };

        if index.format_version != INDEX_FORMAT_VERSION {
            return Err(IndexError::UnsupportedFormat(index.format_version));
        }

        Ok(Some(index))
    }

    /// At most `k` chunks by non-increasing cosine similarity; ties keep insertion order.
    pub fn query(&self, query_vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, IndexError> {
        if query_vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                found: query_vector.len(),
            });
        }

        let mut scored = self
            .entries
            .iter()
            .map(|entry| RetrievedChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_vector, &entry.embedding),
            })
            .collect::<Vec<_>>();

        scored.sort_by(|left, right| right.score.total_cmp(&left.score));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn list_all(&self) -> Vec<SourceChunk> {
        self.entries
            .iter()
            .map(|entry| SourceChunk {
                source_id: entry.chunk.source_id.clone(),
                text: entry.chunk.text.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
