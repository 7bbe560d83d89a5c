use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CHUNK_SIZE: usize = 1_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_RETRIEVAL_K: usize = 4;
pub const DEFAULT_MAX_UPLOAD_FILES: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum IngestionPolicy {
    #[default]
    AbortBatch,
    SkipFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub endpoint: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub language_model: String,
    pub temperature: Option<f32>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dimensions: 384,
            language_model: "llama3.2".to_string(),
            temperature: None,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CopilotConfig {
    pub chunking: ChunkingConfig,
    pub models: ModelConfig,
    pub retrieval_k: usize,
    pub max_upload_files: usize,
    /// Dialogue turns handed to the model; `None` keeps the whole transcript.
    pub history_max_turns: Option<usize>,
    pub ingestion_policy: IngestionPolicy,
    pub persist_directory: PathBuf,
    pub upload_directory: PathBuf,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            models: ModelConfig::default(),
            retrieval_k: DEFAULT_RETRIEVAL_K,
            max_upload_files: DEFAULT_MAX_UPLOAD_FILES,
            history_max_turns: None,
            ingestion_policy: IngestionPolicy::AbortBatch,
            persist_directory: PathBuf::from("data/vector_index"),
            upload_directory: PathBuf::from("data/uploaded_pdfs"),
        }
    }
}
