pub mod chunking;
pub mod config;
pub mod conversation;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod ollama;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod store;
pub mod summarizer;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use chunking::{Chunks, TextChunker};
pub use config::{ChunkingConfig, CopilotConfig, IngestionPolicy, ModelConfig};
pub use conversation::Conversation;
pub use embeddings::{cosine_similarity, CharacterNgramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{CopilotError, IndexError, IngestError, ModelError, ValidationError};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use index::VectorIndex;
pub use ingest::{
    digest_file, discover_pdf_files, duplicate_file_name, load_documents, stage_uploads,
    IngestionReport, SkippedPdf,
};
pub use models::{
    display_name, Chunk, ConversationTurn, Document, IndexEntry, RetrievedChunk, Role,
    SourceChunk,
};
pub use ollama::{OllamaChatModel, OllamaClient, OllamaEmbedder};
pub use orchestrator::{Copilot, ProcessedBatch, ProcessedDocument};
pub use pipeline::AnsweringPipeline;
pub use session::Session;
pub use store::DirectoryStorage;
pub use summarizer::{DocumentSummary, Summarizer, SummaryReport, NOTHING_TO_SUMMARIZE};
pub use traits::{EmbeddingProvider, IndexStorage, LanguageModel};
