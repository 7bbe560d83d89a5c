use crate::chunking::TextChunker;
use crate::config::CopilotConfig;
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::index::VectorIndex;
use crate::ingest::{duplicate_file_name, load_documents, stage_uploads, SkippedPdf};
use crate::models::{Chunk, Role, RetrievedChunk};
use crate::ollama::{OllamaChatModel, OllamaClient, OllamaEmbedder};
use crate::pipeline::AnsweringPipeline;
use crate::session::Session;
use crate::store::DirectoryStorage;
use crate::summarizer::{Summarizer, SummaryReport};
use crate::traits::{EmbeddingProvider, IndexStorage, LanguageModel};
use crate::{CopilotError, IndexError, IngestError, ValidationError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub source_id: String,
    pub title: String,
    pub checksum: String,
    pub pages: usize,
    pub chunks: usize,
}

#[derive(Debug)]
pub struct ProcessedBatch {
    pub documents: Vec<ProcessedDocument>,
    pub skipped_files: Vec<SkippedPdf>,
    pub chunk_count: usize,
}

pub struct Copilot {
    config: CopilotConfig,
    chunker: TextChunker,
    extractor: Arc<dyn PdfExtractor + Send + Sync>,
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn LanguageModel>,
    storage: Arc<dyn IndexStorage>,
}

impl Copilot {
    pub fn new(
        config: CopilotConfig,
        extractor: Arc<dyn PdfExtractor + Send + Sync>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn LanguageModel>,
        storage: Arc<dyn IndexStorage>,
    ) -> Result<Self, CopilotError> {
        let chunker = TextChunker::new(config.chunking)?;
        Ok(Self {
            config,
            chunker,
            extractor,
            embedder,
            model,
            storage,
        })
    }

    pub fn with_ollama(config: CopilotConfig) -> Result<Self, CopilotError> {
        let client = Arc::new(OllamaClient::from_config(&config.models)?);
        let embedder = OllamaEmbedder::new(
            Arc::clone(&client),
            config.models.embedding_model.clone(),
            config.models.embedding_dimensions,
        );
        Self::with_embedder(config, Arc::new(embedder), client)
    }

    pub fn with_embedder(
        config: CopilotConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        client: Arc<OllamaClient>,
    ) -> Result<Self, CopilotError> {
        let model = OllamaChatModel::new(
            client,
            config.models.language_model.clone(),
            config.models.temperature,
        );
        let storage = DirectoryStorage::new(config.persist_directory.clone());

        Self::new(
            config,
            Arc::new(LopdfExtractor),
            embedder,
            Arc::new(model),
            Arc::new(storage),
        )
    }

    pub fn config(&self) -> &CopilotConfig {
        &self.config
    }

    pub fn validate_upload_count(&self, count: usize) -> Result<(), ValidationError> {
        if count == 0 {
            return Err(ValidationError::NoFiles);
        }

        if count > self.config.max_upload_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.config.max_upload_files,
            });
        }

        Ok(())
    }

    pub async fn process_uploads(
        &self,
        session: &mut Session,
        files: &[PathBuf],
    ) -> Result<ProcessedBatch, CopilotError> {
        self.validate_upload_count(files.len())?;
        if let Some(name) = duplicate_file_name(files) {
            return Err(ValidationError::DuplicateFileName(name).into());
        }
        let staged = stage_uploads(&self.config.upload_directory, files)?;
        self.process_documents(session, &staged).await
    }

    /// The previous index stays in place if any step fails.
    pub async fn process_documents(
        &self,
        session: &mut Session,
        paths: &[PathBuf],
    ) -> Result<ProcessedBatch, CopilotError> {
        self.validate_upload_count(paths.len())?;

        let extractor = Arc::clone(&self.extractor);
        let owned_paths = paths.to_vec();
        let policy = self.config.ingestion_policy;
        let report = tokio::task::spawn_blocking(move || {
            load_documents(&owned_paths, extractor.as_ref(), policy)
        })
        .await
        .map_err(|error| IngestError::Worker(error.to_string()))??;

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut documents = Vec::with_capacity(report.documents.len());
        for document in &report.documents {
            let document_chunks = self.chunker.chunk_document(document);
            documents.push(ProcessedDocument {
                source_id: document.source_id.clone(),
                title: document.title.clone(),
                checksum: document.checksum.clone(),
                pages: document.pages.len(),
                chunks: document_chunks.len(),
            });
            chunks.extend(document_chunks);
        }

        let index =
            VectorIndex::build(&chunks, self.embedder.as_ref(), self.storage.as_ref()).await?;
        session.replace_index(index);

        info!(
            session_id = %session.id(),
            documents = documents.len(),
            skipped = report.skipped_files.len(),
            chunks = chunks.len(),
            "documents processed"
        );

        Ok(ProcessedBatch {
            chunk_count: chunks.len(),
            documents,
            skipped_files: report.skipped_files,
        })
    }

    /// Loads the persisted index into `session`. Returns whether one existed.
    pub fn restore(&self, session: &mut Session) -> Result<bool, CopilotError> {
        let Some(index) = VectorIndex::open(self.storage.as_ref())? else {
            return Ok(false);
        };

        if index.embedding_model() != self.embedder.model_id() {
            return Err(IndexError::ModelMismatch {
                index_model: index.embedding_model().to_string(),
                query_model: self.embedder.model_id().to_string(),
            }
            .into());
        }

        info!(
            session_id = %session.id(),
            entries = index.len(),
            built_at = %index.built_at().to_rfc3339(),
            "restored vector index"
        );
        session.replace_index(index);
        Ok(true)
    }

    fn pipeline(&self) -> AnsweringPipeline<'_> {
        AnsweringPipeline::new(
            self.embedder.as_ref(),
            self.model.as_ref(),
            self.config.retrieval_k,
            self.config.history_max_turns,
        )
    }

    pub async fn retrieve(
        &self,
        session: &Session,
        question: &str,
    ) -> Result<Vec<RetrievedChunk>, CopilotError> {
        let index = session.index().ok_or(ValidationError::NoActiveIndex)?;
        self.pipeline().retrieve(question, index).await
    }

    pub async fn ask(&self, session: &mut Session, question: &str) -> Result<String, CopilotError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion.into());
        }

        let index = session.index().ok_or(ValidationError::NoActiveIndex)?;
        let answer = self
            .pipeline()
            .answer(question, session.conversation(), index)
            .await
            .inspect_err(|error| warn!(session_id = %session.id(), %error, "answer failed"))?;

        let conversation = session.conversation_mut();
        conversation.push(Role::User, question);
        conversation.push(Role::Assistant, answer.clone());
        Ok(answer)
    }

    pub async fn summarize(&self, session: &mut Session) -> Result<SummaryReport, CopilotError> {
        let index = session.index().ok_or(ValidationError::NoActiveIndex)?;
        let report = Summarizer::new(self.model.as_ref()).summarize(index).await?;
        session.cache_summary(report.clone());
        Ok(report)
    }
}
