use crate::extractor::{PageText, PdfExtractor};
use crate::index::VectorIndex;
use crate::models::{Chunk, ConversationTurn};
use crate::traits::{EmbeddingProvider, IndexStorage, LanguageModel};
use crate::{IndexError, IngestError, ModelError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) fn chunk(source_id: &str, chunk_index: u64, text: &str) -> Chunk {
    Chunk {
        chunk_id: format!("{source_id}#{chunk_index}"),
        source_id: source_id.to_string(),
        chunk_index,
        text: text.to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakeExtractor {
    documents: HashMap<String, Vec<String>>,
}

impl FakeExtractor {
    pub(crate) fn with_named(mut self, file_name: &str, pages: &[&str]) -> Self {
        self.documents.insert(
            file_name.to_string(),
            pages.iter().map(|page| page.to_string()).collect(),
        );
        self
    }

    pub(crate) fn with_document(self, path: &Path, pages: &[&str]) -> Self {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        self.with_named(&name, pages)
    }
}

impl PdfExtractor for FakeExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        self.documents
            .get(name)
            .map(|pages| {
                pages
                    .iter()
                    .enumerate()
                    .map(|(index, text)| PageText {
                        number: index as u32 + 1,
                        text: text.clone(),
                    })
                    .collect()
            })
            .ok_or_else(|| IngestError::PdfParse(format!("not a pdf: {}", path.display())))
    }
}

pub(crate) struct KeywordEmbedder {
    vocabulary: Vec<String>,
}

impl KeywordEmbedder {
    pub(crate) fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|word| word.to_string()).collect(),
        }
    }

    pub(crate) fn embed_text(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();

        self.vocabulary
            .iter()
            .map(|word| tokens.iter().filter(|token| **token == word.as_str()).count() as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn model_id(&self) -> &str {
        "keywords"
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) prompt: String,
    pub(crate) history: Vec<ConversationTurn>,
}

pub(crate) struct RecordingModel {
    reply: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingModel {
    pub(crate) fn answering(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            history: history.to_vec(),
        });

        self.reply.clone().ok_or_else(|| ModelError::BackendResponse {
            backend: "fake".to_string(),
            details: "model offline".to_string(),
        })
    }

    fn model_id(&self) -> &str {
        "recording"
    }
}

#[derive(Default)]
pub(crate) struct MemoryStorage {
    stored: Mutex<Option<VectorIndex>>,
    unavailable: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl IndexStorage for MemoryStorage {
    fn save(&self, index: &VectorIndex) -> Result<(), IndexError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IndexError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk unavailable",
            )));
        }

        *self.stored.lock().unwrap() = Some(index.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> Result<Option<VectorIndex>, IndexError> {
        Ok(self.stored.lock().unwrap().clone())
    }
}
