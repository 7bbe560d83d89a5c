use crate::index::VectorIndex;
use crate::models::ConversationTurn;
use crate::{IndexError, ModelError};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize;

    /// Index builds and question embeddings must agree on this id.
    fn model_id(&self) -> &str;
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ModelError>;

    fn model_id(&self) -> &str;
}

pub trait IndexStorage: Send + Sync {
    fn save(&self, index: &VectorIndex) -> Result<(), IndexError>;

    fn load(&self) -> Result<Option<VectorIndex>, IndexError>;
}
