use crate::conversation::Conversation;
use crate::index::VectorIndex;
use crate::models::RetrievedChunk;
use crate::prompt::grounded_answer_prompt;
use crate::traits::{EmbeddingProvider, LanguageModel};
use crate::CopilotError;
use tracing::debug;

pub struct AnsweringPipeline<'a> {
    embedder: &'a dyn EmbeddingProvider,
    model: &'a dyn LanguageModel,
    retrieval_k: usize,
    history_max_turns: Option<usize>,
}

impl<'a> AnsweringPipeline<'a> {
    pub fn new(
        embedder: &'a dyn EmbeddingProvider,
        model: &'a dyn LanguageModel,
        retrieval_k: usize,
        history_max_turns: Option<usize>,
    ) -> Self {
        Self {
            embedder,
            model,
            retrieval_k,
            history_max_turns,
        }
    }

    pub async fn retrieve(
        &self,
        question: &str,
        index: &VectorIndex,
    ) -> Result<Vec<RetrievedChunk>, CopilotError> {
        let query_vector = self.embedder.embed(question).await?;
        Ok(index.query(&query_vector, self.retrieval_k)?)
    }

    pub async fn answer(
        &self,
        question: &str,
        conversation: &Conversation,
        index: &VectorIndex,
    ) -> Result<String, CopilotError> {
        let retrieved = self.retrieve(question, index).await?;
        let prompt = grounded_answer_prompt(question, &retrieved);
        let history = conversation.window(self.history_max_turns);

        debug!(
            retrieved = retrieved.len(),
            history_turns = history.len(),
            model = self.model.model_id(),
            "generating grounded answer"
        );

        Ok(self.model.generate(&prompt, history).await?)
    }
}
