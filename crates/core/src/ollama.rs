use crate::config::ModelConfig;
use crate::models::ConversationTurn;
use crate::traits::{EmbeddingProvider, LanguageModel};
use crate::ModelError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const BACKEND: &str = "ollama";

pub struct OllamaClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    pub fn new(endpoint: &str, request_timeout: Option<Duration>) -> Result<Self, ModelError> {
        let base_url = Url::parse(endpoint)?;
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        Self::new(
            &config.endpoint,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ModelError> {
        Ok(self.base_url.join(path)?)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, ModelError> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "ollama request");

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("{status} {body}"),
            });
        }

        Ok(response)
    }

    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>, ModelError> {
        let body = json!({ "model": model, "prompt": text });

        let parsed: EmbedResponse = self.post("api/embeddings", &body).await?.json().await?;
        Ok(parsed.embedding)
    }

    pub async fn chat(
        &self,
        model: &str,
        prompt: &str,
        history: &[ConversationTurn],
        temperature: Option<f32>,
    ) -> Result<String, ModelError> {
        let body = chat_request(model, prompt, history, temperature);
        let parsed: Value = self.post("api/chat", &body).await?.json().await?;
        parse_chat_response(&parsed)
    }
}

fn chat_request(
    model: &str,
    prompt: &str,
    history: &[ConversationTurn],
    temperature: Option<f32>,
) -> Value {
    let mut messages = history
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role.as_str(),
                "content": turn.message,
            })
        })
        .collect::<Vec<_>>();
    messages.push(json!({ "role": "user", "content": prompt }));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });
    if let Some(temperature) = temperature {
        body["options"] = json!({ "temperature": temperature });
    }
    body
}

fn parse_chat_response(parsed: &Value) -> Result<String, ModelError> {
    parsed
        .pointer("/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ModelError::BackendResponse {
            backend: BACKEND.to_string(),
            details: "missing message.content".to_string(),
        })
}

pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let embedding = self.client.embed(&self.model, text).await?;
        if embedding.len() != self.dimensions {
            return Err(ModelError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!(
                    "embedding dimension {} != configured {}",
                    embedding.len(),
                    self.dimensions
                ),
            });
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

pub struct OllamaChatModel {
    client: Arc<OllamaClient>,
    model: String,
    temperature: Option<f32>,
}

impl OllamaChatModel {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>, temperature: Option<f32>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaChatModel {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ModelError> {
        self.client
            .chat(&self.model, prompt, history, self.temperature)
            .await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = OllamaClient::new("not a url", None);
        assert!(matches!(result, Err(ModelError::Url(_))));
    }

    #[test]
    fn endpoint_paths_join_base_url() -> Result<(), ModelError> {
        let client = OllamaClient::new("http://localhost:11434", None)?;
        assert_eq!(
            client.endpoint("api/chat")?.as_str(),
            "http://localhost:11434/api/chat"
        );
        Ok(())
    }

    #[test]
    fn chat_request_puts_history_before_prompt() {
        let history = vec![
            ConversationTurn::user("Who wrote it?"),
            ConversationTurn::assistant("The maintenance team."),
        ];

        let body = chat_request("llama3.2", "Question: when?", &history, Some(0.1));

        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], false);
        let messages = body["messages"].as_array().expect("messages array");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[2]["content"], "Question: when?");
        assert!(body.get("options").is_some());
        assert!(chat_request("m", "p", &[], None).get("options").is_none());
    }

    #[test]
    fn chat_response_content_is_extracted() {
        let parsed = json!({ "message": { "role": "assistant", "content": "250 bar" } });
        assert_eq!(parse_chat_response(&parsed).expect("content"), "250 bar");

        let missing = json!({ "done": true });
        assert!(matches!(
            parse_chat_response(&missing),
            Err(ModelError::BackendResponse { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_model_error() -> Result<(), ModelError> {
        let client = Arc::new(OllamaClient::new(
            "http://127.0.0.1:9",
            Some(Duration::from_secs(5)),
        )?);
        let model = OllamaChatModel::new(client, "llama3.2", None);

        let result = model.generate("hello", &[]).await;
        assert!(matches!(result, Err(ModelError::Http(_))));
        Ok(())
    }
}
