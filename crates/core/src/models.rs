use crate::extractor::PageText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque id of the document; the staged file path.
    pub source_id: String,
    pub title: String,
    pub checksum: String,
    pub ingested_at: DateTime<Utc>,
    pub pages: Vec<PageText>,
}

impl Document {
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub chunk_id: String,
    pub source_id: String,
    pub chunk_index: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChunk {
    pub source_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub message: String,
}

impl ConversationTurn {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            message: message.into(),
        }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            message: message.into(),
        }
    }
}

pub fn display_name(source_id: &str) -> String {
    Path::new(source_id)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| source_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_text_joins_pages_with_newline() {
        let document = Document {
            source_id: "data/uploaded_pdfs/a.pdf".to_string(),
            title: "a.pdf".to_string(),
            checksum: "checksum".to_string(),
            ingested_at: Utc::now(),
            pages: vec![
                PageText {
                    number: 1,
                    text: "first".to_string(),
                },
                PageText {
                    number: 2,
                    text: "second".to_string(),
                },
            ],
        };

        assert_eq!(document.text(), "first\nsecond");
    }

    #[test]
    fn display_name_strips_directories() {
        assert_eq!(display_name("data/uploaded_pdfs/report.pdf"), "report.pdf");
        assert_eq!(display_name("report.pdf"), "report.pdf");
    }
}
