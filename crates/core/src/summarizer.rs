use crate::index::VectorIndex;
use crate::models::{display_name, SourceChunk};
use crate::prompt::summary_prompt;
use crate::traits::LanguageModel;
use crate::ModelError;
use std::fmt;
use tracing::info;

pub const NOTHING_TO_SUMMARIZE: &str = "There are no documents to summarize.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    pub source_id: String,
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub source_id: String,
    pub label: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryReport {
    NothingToSummarize,
    Documents(Vec<DocumentSummary>),
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryReport::NothingToSummarize => f.write_str(NOTHING_TO_SUMMARIZE),
            SummaryReport::Documents(summaries) => {
                for (position, summary) in summaries.iter().enumerate() {
                    if position > 0 {
                        f.write_str("\n\n")?;
                    }
                    write!(f, "**Summary of: {}**\n{}", summary.label, summary.summary)?;
                }
                Ok(())
            }
        }
    }
}

pub fn group_by_source(chunks: Vec<SourceChunk>) -> Vec<SourceGroup> {
    let mut groups: Vec<SourceGroup> = Vec::new();

    for chunk in chunks {
        match groups
            .iter_mut()
            .find(|group| group.source_id == chunk.source_id)
        {
            Some(group) => group.texts.push(chunk.text),
            None => groups.push(SourceGroup {
                source_id: chunk.source_id,
                texts: vec![chunk.text],
            }),
        }
    }

    groups
}

pub struct Summarizer<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> Summarizer<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    pub async fn summarize(&self, index: &VectorIndex) -> Result<SummaryReport, ModelError> {
        let groups = group_by_source(index.list_all());
        if groups.is_empty() {
            return Ok(SummaryReport::NothingToSummarize);
        }

        let mut summaries = Vec::with_capacity(groups.len());
        for group in groups {
            let text = group.texts.join(" ");
            let summary = self.model.generate(&summary_prompt(&text), &[]).await?;
            info!(source = %group.source_id, "summarized document");

            summaries.push(DocumentSummary {
                label: display_name(&group.source_id),
                source_id: group.source_id,
                summary: summary.trim().to_string(),
            });
        }

        Ok(SummaryReport::Documents(summaries))
    }
}
