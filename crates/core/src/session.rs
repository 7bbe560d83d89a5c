use crate::conversation::Conversation;
use crate::index::VectorIndex;
use crate::summarizer::SummaryReport;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    index: Option<VectorIndex>,
    conversation: Conversation,
    summary: Option<SummaryReport>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            index: None,
            conversation: Conversation::new(),
            summary: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Installs a freshly built index; the cached summary belonged to the old one.
    pub fn replace_index(&mut self, index: VectorIndex) {
        self.index = Some(index);
        self.summary = None;
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn summary(&self) -> Option<&SummaryReport> {
        self.summary.as_ref()
    }

    pub fn cache_summary(&mut self, report: SummaryReport) {
        self.summary = Some(report);
    }

    pub fn end(&mut self) {
        self.index = None;
        self.conversation.clear();
        self.summary = None;
    }
}
