use crate::models::{ConversationTurn, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, message: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role,
            message: message.into(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The most recent `max_turns` turns, or all of them.
    pub fn window(&self, max_turns: Option<usize>) -> &[ConversationTurn] {
        match max_turns {
            Some(max) if max < self.turns.len() => &self.turns[self.turns.len() - max..],
            _ => &self.turns,
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
