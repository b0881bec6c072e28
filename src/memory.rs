//! Linear conversation buffer injected into chat prompts as history.
use serde::Serialize;

use crate::llm::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Default, Clone)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History as alternating user/assistant messages, oldest first.
    pub fn load(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .flat_map(|t| [ChatMessage::user(&t.input), ChatMessage::assistant(&t.output)])
            .collect()
    }

    pub fn save_context(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.turns.push(Turn {
            input: input.into(),
            output: output.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn load_returns_turns_in_order_as_messages() {
        let mut memory = ConversationMemory::new();
        assert!(memory.load().is_empty());
        memory.save_context("Do color blue", "Navy, teal");
        memory.save_context("What is the main color?", "Blue");

        let history = memory.load();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "Do color blue");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[3].content, "Blue");

        memory.clear();
        assert!(memory.is_empty());
    }
}
