//! Chat-style templates: a system message, an optional conversation history
//! slot and templated human messages.
use super::template::{PromptTemplate, Vars};
use crate::error::AppResult;
use crate::llm::ChatMessage;

#[derive(Debug, Clone)]
pub enum ChatPart {
    System(PromptTemplate),
    /// Replaced by the conversation history passed to `format`.
    History,
    Human(PromptTemplate),
}

#[derive(Debug, Clone, Default)]
pub struct ChatPromptTemplate {
    parts: Vec<ChatPart>,
}

impl ChatPromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, template: &str) -> AppResult<Self> {
        self.parts.push(ChatPart::System(PromptTemplate::from_template(template)?));
        Ok(self)
    }

    pub fn history(mut self) -> Self {
        self.parts.push(ChatPart::History);
        self
    }

    pub fn human(mut self, template: &str) -> AppResult<Self> {
        self.parts.push(ChatPart::Human(PromptTemplate::from_template(template)?));
        Ok(self)
    }

    pub fn format(&self, inputs: &Vars, history: &[ChatMessage]) -> AppResult<Vec<ChatMessage>> {
        let mut messages = Vec::new();
        for part in &self.parts {
            match part {
                ChatPart::System(t) => messages.push(ChatMessage::system(t.format(inputs)?)),
                ChatPart::History => messages.extend_from_slice(history),
                ChatPart::Human(t) => messages.push(ChatMessage::user(t.format(inputs)?)),
            }
        }
        Ok(messages)
    }
}
