//! Documents "stuffed" into a prompt's context slot.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Document {
            page_content: page_content.into(),
        }
    }
}

/// Join document contents with blank lines.
pub fn stuff_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.page_content.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}
