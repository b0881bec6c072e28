//! Prompt construction helpers.
//!
//! - `template`: `{placeholder}` string templates.
//! - `chat`: chat message templates with a history slot.
//! - `pipeline`: composed templates built from named stages.
//! - `documents`: context stuffing for document-grounded answers.
//! - `sections`: website section catalog.
//! - `image_prompt`: section-aware image prompt builder.
pub mod chat;
pub mod documents;
pub mod image_prompt;
pub mod pipeline;
pub mod sections;
pub mod template;

pub use chat::ChatPromptTemplate;
pub use documents::Document;
pub use pipeline::PipelinePrompt;
pub use template::{vars, PromptTemplate, Vars};
