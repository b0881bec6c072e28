//! Image prompt construction: describe, then scrub disallowed words.
//!
//! Both model calls of the two-step pipeline run on the same backend; if
//! either step fails the whole pipeline moves to the next backend.
use serde::{Deserialize, Serialize};

use super::sections::pick_template;
use super::template::{vars, PromptTemplate, Vars};
use crate::error::AppResult;
use crate::fallback::Outcome;
use crate::llm::{FallbackChain, InvocationRequest};
use crate::parse::parse_string;

pub const CLEAN_TEMPLATE: &str = "Remove all the instances of the following words {disallowed_words} found in {image_description} and replace them with a synonym word that is not in the list. If not any words, simply return the original prompt.";

/// Words image providers tend to over-interpret.
pub const DEFAULT_DISALLOWED_WORDS: &[&str] = &["white", "high-resolution"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagePromptRequest {
    #[serde(default)]
    pub seed: String,
    pub profession: String,
    pub section: String,
}

pub async fn describe_and_clean(
    chain: &FallbackChain,
    describe: &PromptTemplate,
    inputs: &Vars,
    disallowed: &[&str],
) -> AppResult<Outcome<String>> {
    let description_prompt = &describe.format(inputs)?;
    let clean = &PromptTemplate::from_template(CLEAN_TEMPLATE)?;
    let words = &format!("[{}]", disallowed.join(", "));

    chain
        .run(|backend| async move {
            let request = InvocationRequest::from_prompt(description_prompt.as_str());
            let description = parse_string(&backend.complete(&request).await?)?;
            tracing::debug!(backend = backend.name(), %description, "Generated image description");

            let cleaning = clean.format(&vars(&[
                ("disallowed_words", words.as_str()),
                ("image_description", description.as_str()),
            ]))?;
            parse_string(&backend.complete(&InvocationRequest::from_prompt(cleaning)).await?)
        })
        .await
}

/// Build a provider-ready image prompt for a website section.
pub async fn build_image_prompt(chain: &FallbackChain, request: &ImagePromptRequest) -> AppResult<Outcome<String>> {
    let template = PromptTemplate::from_template(pick_template(&request.section))?;
    let inputs = vars(&[
        ("seed_text", request.seed.as_str()),
        ("profession", request.profession.as_str()),
    ]);
    describe_and_clean(chain, &template, &inputs, DEFAULT_DISALLOWED_WORDS).await
}
