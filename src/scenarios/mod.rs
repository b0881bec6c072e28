//! Demo scenarios exposed by the HTTP API and the CLI.
//!
//! Each scenario builds its prompt, runs it through the model fallback chain
//! (or the image fallback) and reports which provider answered.
pub mod fixtures;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::fallback::{Outcome, OutcomeMeta};
use crate::image::{ImageFallback, ImagineOptions};
use crate::llm::{FallbackChain, InvocationRequest, TextStream};
use crate::memory::ConversationMemory;
use crate::parse::{parse_string, JsonStreamParser};
use crate::prompt::documents::stuff_documents;
use crate::prompt::image_prompt::{build_image_prompt, describe_and_clean, ImagePromptRequest};
use crate::prompt::{vars, ChatPromptTemplate, Document, PipelinePrompt, PromptTemplate};
use fixtures::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    Chains,
    Docs,
    Stream,
    Batches,
    Json,
    Events,
    Memory,
    Composed,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Chains => "chains",
            Scenario::Docs => "docs",
            Scenario::Stream => "stream",
            Scenario::Batches => "batches",
            Scenario::Json => "json",
            Scenario::Events => "events",
            Scenario::Memory => "memory",
            Scenario::Composed => "composed",
        }
    }
}

/// Scenario output plus the fallback metadata of the call that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    #[serde(flatten)]
    pub meta: Option<OutcomeMeta>,
    pub output: Value,
}

impl ScenarioReport {
    fn from_outcome<T: Serialize>(scenario: &'static str, outcome: Outcome<T>) -> AppResult<Self> {
        let meta = outcome.meta();
        let output = serde_json::to_value(&outcome.value)
            .map_err(|e| AppError::OutputParse(format!("cannot serialize {} output: {}", scenario, e)))?;
        Ok(ScenarioReport {
            scenario,
            meta: Some(meta),
            output,
        })
    }
}

/// Single prompt through the chain.
pub async fn ask(chain: &FallbackChain, prompt: &str) -> AppResult<ScenarioReport> {
    if prompt.trim().is_empty() {
        return Err(AppError::PromptConstruction("prompt must not be blank".into()));
    }
    let outcome = chain.invoke_prompt(prompt).await?;
    ScenarioReport::from_outcome("ask", outcome)
}

/// Stock image description, then scrubbed of words that give the trade away.
pub async fn chains(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let describe = PromptTemplate::from_template(STOCK_DESCRIPTION)?;
    let inputs = vars(&[("seed_text", CHAINS_SEED), ("profession", CHAINS_PROFESSION)]);
    let outcome = describe_and_clean(chain, &describe, &inputs, CHAINS_DISALLOWED).await?;
    tracing::info!("- {}: {}", outcome.provider, outcome.value);
    ScenarioReport::from_outcome("chains", outcome)
}

/// Answer both questions about the sales call transcript on one backend.
pub async fn docs(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let prompt = PromptTemplate::from_template(DOCS_PROMPT)?;
    let context = stuff_documents(&[Document::new(CALL_SCRIPT)]);
    let requests = DOCS_QUESTIONS
        .iter()
        .map(|question| {
            prompt
                .format(&vars(&[("context", context.as_str()), ("input", *question)]))
                .map(InvocationRequest::from_prompt)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let outcome = chain.batch(&requests).await?.map(|answers| {
        DOCS_QUESTIONS
            .iter()
            .zip(answers)
            .map(|(question, answer)| json!({"question": question, "answer": answer}))
            .collect::<Vec<_>>()
    });
    ScenarioReport::from_outcome("docs", outcome)
}

fn section_request(section: &str, profession: &str) -> AppResult<InvocationRequest> {
    let prompt = PromptTemplate::from_template(SECTION_CONTENT)?
        .format(&vars(&[("section", section), ("profession", profession)]))?;
    Ok(InvocationRequest::from_prompt(prompt))
}

/// Open the section-content stream on the first backend that starts talking.
pub async fn stream(chain: &FallbackChain) -> AppResult<Outcome<TextStream>> {
    let (section, profession) = STREAM_INPUT;
    chain.stream(&section_request(section, profession)?).await
}

/// Drain [`stream`] into its chunks and their concatenation.
pub async fn stream_collected(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let outcome = stream(chain).await?;
    let meta = outcome.meta();
    let mut chunks = Vec::new();
    let mut chunk_stream = outcome.value;
    while let Some(chunk) = chunk_stream.next().await {
        chunks.push(chunk?);
    }
    Ok(ScenarioReport {
        scenario: "stream",
        meta: Some(meta),
        output: json!({"text": chunks.concat(), "chunks": chunks}),
    })
}

pub async fn batches(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let requests = BATCH_INPUTS
        .iter()
        .map(|(section, profession)| section_request(section, profession))
        .collect::<AppResult<Vec<_>>>()?;
    let outcome = chain.batch(&requests).await?;
    ScenarioReport::from_outcome("batches", outcome)
}

/// Stream a JSON answer and record every distinct partial value on the way.
pub async fn json(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let request = &InvocationRequest::from_prompt(JSON_PROMPT);
    let outcome = chain
        .run(|backend| async move {
            let mut chunks = backend.stream(request).await?;
            let mut parser = JsonStreamParser::new();
            let mut partials = Vec::new();
            while let Some(chunk) = chunks.next().await {
                if let Some(value) = parser.push(&chunk?) {
                    partials.push(value);
                }
            }
            let result = parser.finish()?;
            Ok(json!({"partials": partials, "result": result}))
        })
        .await?;
    ScenarioReport::from_outcome("json", outcome)
}

/// Lifecycle event of a single model run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunEvent {
    pub event: String,
    pub run_id: Uuid,
    pub name: String,
    pub data: Value,
}

impl RunEvent {
    fn new(event: &str, run_id: Uuid, name: &str, data: Value) -> Self {
        RunEvent {
            event: event.to_string(),
            run_id,
            name: name.to_string(),
            data,
        }
    }
}

/// Stream a reply to "hello" and report start, chunk and end events.
pub async fn events(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let request = &InvocationRequest::from_prompt(EVENTS_INPUT);
    let outcome = chain
        .run(|backend| async move {
            let run_id = Uuid::new_v4();
            let name = backend.name().to_string();
            let mut events = vec![RunEvent::new("on_llm_start", run_id, &name, json!({"input": EVENTS_INPUT}))];

            let mut chunks = backend.stream(request).await?;
            let mut output = String::new();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                output.push_str(&chunk);
                events.push(RunEvent::new("on_llm_stream", run_id, &name, json!({"chunk": chunk})));
            }
            let output = parse_string(&output)?;
            events.push(RunEvent::new("on_llm_end", run_id, &name, json!({"output": output})));
            Ok(events)
        })
        .await?;
    tracing::info!(events = outcome.value.len(), "Collected run events");
    ScenarioReport::from_outcome("events", outcome)
}

/// Two-turn color conversation; the second turn sees the first in its history.
///
/// Memory starts empty on every backend attempt so a fallback backend never
/// sees turns produced by another model.
pub async fn memory(chain: &FallbackChain) -> AppResult<ScenarioReport> {
    let prompt = &ChatPromptTemplate::new()
        .system(MEMORY_SYSTEM)?
        .history()
        .human("{input}")?;
    let outcome = chain
        .run(|backend| async move {
            let mut memory = ConversationMemory::new();
            for input in MEMORY_INPUTS {
                let messages = prompt.format(&vars(&[("input", *input)]), &memory.load())?;
                let request = InvocationRequest::from_messages(messages);
                let answer = parse_string(&backend.complete(&request).await?)?;
                tracing::debug!(backend = backend.name(), input = *input, %answer, "Memory turn");
                memory.save_context(*input, answer);
            }
            Ok(json!({"turns": memory.turns(), "history": memory.load()}))
        })
        .await?;
    ScenarioReport::from_outcome("memory", outcome)
}

/// Format the composed stock-description prompt. No model is called.
pub fn composed() -> AppResult<ScenarioReport> {
    let pipeline = PipelinePrompt::new(PromptTemplate::from_template(COMPOSED_FINAL)?)
        .stage("introduction", PromptTemplate::from_template(COMPOSED_INTRODUCTION)?)
        .stage("example", PromptTemplate::from_template(COMPOSED_EXAMPLE)?)
        .stage("start", PromptTemplate::from_template(COMPOSED_START)?);
    let prompt = pipeline.format(&vars(COMPOSED_INPUTS))?;
    Ok(ScenarioReport {
        scenario: "composed",
        meta: None,
        output: json!({"prompt": prompt}),
    })
}

/// Query parameters of `/generateImage`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateImageParams {
    /// Use this prompt as-is instead of building one.
    pub prompt: Option<String>,
    pub seed: Option<String>,
    pub profession: Option<String>,
    pub section: Option<String>,
    pub aspect_ratio: Option<String>,
    pub size: Option<String>,
}

impl GenerateImageParams {
    fn prompt_request(&self) -> ImagePromptRequest {
        ImagePromptRequest {
            seed: self.seed.clone().unwrap_or_default(),
            profession: self
                .profession
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_PROFESSION.to_string()),
            section: self.section.clone().unwrap_or_else(|| DEFAULT_IMAGE_SECTION.to_string()),
        }
    }

    fn options(&self) -> ImagineOptions {
        ImagineOptions {
            aspect_ratio: self.aspect_ratio.clone(),
            size: self.size.clone(),
        }
    }
}

/// Build a section image prompt (unless one is given) and hand it to the
/// image providers, primary first.
pub async fn generate_image(
    chain: &FallbackChain,
    images: &ImageFallback,
    params: &GenerateImageParams,
) -> AppResult<ScenarioReport> {
    let (prompt, prompt_meta) = match params.prompt.as_deref().map(str::trim) {
        Some(prompt) if !prompt.is_empty() => (prompt.to_string(), None),
        Some(_) => return Err(AppError::PromptConstruction("prompt must not be blank".into())),
        None => {
            let outcome = build_image_prompt(chain, &params.prompt_request()).await?;
            let meta = outcome.meta();
            (outcome.value, Some(meta))
        }
    };
    tracing::info!(%prompt, "Generated image prompt");

    let outcome = images.imagine(&prompt, &params.options()).await?;
    let meta = outcome.meta();
    Ok(ScenarioReport {
        scenario: "generateImage",
        meta: Some(meta),
        output: json!({
            "prompt": prompt,
            "prompt_meta": prompt_meta,
            "result": outcome.value,
        }),
    })
}

pub async fn upscale(images: &ImageFallback, task_id: &str, index: u8) -> AppResult<ScenarioReport> {
    let result = images.upscale(task_id, index).await?;
    Ok(ScenarioReport {
        scenario: "upscale",
        meta: None,
        output: json!({"provider": images.primary().name(), "result": result}),
    })
}

/// Run a text scenario to completion.
pub async fn run_scenario(chain: &FallbackChain, scenario: Scenario) -> AppResult<ScenarioReport> {
    tracing::info!(scenario = scenario.name(), "Running scenario");
    match scenario {
        Scenario::Chains => chains(chain).await,
        Scenario::Docs => docs(chain).await,
        Scenario::Stream => stream_collected(chain).await,
        Scenario::Batches => batches(chain).await,
        Scenario::Json => json(chain).await,
        Scenario::Events => events(chain).await,
        Scenario::Memory => memory(chain).await,
        Scenario::Composed => composed(),
    }
}
