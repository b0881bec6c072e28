//! Composed prompts: named sub-templates feeding a final template.
use super::template::{PromptTemplate, Vars};
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct PipelinePrompt {
    stages: Vec<(String, PromptTemplate)>,
    final_prompt: PromptTemplate,
}

impl PipelinePrompt {
    pub fn new(final_prompt: PromptTemplate) -> Self {
        PipelinePrompt {
            stages: Vec::new(),
            final_prompt,
        }
    }

    /// Add a stage; its formatted text becomes the input `name` for later
    /// stages and for the final template.
    pub fn stage(mut self, name: impl Into<String>, prompt: PromptTemplate) -> Self {
        self.stages.push((name.into(), prompt));
        self
    }

    pub fn format(&self, inputs: &Vars) -> AppResult<String> {
        let mut vars = inputs.clone();
        for (name, prompt) in &self.stages {
            let text = prompt.format(&vars)?;
            vars.insert(name.clone(), text);
        }
        self.final_prompt.format(&vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::template::vars;

    #[test]
    fn stages_feed_the_final_prompt_in_order() {
        let pipeline = PipelinePrompt::new(PromptTemplate::from_template("{intro}|{start}").unwrap())
            .stage("intro", PromptTemplate::from_template("for {profession}").unwrap())
            .stage("start", PromptTemplate::from_template("after {intro}: {input}").unwrap());
        let out = pipeline
            .format(&vars(&[("profession", "Carpenter"), ("input", "cabinets")]))
            .unwrap();
        assert_eq!(out, "for Carpenter|after for Carpenter: cabinets");
    }

    #[test]
    fn missing_stage_input_fails() {
        let pipeline = PipelinePrompt::new(PromptTemplate::from_template("{intro}").unwrap())
            .stage("intro", PromptTemplate::from_template("{profession}").unwrap());
        assert!(pipeline.format(&Vars::new()).is_err());
    }
}
