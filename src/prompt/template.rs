//! String templates with `{name}` placeholders.
//!
//! `{{` and `}}` produce literal braces. Templates are parsed once at
//! construction; formatting substitutes every placeholder from `inputs` and
//! fails if any is missing.
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

pub type Vars = HashMap<String, String>;

/// Build a [`Vars`] map from literal pairs.
pub fn vars<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Vars {
    pairs
        .iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn from_template(template: &str) -> AppResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => {
                                return Err(AppError::PromptConstruction(format!(
                                    "Unclosed placeholder in template: {}",
                                    template
                                )))
                            }
                            Some(ch) => name.push(ch),
                        }
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(AppError::PromptConstruction("Empty placeholder in template".into()));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
                '}' => {
                    return Err(AppError::PromptConstruction(format!(
                        "Unmatched '}}' in template: {}",
                        template
                    )))
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(PromptTemplate { segments })
    }

    /// Placeholder names in first-appearance order, without duplicates.
    pub fn input_variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn format(&self, inputs: &Vars) -> AppResult<String> {
        self.validate_inputs(inputs)?;
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(&inputs[name]),
            }
        }
        Ok(out)
    }

    fn validate_inputs(&self, inputs: &Vars) -> AppResult<()> {
        match self.input_variables().into_iter().find(|name| !inputs.contains_key(*name)) {
            Some(missing) => Err(AppError::PromptConstruction(format!(
                "Missing input for placeholder: {}",
                missing
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_placeholders() {
        let t = PromptTemplate::from_template("Generate text for '{section}' on a {profession}'s site").unwrap();
        assert_eq!(t.input_variables(), vec!["section", "profession"]);
        let out = t.format(&vars(&[("section", "About"), ("profession", "plumber")])).unwrap();
        assert_eq!(out, "Generate text for 'About' on a plumber's site");
    }

    #[test]
    fn double_braces_are_literal() {
        let t = PromptTemplate::from_template("{{\"key\": \"{value}\"}}").unwrap();
        assert_eq!(t.format(&vars(&[("value", "x")])).unwrap(), "{\"key\": \"x\"}");
    }

    #[test]
    fn missing_input_is_an_error() {
        let t = PromptTemplate::from_template("{a} and {b}").unwrap();
        let err = t.format(&vars(&[("a", "1")])).unwrap_err();
        assert!(err.to_string().contains("Missing input for placeholder: b"));
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(PromptTemplate::from_template("{open").is_err());
        assert!(PromptTemplate::from_template("close}").is_err());
        assert!(PromptTemplate::from_template("{ }").is_err());
    }

    #[test]
    fn repeated_placeholder_listed_once() {
        let t = PromptTemplate::from_template("{x}{x}").unwrap();
        assert_eq!(t.input_variables(), vec!["x"]);
        assert_eq!(t.format(&vars(&[("x", "ab")])).unwrap(), "abab");
    }
}
