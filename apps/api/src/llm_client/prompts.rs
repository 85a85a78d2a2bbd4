//! Prompt templates for the skill-extraction LLM call.
//!
//! Scope is deliberately narrow: Cloud, Data and AI technologies only.
//! The model must answer with a bare comma-separated list so the output
//! can be parsed without structure.

pub const SKILL_EXTRACTION_SYSTEM: &str = "You extract skills from text. Respond ONLY with a \
comma-separated list of skills. No explanations, no sentences, just skills separated by commas.";

pub const SKILL_EXTRACTION_TEMPLATE: &str = r#"Extract ONLY the specific technical skills/technologies mentioned in this text.
Do NOT add generic terms like "Cloud", "Data", or "AI" unless they are part of a specific technology name.

TEXT: {text}

RULES:
- Extract specific technologies: AWS, Azure, Python, SQL, Spark, etc.
- Do NOT extract generic words like "cloud", "data", "ai" alone
- If no specific skills found, respond with: NONE

RESPOND WITH ONLY A COMMA-SEPARATED LIST. NO EXPLANATIONS.
Example: AWS, Python, SQL, Spark

SKILLS:"#;

/// Only the first 3000 characters of the input are sent to the model.
pub const SKILL_EXTRACTION_INPUT_LIMIT: usize = 3000;
