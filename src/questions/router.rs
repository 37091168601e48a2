//! Choosing a question archetype for a window.

use super::{extract_json_object, ArchetypeSchema, QuestionArchetype};
use crate::completion::CompletionService;
use crate::config::{Prompts, SamplingSettings};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Picks the archetype (and thereby the schema) used for a window.
#[async_trait]
pub trait ArchetypeRouter: Send + Sync {
    async fn route(&self, text: &str) -> ArchetypeSchema;
}

/// Always routes to the same archetype.
#[derive(Debug, Clone, Copy)]
pub struct FixedRouter {
    archetype: QuestionArchetype,
}

impl FixedRouter {
    pub fn new(archetype: QuestionArchetype) -> Self {
        Self { archetype }
    }
}

impl Default for FixedRouter {
    fn default() -> Self {
        Self::new(QuestionArchetype::MultipleChoice)
    }
}

#[async_trait]
impl ArchetypeRouter for FixedRouter {
    async fn route(&self, _text: &str) -> ArchetypeSchema {
        self.archetype.schema()
    }
}

#[derive(Debug, Deserialize)]
struct Classification {
    question_type: String,
}

/// Asks the completion service which archetype fits the window best.
/// Falls back to multiple-choice when the answer cannot be used.
pub struct ClassifierRouter {
    completion: Arc<dyn CompletionService>,
    template: String,
    sampling: SamplingSettings,
}

impl ClassifierRouter {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        template: &str,
        sampling: SamplingSettings,
    ) -> Self {
        Self {
            completion,
            template: template.to_string(),
            sampling,
        }
    }

    fn parse(response: &str) -> Option<QuestionArchetype> {
        let classification: Classification =
            serde_json::from_str(extract_json_object(response)).ok()?;
        QuestionArchetype::from_label(&classification.question_type)
    }
}

#[async_trait]
impl ArchetypeRouter for ClassifierRouter {
    async fn route(&self, text: &str) -> ArchetypeSchema {
        let vars = HashMap::from([("transcript", text)]);
        let prompt = Prompts::render(&self.template, &vars);

        let archetype = match self.completion.complete(&prompt, self.sampling).await {
            Ok(response) => Self::parse(&response).unwrap_or_else(|| {
                warn!("Unrecognized question type, using multiple-choice");
                QuestionArchetype::MultipleChoice
            }),
            Err(e) => {
                warn!("Question type classification failed: {}", e);
                QuestionArchetype::MultipleChoice
            }
        };

        debug!("Routed window to {}", archetype);
        archetype.schema()
    }
}
