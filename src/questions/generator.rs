//! Draft question generation.

use super::{ArchetypeSchema, QuestionArchetype};
use crate::completion::CompletionService;
use crate::config::{Prompts, QuestionPrompts, SamplingSettings};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Produces raw question drafts from window text.
pub struct Generator {
    completion: Arc<dyn CompletionService>,
    prompts: QuestionPrompts,
    sampling: SamplingSettings,
}

impl Generator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        prompts: QuestionPrompts,
        sampling: SamplingSettings,
    ) -> Self {
        Self {
            completion,
            prompts,
            sampling,
        }
    }

    fn template(&self, archetype: QuestionArchetype) -> &str {
        match archetype {
            QuestionArchetype::TrueFalse => &self.prompts.true_false,
            QuestionArchetype::MultipleChoice => &self.prompts.multiple_choice,
            QuestionArchetype::MultipleSelect => &self.prompts.multiple_select,
        }
    }

    /// Ask for one draft question. `feedback` is woven into the prompt as
    /// additional suggestions; pass an empty string on the first attempt.
    ///
    /// Exactly one completion call is made.
    #[instrument(skip(self, text, feedback), fields(archetype = %schema.archetype))]
    pub async fn generate(
        &self,
        text: &str,
        schema: &ArchetypeSchema,
        feedback: &str,
    ) -> Result<String> {
        let vars = HashMap::from([
            ("transcript", text),
            ("additional_suggestions", feedback),
        ]);
        let prompt = Prompts::render(self.template(schema.archetype), &vars);

        self.completion.complete(&prompt, self.sampling).await
    }
}
