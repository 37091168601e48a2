//! Prompt templates for Clipquiz.
//!
//! Templates use `{{name}}` placeholders. They can be customized by placing a
//! `questions.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub questions: QuestionPrompts,
}

/// Prompts for question generation, review and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionPrompts {
    pub true_false: String,
    pub multiple_choice: String,
    pub multiple_select: String,
    pub review: String,
    pub classify: String,
}

impl Default for QuestionPrompts {
    fn default() -> Self {
        Self {
            true_false: r#"Generate a true/false question in JSON format based on the transcript: {{transcript}}
{{additional_suggestions}}
warning: Only return the json format and nothing more
Format:
{
    "question": "<question_text>",
    "options": ["True", "False"],
    "correct_answer": <index_of_correct_option>
}"#
            .to_string(),

            multiple_choice: r#"Generate a multiple-choice question in JSON format based on the transcript: {{transcript}}
{{additional_suggestions}}
warning: Only return the json format and nothing more
Format:
{
    "question": "<question_text>",
    "options": ["<option1>", "<option2>", "<option3>", "<option4>"],
    "correct_answer": <index_of_correct_option>
}"#
            .to_string(),

            multiple_select: r#"Generate a multiple-select question in JSON format based on the transcript: {{transcript}}
{{additional_suggestions}}
warning: Only return the json format and nothing more
Format:
{
    "question": "<question_text>",
    "options": ["<option1>", "<option2>", "<option3>", "<option4>"],
    "correct_answer": [<index_of_correct_option1>, <index_of_correct_option2>]
}"#
            .to_string(),

            review: r#"Review the question against the transcript:
Transcript: {{transcript}}
Question: {{question}}
Check:
1. Does the question accurately reflect the transcript content?
2. Is the correct answer consistent with the transcript?
3. Are the options appropriate and relevant?
4. Correct_answer is the index starting from 0
Warning: Only return the json format and nothing more
Return JSON format:
{
    "is_valid": <true/false>,
    "feedback": "<detailed feedback if not valid, empty string if valid>"
}"#
            .to_string(),

            classify: r#"Determine the type of question (true/false, multiple-choice, multiple-select) that best fits the transcript: {{transcript}}
Examples:
- "The sky is blue" -> true/false
- "What color is the sky?" -> multiple-choice
- "Which colors appear in the sky?" -> multiple-select
Warning: only these 3 types should be the answer: true/false, multiple-choice, multiple-select
Format:
{
    "question_type": "<type_of_question>"
}"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load the default prompts, overridden by `questions.toml` in `custom_dir` if present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let questions_path = custom_path.join("questions.toml");
            if questions_path.exists() {
                let content = std::fs::read_to_string(&questions_path)?;
                prompts.questions = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single left-to-right pass, so placeholders that
    /// appear inside a substituted value are left as written. Unknown
    /// placeholders are kept verbatim.
    pub fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];

            let known = after
                .find("}}")
                .and_then(|close| vars.get(&after[..close]).map(|value| (close, value)));
            match known {
                Some((close, value)) => {
                    result.push_str(value);
                    rest = &after[close + 2..];
                }
                None => {
                    result.push_str("{{");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.questions.multiple_choice.contains("{{transcript}}"));
        assert!(prompts.questions.review.contains("{{question}}"));
        assert!(prompts.questions.classify.contains("question_type"));
    }

    #[test]
    fn test_render_template() {
        let template = "Transcript: {{transcript}}\n{{additional_suggestions}}";
        let vars = HashMap::from([
            ("transcript", "graphs have edges"),
            ("additional_suggestions", ""),
        ]);

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Transcript: graphs have edges\n");
    }

    #[test]
    fn test_render_leaves_literal_braces() {
        let vars = HashMap::from([("transcript", "x")]);
        let result = Prompts::render("{\n \"q\": 1 }", &vars);
        assert_eq!(result, "{\n \"q\": 1 }");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_values() {
        let prompts = Prompts::default();
        let vars = HashMap::from([
            ("transcript", "say {{question}} now"),
            ("question", "{\"question\": \"Q?\"}"),
        ]);

        let first = Prompts::render(&prompts.questions.review, &vars);
        assert!(first.contains("Transcript: say {{question}} now"));
        assert!(first.contains("Question: {\"question\": \"Q?\"}"));

        for _ in 0..50 {
            assert_eq!(Prompts::render(&prompts.questions.review, &vars), first);
        }
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let vars = HashMap::from([("transcript", "x")]);
        assert_eq!(
            Prompts::render("{{other}} {{ {{transcript}}", &vars),
            "{{other}} {{ x"
        );
    }

    #[test]
    fn test_load_custom_questions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("questions.toml"),
            "multiple_choice = \"Ask about {{transcript}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.questions.multiple_choice, "Ask about {{transcript}}");
        // Unspecified templates keep their defaults
        assert!(prompts.questions.review.contains("is_valid"));
    }
}
