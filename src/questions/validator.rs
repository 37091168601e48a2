//! Well-formedness checks for generated questions.

use super::{extract_json_object, AnswerCardinality, AnswerKey, ArchetypeSchema, QuestionPayload};
use crate::error::GenerationFailure;
use std::collections::HashSet;

/// Parse `raw` generator output and check it against `schema`.
///
/// Returns the normalized payload, or [`GenerationFailure::MalformedOutput`]
/// describing the first problem found.
pub fn validate(
    raw: &str,
    schema: &ArchetypeSchema,
) -> std::result::Result<QuestionPayload, GenerationFailure> {
    let malformed = |detail: String| GenerationFailure::MalformedOutput(detail);

    let mut payload: QuestionPayload = serde_json::from_str(extract_json_object(raw))
        .map_err(|e| malformed(format!("response is not valid JSON: {e}")))?;

    if payload.question.trim().is_empty() {
        return Err(malformed("question text is empty".to_string()));
    }

    if payload.options.len() != schema.option_count {
        return Err(malformed(format!(
            "expected {} options for a {} question, got {}",
            schema.option_count,
            schema.archetype,
            payload.options.len()
        )));
    }

    let in_bounds = |index: usize| index < schema.option_count;

    payload.correct_answer = match (schema.cardinality, payload.correct_answer) {
        (AnswerCardinality::Single, AnswerKey::Single(index)) if in_bounds(index) => {
            AnswerKey::Single(index)
        }
        (AnswerCardinality::Single, AnswerKey::Single(index)) => {
            return Err(malformed(format!("correct_answer {index} is out of range")));
        }
        (AnswerCardinality::Single, AnswerKey::Multiple(_)) => {
            return Err(malformed("correct_answer must be a single index".to_string()));
        }
        (AnswerCardinality::Multiple, key) => {
            let indices = match key {
                AnswerKey::Single(index) => vec![index],
                AnswerKey::Multiple(indices) => indices,
            };
            if indices.is_empty() {
                return Err(malformed("correct_answer lists no options".to_string()));
            }
            if let Some(index) = indices.iter().find(|i| !in_bounds(**i)) {
                return Err(malformed(format!("correct_answer {index} is out of range")));
            }
            let unique: HashSet<usize> = indices.iter().copied().collect();
            if unique.len() != indices.len() {
                return Err(malformed("correct_answer repeats an option".to_string()));
            }
            AnswerKey::Multiple(indices)
        }
    };

    Ok(payload)
}
