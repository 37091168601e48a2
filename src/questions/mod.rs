//! Question generation for transcript windows.
//!
//! Each window goes through a bounded generate → validate → review loop driven
//! by the [`SupervisorAgent`]; the [`BatchRunner`] applies it to all windows in
//! order.

mod batch;
mod generator;
mod reviewer;
mod router;
mod supervisor;
mod validator;

pub use batch::BatchRunner;
pub use generator::Generator;
pub use reviewer::Reviewer;
pub use router::{ArchetypeRouter, ClassifierRouter, FixedRouter};
pub use supervisor::{SupervisorAgent, SupervisorOutcome};
pub use validator::validate;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Question style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionArchetype {
    TrueFalse,
    MultipleChoice,
    MultipleSelect,
}

impl QuestionArchetype {
    /// Generation and validation schema for this archetype.
    pub fn schema(self) -> ArchetypeSchema {
        let (option_count, cardinality) = match self {
            QuestionArchetype::TrueFalse => (2, AnswerCardinality::Single),
            QuestionArchetype::MultipleChoice => (4, AnswerCardinality::Single),
            QuestionArchetype::MultipleSelect => (4, AnswerCardinality::Multiple),
        };
        ArchetypeSchema {
            archetype: self,
            option_count,
            cardinality,
        }
    }

    /// Parse a classifier label such as `true/false` or `multiple-select`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();

        match normalized.as_str() {
            "truefalse" => Some(QuestionArchetype::TrueFalse),
            "multiplechoice" => Some(QuestionArchetype::MultipleChoice),
            "multipleselect" => Some(QuestionArchetype::MultipleSelect),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionArchetype::TrueFalse => write!(f, "true/false"),
            QuestionArchetype::MultipleChoice => write!(f, "multiple-choice"),
            QuestionArchetype::MultipleSelect => write!(f, "multiple-select"),
        }
    }
}

/// How many options may be correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerCardinality {
    Single,
    Multiple,
}

/// What a generated question must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeSchema {
    pub archetype: QuestionArchetype,
    pub option_count: usize,
    pub cardinality: AnswerCardinality,
}

/// Index (or indices) of the correct option(s), zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Single(usize),
    Multiple(Vec<usize>),
}

impl std::fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerKey::Single(index) => write!(f, "{}", index),
            AnswerKey::Multiple(indices) => {
                let joined = indices
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", joined)
            }
        }
    }
}

/// A syntactically valid question as produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: AnswerKey,
}

/// An accepted question attached to a window ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: AnswerKey,
    /// 1-based ordinal of the source window.
    pub segment: usize,
}

impl GeneratedQuestion {
    pub fn from_payload(payload: QuestionPayload, segment: usize) -> Self {
        Self {
            question: payload.question,
            options: payload.options,
            correct_answer: payload.correct_answer,
            segment,
        }
    }
}

/// Serialized flat: `question`, `option_1..option_N`, `correct_answer` as a
/// string, `segment`.
impl Serialize for GeneratedQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.options.len() + 3))?;
        map.serialize_entry("question", &self.question)?;
        for (i, option) in self.options.iter().enumerate() {
            map.serialize_entry(&format!("option_{}", i + 1), option)?;
        }
        map.serialize_entry("correct_answer", &self.correct_answer.to_string())?;
        map.serialize_entry("segment", &self.segment)?;
        map.end()
    }
}

/// The reviewer's judgement of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub is_valid: bool,
    #[serde(default)]
    pub feedback: String,
}

impl ReviewVerdict {
    /// The verdict used when the reviewer's output cannot be understood.
    pub fn unreadable() -> Self {
        Self {
            is_valid: false,
            feedback: "Invalid review response format".to_string(),
        }
    }
}

/// Slice out the outermost JSON object of an LLM response, tolerating
/// markdown fences or prose around it.
pub(crate) fn extract_json_object(response: &str) -> &str {
    let json_start = response.find('{');
    let json_end = response.rfind('}');

    match (json_start, json_end) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetype_schemas() {
        assert_eq!(QuestionArchetype::TrueFalse.schema().option_count, 2);
        assert_eq!(QuestionArchetype::MultipleChoice.schema().option_count, 4);
        let select = QuestionArchetype::MultipleSelect.schema();
        assert_eq!(select.option_count, 4);
        assert_eq!(select.cardinality, AnswerCardinality::Multiple);
    }

    #[test]
    fn test_archetype_from_label() {
        assert_eq!(QuestionArchetype::from_label("true/false"), Some(QuestionArchetype::TrueFalse));
        assert_eq!(QuestionArchetype::from_label(" Multiple-Choice "), Some(QuestionArchetype::MultipleChoice));
        assert_eq!(QuestionArchetype::from_label("multiple select"), Some(QuestionArchetype::MultipleSelect));
        assert_eq!(QuestionArchetype::from_label("essay"), None);
    }

    #[test]
    fn test_answer_key_display() {
        assert_eq!(AnswerKey::Single(2).to_string(), "2");
        assert_eq!(AnswerKey::Multiple(vec![0, 2]).to_string(), "[0, 2]");
    }

    #[test]
    fn test_generated_question_serialization() {
        let question = GeneratedQuestion {
            question: "Which graph is a cycle?".to_string(),
            options: vec!["C4".into(), "P4".into(), "K1,3".into(), "K4".into()],
            correct_answer: AnswerKey::Single(0),
            segment: 3,
        };

        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "question": "Which graph is a cycle?",
                "option_1": "C4",
                "option_2": "P4",
                "option_3": "K1,3",
                "option_4": "K4",
                "correct_answer": "0",
                "segment": 3
            })
        );
    }

    #[test]
    fn test_extract_json_object() {
        let response = "```json\n{\"is_valid\": true}\n```";
        assert_eq!(extract_json_object(response), "{\"is_valid\": true}");
        assert_eq!(extract_json_object("no json"), "no json");
    }
}
