//! Generated exam question model.
//!
//! Questions arrive from the agent runtime as structured output. Every
//! field beyond the text itself defaults to an empty value so a partially
//! formed response still deserializes; the quality validator scores the
//! gaps instead of the parser rejecting them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Difficulty tier expected of generated questions.
pub const EXPECTED_DIFFICULTY: &str = "professional";

/// One labeled answer choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Choice label, "A" through "D" for a well-formed question.
    pub label: String,
    /// Choice text.
    pub text: String,
}

impl AnswerOption {
    /// Creates a labeled choice.
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// A candidate exam question produced by the generation runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    /// Stable identifier assigned on receipt.
    #[serde(default = "new_question_id")]
    pub id: String,
    /// Topic classification used for diversity tracking.
    #[serde(default)]
    pub topic: String,
    /// Stated difficulty tier.
    #[serde(default)]
    pub difficulty: String,
    /// Question text.
    #[serde(default)]
    pub question: String,
    /// Labeled answer choices.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Label of the correct choice.
    #[serde(default)]
    pub correct_answer: String,
    /// Why the correct choice is right and the others are not.
    #[serde(default)]
    pub explanation: String,
    /// AWS services the question exercises.
    #[serde(default)]
    pub service_tags: Vec<String>,
    /// Architectural or operational concepts the question exercises.
    #[serde(default)]
    pub concept_tags: Vec<String>,
    /// Reference documents consulted during generation.
    #[serde(default)]
    pub source_refs: Vec<String>,
}

fn new_question_id() -> String {
    format!("q_{}", Uuid::new_v4().simple())
}

impl GeneratedQuestion {
    /// Returns the choice text matching the correct answer label, if any.
    pub fn choice_for_answer(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.label.eq_ignore_ascii_case(&self.correct_answer))
            .map(|option| option.text.as_str())
    }

    /// Whether the option set is exactly the four labels A through D.
    pub fn has_standard_option_labels(&self) -> bool {
        if self.options.len() != 4 {
            return false;
        }
        ["A", "B", "C", "D"]
            .iter()
            .zip(self.options.iter())
            .all(|(expected, option)| option.label == *expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_with_options(labels: &[&str]) -> GeneratedQuestion {
        GeneratedQuestion {
            id: "q_test".to_string(),
            topic: "Security".to_string(),
            difficulty: EXPECTED_DIFFICULTY.to_string(),
            question: "Which option is correct?".to_string(),
            options: labels
                .iter()
                .map(|label| AnswerOption::new(*label, format!("choice {}", label)))
                .collect(),
            correct_answer: "B".to_string(),
            explanation: "Option B is correct.".to_string(),
            service_tags: vec!["IAM".to_string()],
            concept_tags: vec!["least privilege".to_string()],
            source_refs: vec![],
        }
    }

    #[test]
    fn test_choice_for_answer() {
        let question = question_with_options(&["A", "B", "C", "D"]);
        assert_eq!(question.choice_for_answer(), Some("choice B"));
    }

    #[test]
    fn test_choice_for_answer_case_insensitive() {
        let mut question = question_with_options(&["A", "B", "C", "D"]);
        question.correct_answer = "b".to_string();
        assert_eq!(question.choice_for_answer(), Some("choice B"));
    }

    #[test]
    fn test_choice_for_answer_missing_label() {
        let mut question = question_with_options(&["A", "B", "C", "D"]);
        question.correct_answer = "E".to_string();
        assert_eq!(question.choice_for_answer(), None);
    }

    #[test]
    fn test_standard_option_labels() {
        assert!(question_with_options(&["A", "B", "C", "D"]).has_standard_option_labels());
        assert!(!question_with_options(&["A", "B", "C"]).has_standard_option_labels());
        assert!(!question_with_options(&["A", "B", "C", "E"]).has_standard_option_labels());
        assert!(!question_with_options(&["A", "B", "C", "D", "E"]).has_standard_option_labels());
    }

    #[test]
    fn test_lenient_deserialization() {
        let question: GeneratedQuestion =
            serde_json::from_str(r#"{"question": "What is Amazon S3?"}"#)
                .expect("partial question deserializes");
        assert_eq!(question.question, "What is Amazon S3?");
        assert!(question.topic.is_empty());
        assert!(question.options.is_empty());
        assert!(question.service_tags.is_empty());
        assert!(question.id.starts_with("q_"));
    }
}
