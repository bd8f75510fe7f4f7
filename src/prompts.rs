//! Prompts for exam question generation.
//!
//! The system prompt targets Professional-level certification questions
//! with realistic business scenarios. The user prompt carries the exam
//! identifier and, when recent usage is known, the diversity steering
//! block produced by [`crate::diversity::build_instruction`].

/// System prompt for the question generation agent.
pub const QUESTION_GENERATION_SYSTEM: &str = "\
You are a specialist agent that writes AWS certification exam questions.

Requirements:
- Professional-level questions grounded in realistic enterprise scenarios
- Exactly four answer choices labeled A through D
- One correct answer; the others technically plausible but not optimal
- A detailed explanation of why the correct option wins and why each other \
choice falls short
- Reflect current AWS services and features, and cite the official \
documentation pages consulted

Return a single JSON object with the fields: topic, difficulty, question, \
options (array of {label, text}), correct_answer, explanation, \
service_tags, concept_tags, source_refs.";

/// Builds the user prompt for one generation attempt.
///
/// The diversity block is appended verbatim when present and omitted
/// entirely when `None`.
pub fn build_generation_prompt(exam_id: &str, diversity_instruction: Option<&str>) -> String {
    let mut prompt = format!(
        "Write one exam question for the {} certification. The question \
         must present a business scenario and test architectural judgment, \
         not recall.",
        exam_id
    );

    if let Some(instruction) = diversity_instruction {
        prompt.push_str("\n\n");
        prompt.push_str(instruction);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diversity::{build_instruction, DiversityContext};

    #[test]
    fn test_prompt_contains_exam_id() {
        let prompt = build_generation_prompt("AWS-SAP", None);
        assert!(prompt.contains("AWS-SAP"));
        assert!(!prompt.contains("diversity"));
    }

    #[test]
    fn test_prompt_appends_diversity_block() {
        let context = DiversityContext::from_labels(["Security", "Security", "Networking"]);
        let instruction = build_instruction(&context).expect("non-empty context");
        let prompt = build_generation_prompt("AWS-SAP", Some(&instruction));
        assert!(prompt.contains("Topic diversity guidance"));
        assert!(prompt.contains("Security"));
        assert!(prompt.contains("Networking"));
    }
}
