//! Rule-based scoring of generated questions.
//!
//! Five dimension checks run in fixed order, each producing a raw score
//! and the suggestions for every penalty it triggered. Raw scores live on
//! a 0-100 scale where one rubric point weighs [`RUBRIC_POINT`] raw
//! points; the five-way sum is then integer-divided by the dimension
//! count and capped at 100.

use serde::Serialize;

use crate::generator::question::{GeneratedQuestion, EXPECTED_DIFFICULTY};

/// Raw weight of one rubric point. Dimension raw scores sit on a 0-100
/// scale (20 rubric points x 5) so the aggregate division lands on the
/// familiar 0-100 range.
const RUBRIC_POINT: i32 = 5;

/// Starting raw score of every dimension.
const DIMENSION_BASE: i32 = 20 * RUBRIC_POINT;

/// A dimension passes when it keeps at least 15 of its 20 rubric points.
const DIMENSION_PASS_BAR: i32 = 15 * RUBRIC_POINT;

/// Number of rubric dimensions.
const DIMENSION_COUNT: i32 = 5;

/// Minimum total score for a question to be accepted.
pub const PASSING_SCORE: i32 = 80;

/// Minimum explanation length in characters.
const MIN_EXPLANATION_CHARS: usize = 100;

/// Markers of an elevated-context question statement.
const CONTEXT_MARKERS: [&str; 2] = ["professional", "enterprise"];

/// Words expected in a business-scenario question statement.
const SCENARIO_KEYWORDS: [&str; 6] = [
    "company",
    "enterprise",
    "organization",
    "business",
    "migrate",
    "implement",
];

/// Architectural trade-off dimensions a scenario should touch.
const TRADEOFF_KEYWORDS: [&str; 5] = [
    "cost",
    "performance",
    "security",
    "availability",
    "scalability",
];

/// Pass/fail verdict per rubric dimension, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionChecks {
    pub technical_accuracy: bool,
    pub difficulty_appropriateness: bool,
    pub format_correctness: bool,
    pub explanation_quality: bool,
    pub business_scenario_realism: bool,
}

impl DimensionChecks {
    /// Whether every dimension passed.
    pub fn all_passed(&self) -> bool {
        self.technical_accuracy
            && self.difficulty_appropriateness
            && self.format_correctness
            && self.explanation_quality
            && self.business_scenario_realism
    }
}

/// Outcome of validating one generated question.
///
/// Computed fresh on every call and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct QualityAssessment {
    /// Identifier of the assessed question.
    pub question_ref: String,
    /// Whether the question clears the quality gate.
    pub is_valid: bool,
    /// Aggregate score, 0-100.
    pub total_score: i32,
    /// Per-dimension verdicts.
    pub dimension_scores: DimensionChecks,
    /// Human-readable fixes for every triggered penalty, in dimension
    /// order. Empty for a flawless question.
    pub suggestions: Vec<String>,
}

/// Deterministic five-dimension quality validator.
///
/// Scoring is a pure function of the question: no hidden state, no
/// randomness, no external calls, and it cannot fail. Absent fields score
/// as empty values.
#[derive(Debug, Clone)]
pub struct QualityValidator {
    expected_difficulty: String,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityValidator {
    /// Creates a validator expecting the standard Professional tier.
    pub fn new() -> Self {
        Self {
            expected_difficulty: EXPECTED_DIFFICULTY.to_string(),
        }
    }

    /// Overrides the expected difficulty tier (case-insensitive compare).
    pub fn with_expected_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.expected_difficulty = difficulty.into();
        self
    }

    /// Scores one question across all five dimensions.
    pub fn validate(&self, question: &GeneratedQuestion) -> QualityAssessment {
        let mut suggestions = Vec::new();

        let accuracy = self.check_technical_accuracy(question, &mut suggestions);
        let difficulty = self.check_difficulty(question, &mut suggestions);
        let format = self.check_format(question, &mut suggestions);
        let explanation = self.check_explanation(question, &mut suggestions);
        let scenario = self.check_business_scenario(question, &mut suggestions);

        // Historical aggregation, calibrated against the 80-point pass
        // bar: the five raw scores are summed, integer-divided by the
        // dimension count, and capped at 100 because the accuracy bonus
        // can push the sum past 500. Keep the arithmetic exactly as is;
        // rescaling it shifts pass rates.
        let raw_sum = accuracy + difficulty + format + explanation + scenario;
        let total_score = (raw_sum / DIMENSION_COUNT).clamp(0, 100);

        let dimension_scores = DimensionChecks {
            technical_accuracy: accuracy >= DIMENSION_PASS_BAR,
            difficulty_appropriateness: difficulty >= DIMENSION_PASS_BAR,
            format_correctness: format >= DIMENSION_PASS_BAR,
            explanation_quality: explanation >= DIMENSION_PASS_BAR,
            business_scenario_realism: scenario >= DIMENSION_PASS_BAR,
        };

        QualityAssessment {
            question_ref: question.id.clone(),
            is_valid: total_score >= PASSING_SCORE && dimension_scores.all_passed(),
            total_score,
            dimension_scores,
            suggestions,
        }
    }

    /// Technical accuracy: the question must name the services it tests,
    /// with a bonus for elevated-context phrasing.
    fn check_technical_accuracy(
        &self,
        question: &GeneratedQuestion,
        suggestions: &mut Vec<String>,
    ) -> i32 {
        let mut score = DIMENSION_BASE;
        let text = question.question.to_lowercase();

        if question.service_tags.is_empty() {
            score -= 5 * RUBRIC_POINT;
            suggestions.push(
                "Tag the AWS services the question exercises so accuracy can be verified"
                    .to_string(),
            );
        }

        if CONTEXT_MARKERS.iter().any(|marker| text.contains(marker)) {
            score += 5 * RUBRIC_POINT;
        }

        score
    }

    /// Difficulty appropriateness: the stated tier must match and the
    /// tag sets must be deep enough for that tier.
    fn check_difficulty(
        &self,
        question: &GeneratedQuestion,
        suggestions: &mut Vec<String>,
    ) -> i32 {
        let mut score = DIMENSION_BASE;

        if !question
            .difficulty
            .eq_ignore_ascii_case(&self.expected_difficulty)
        {
            score -= 10 * RUBRIC_POINT;
            suggestions.push(format!(
                "Set difficulty to '{}' (got '{}')",
                self.expected_difficulty, question.difficulty
            ));
        }

        if question.concept_tags.len() < 3 {
            score -= 5 * RUBRIC_POINT;
            suggestions.push(
                "Cover at least three concepts; a single-concept question reads below tier"
                    .to_string(),
            );
        }

        if question.service_tags.len() < 2 {
            score -= 5 * RUBRIC_POINT;
            suggestions.push(
                "Involve at least two AWS services to force a trade-off".to_string(),
            );
        }

        score
    }

    /// Format correctness: all required fields present, exactly four
    /// choices labeled A-D, correct answer among them. Penalties within
    /// this dimension compound.
    fn check_format(&self, question: &GeneratedQuestion, suggestions: &mut Vec<String>) -> i32 {
        let mut score = DIMENSION_BASE;

        if question.question.is_empty() {
            score -= 5 * RUBRIC_POINT;
            suggestions.push("Question text is missing".to_string());
        }
        if question.options.is_empty() {
            score -= 5 * RUBRIC_POINT;
            suggestions.push("Answer options are missing".to_string());
        }
        if question.correct_answer.is_empty() {
            score -= 5 * RUBRIC_POINT;
            suggestions.push("Correct answer is missing".to_string());
        }
        if question.explanation.is_empty() {
            score -= 5 * RUBRIC_POINT;
            suggestions.push("Explanation is missing".to_string());
        }

        if !question.has_standard_option_labels() {
            score -= 5 * RUBRIC_POINT;
            suggestions.push("Provide exactly four options labeled A through D".to_string());
        }

        let answer = question.correct_answer.to_ascii_uppercase();
        if !matches!(answer.as_str(), "A" | "B" | "C" | "D") {
            score -= 5 * RUBRIC_POINT;
            suggestions.push("Correct answer must be one of A, B, C or D".to_string());
        }

        score
    }

    /// Explanation quality: long enough to teach, and it should discuss
    /// the choices rather than restate the answer.
    fn check_explanation(
        &self,
        question: &GeneratedQuestion,
        suggestions: &mut Vec<String>,
    ) -> i32 {
        let mut score = DIMENSION_BASE;
        let explanation = question.explanation.to_lowercase();

        if question.explanation.chars().count() < MIN_EXPLANATION_CHARS {
            score -= 10 * RUBRIC_POINT;
            suggestions.push(format!(
                "Expand the explanation to at least {} characters",
                MIN_EXPLANATION_CHARS
            ));
        }

        if !explanation.contains("option") && !explanation.contains("choice") {
            score -= 5 * RUBRIC_POINT;
            suggestions.push(
                "Discuss the individual options: why the correct one wins and the others do not"
                    .to_string(),
            );
        }

        score
    }

    /// Business-scenario realism: the statement should read like a real
    /// engagement and hinge on an architectural trade-off.
    fn check_business_scenario(
        &self,
        question: &GeneratedQuestion,
        suggestions: &mut Vec<String>,
    ) -> i32 {
        let mut score = DIMENSION_BASE;
        let text = question.question.to_lowercase();

        if !SCENARIO_KEYWORDS.iter().any(|word| text.contains(word)) {
            score -= 10 * RUBRIC_POINT;
            suggestions.push(
                "Frame the question as a business scenario (a company, a migration, an implementation)"
                    .to_string(),
            );
        }

        if !TRADEOFF_KEYWORDS.iter().any(|word| text.contains(word)) {
            score -= 5 * RUBRIC_POINT;
            suggestions.push(
                "Anchor the scenario on a trade-off such as cost, performance, security, availability or scalability"
                    .to_string(),
            );
        }

        score
    }
}
