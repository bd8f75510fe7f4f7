//! Request and response types for the pipeline boundary.

use serde::Serialize;
use serde_json::Value;

use crate::generator::question::GeneratedQuestion;
use crate::notify::NotifyPayload;
use crate::quality::QualityAssessment;

/// Smallest accepted questions-per-invocation count.
pub const MIN_TOPIC_COUNT: u32 = 1;

/// Largest accepted questions-per-invocation count.
pub const MAX_TOPIC_COUNT: u32 = 5;

/// One pipeline invocation's input.
///
/// The boundary layer validates the raw request before it reaches the
/// pipeline; the constructor still clamps the count defensively.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Exam the questions target, e.g. "AWS-SAP".
    pub exam_id: String,
    /// Number of questions to generate, 1 through 5.
    pub topic_count: u32,
}

impl GenerateRequest {
    /// Creates a request, clamping the count into the accepted range.
    pub fn new(exam_id: impl Into<String>, topic_count: u32) -> Self {
        Self {
            exam_id: exam_id.into(),
            topic_count: topic_count.clamp(MIN_TOPIC_COUNT, MAX_TOPIC_COUNT),
        }
    }
}

/// One generated question with its final quality assessment.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    /// The question kept after the quality gate (second attempt when a
    /// regeneration happened, regardless of its outcome).
    pub question: GeneratedQuestion,
    /// Assessment of the kept question. May still be failing; that is
    /// allowed and not an error.
    pub quality: QualityAssessment,
    /// Whether the single regeneration was used.
    pub regenerated: bool,
}

/// The full result bundle of one invocation, delivered to the
/// notification sink and rendered into the success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Exam the questions target.
    pub exam_id: String,
    /// One entry per requested question.
    pub questions: Vec<QuestionResult>,
}

impl NotifyPayload for PipelineReport {
    fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// Structured response returned to the pipeline's invoker.
///
/// The pipeline never returns `Err`: every outcome is one of these two
/// envelopes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PipelineResponse {
    /// Successful invocation carrying the generated questions.
    Success {
        questions: Vec<QuestionResult>,
    },
    /// Failed invocation carrying a single human-readable message.
    Error { error: String },
}

impl PipelineResponse {
    /// Builds the error envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Whether this is the error envelope.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<PipelineReport> for PipelineResponse {
    fn from(report: PipelineReport) -> Self {
        Self::Success {
            questions: report.questions,
        }
    }
}
