//! Pipeline orchestration.
//!
//! Per invocation the pipeline gathers the diversity context, then for
//! each requested question runs one generation attempt, validates it, and
//! regenerates at most once when the quality gate fails. The second
//! attempt is kept whatever its assessment says. Usage recording and
//! notification are best-effort; only a generator fault aborts the flow.

use std::sync::Arc;

use crate::diversity::build_instruction;
use crate::error::GenerationError;
use crate::generator::client::{QuestionGenerator, QuestionRequest};
use crate::memory::recency::RecencyTracker;
use crate::notify::Notifier;
use crate::pipeline::types::{GenerateRequest, PipelineReport, PipelineResponse, QuestionResult};
use crate::quality::QualityValidator;

/// Orchestrates the generation-validation loop.
pub struct QuestionPipeline {
    generator: Arc<dyn QuestionGenerator>,
    recency: RecencyTracker,
    validator: QualityValidator,
    notifier: Option<Arc<dyn Notifier>>,
}

impl QuestionPipeline {
    /// Creates a pipeline over the given collaborators.
    ///
    /// `notifier` is optional: a deployment without a configured webhook
    /// generates questions without delivering them anywhere.
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        recency: RecencyTracker,
        validator: QualityValidator,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            generator,
            recency,
            validator,
            notifier,
        }
    }

    /// Runs one invocation and returns the response envelope.
    ///
    /// Never returns `Err`: generator faults become the error envelope,
    /// everything else resolves to the success envelope.
    pub async fn run(&self, request: &GenerateRequest) -> PipelineResponse {
        tracing::info!(
            exam_id = %request.exam_id,
            topic_count = request.topic_count,
            "Starting question generation flow"
        );

        let context = self.recency.recent_topics(&request.exam_id).await;
        let instruction = build_instruction(&context);

        let mut questions = Vec::with_capacity(request.topic_count as usize);
        for _ in 0..request.topic_count {
            match self
                .generate_one(&request.exam_id, instruction.clone())
                .await
            {
                Ok(result) => questions.push(result),
                Err(e) => {
                    tracing::error!(exam_id = %request.exam_id, error = %e, "Generation aborted");
                    return PipelineResponse::error(e.to_string());
                }
            }
        }

        let report = PipelineReport {
            exam_id: request.exam_id.clone(),
            questions,
        };

        // One delivery per invocation, carrying the whole bundle. A
        // failed delivery never alters the response.
        if let Some(ref notifier) = self.notifier {
            if let Err(e) = notifier.send(&report).await {
                tracing::warn!(error = %e, "Notification failed, returning result anyway");
            }
        }

        tracing::info!(
            exam_id = %request.exam_id,
            questions = report.questions.len(),
            "Question generation flow completed"
        );
        PipelineResponse::from(report)
    }

    /// Generates one question with at most one regeneration.
    async fn generate_one(
        &self,
        exam_id: &str,
        diversity_instruction: Option<String>,
    ) -> Result<QuestionResult, GenerationError> {
        let request =
            QuestionRequest::new(exam_id).with_diversity_instruction(diversity_instruction);

        let question = self.generator.generate(&request).await?;
        let assessment = self.validator.validate(&question);

        let (question, assessment, regenerated) = if assessment.is_valid {
            (question, assessment, false)
        } else {
            tracing::warn!(
                question_id = %question.id,
                score = assessment.total_score,
                "Quality gate failed, regenerating once"
            );
            // The single regeneration budget: the second attempt is
            // final whether or not it passes.
            let second = self.generator.generate(&request).await?;
            let second_assessment = self.validator.validate(&second);
            (second, second_assessment, true)
        };

        self.record_usage(exam_id, &question).await;

        tracing::info!(
            question_id = %question.id,
            topic = %question.topic,
            score = assessment.total_score,
            is_valid = assessment.is_valid,
            regenerated = regenerated,
            "Question finalized"
        );

        Ok(QuestionResult {
            question,
            quality: assessment,
            regenerated,
        })
    }

    /// Records the kept question's topic. Failures are logged and
    /// swallowed; losing one usage event only weakens diversification.
    async fn record_usage(&self, exam_id: &str, question: &crate::generator::GeneratedQuestion) {
        if question.topic.is_empty() {
            tracing::warn!(
                question_id = %question.id,
                "Question carries no topic label, skipping usage recording"
            );
            return;
        }

        if let Err(e) = self.recency.record_usage(exam_id, &question.topic).await {
            tracing::warn!(
                question_id = %question.id,
                error = %e,
                "Usage recording failed, continuing"
            );
        }
    }
}
