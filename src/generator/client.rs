//! HTTP client for the managed agent runtime.
//!
//! Invokes the runtime's endpoint with a generation prompt and recovers a
//! structured question from the model output. Transport failures are not
//! retried here: the pipeline's single regeneration exists for quality
//! failures, not faults.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::generator::question::GeneratedQuestion;
use crate::prompts::{build_generation_prompt, QUESTION_GENERATION_SYSTEM};
use crate::utils::json_extraction::extract_json_object;

/// Inputs for one generation attempt.
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    /// Exam the question targets, e.g. "AWS-SAP".
    pub exam_id: String,
    /// Diversity steering block, omitted from the prompt when `None`.
    pub diversity_instruction: Option<String>,
}

impl QuestionRequest {
    /// Creates a request without diversity steering.
    pub fn new(exam_id: impl Into<String>) -> Self {
        Self {
            exam_id: exam_id.into(),
            diversity_instruction: None,
        }
    }

    /// Attaches a diversity steering block.
    pub fn with_diversity_instruction(mut self, instruction: Option<String>) -> Self {
        self.diversity_instruction = instruction;
        self
    }
}

/// Trait for generators that can produce one exam question.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generates one question for the given request.
    async fn generate(&self, request: &QuestionRequest)
        -> Result<GeneratedQuestion, GenerationError>;
}

/// Client for the agent runtime's invocation endpoint.
pub struct AgentRuntimeClient {
    /// Invocation URL.
    endpoint: String,
    /// Optional bearer token.
    api_key: Option<String>,
    /// HTTP client for invocation requests.
    http_client: Client,
}

impl AgentRuntimeClient {
    /// Creates a new runtime client.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            http_client,
        })
    }

    /// Creates a runtime client from environment variables.
    ///
    /// Reads `EXAMFORGE_RUNTIME_ENDPOINT` (required) and
    /// `EXAMFORGE_RUNTIME_API_KEY` (optional).
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingEndpoint` if the endpoint is not
    /// set.
    pub fn from_env() -> Result<Self, GenerationError> {
        let endpoint = std::env::var("EXAMFORGE_RUNTIME_ENDPOINT")
            .map_err(|_| GenerationError::MissingEndpoint)?;
        let api_key = std::env::var("EXAMFORGE_RUNTIME_API_KEY").ok();
        Self::new(endpoint, api_key, Duration::from_secs(120))
    }

    /// Returns the invocation endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Invocation request body.
#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    system: &'a str,
    prompt: &'a str,
}

/// Invocation response body. The runtime returns the model output as one
/// text field; structured content is recovered from it.
#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    output: String,
}

/// Recovers a structured question from raw model output.
fn parse_question(output: &str) -> Result<GeneratedQuestion, GenerationError> {
    let json = extract_json_object(output).ok_or_else(|| {
        let preview: String = output.chars().take(80).collect();
        GenerationError::ParseError(format!("no JSON object in model output: '{}'", preview))
    })?;

    let question: GeneratedQuestion = serde_json::from_str(&json)?;
    Ok(question)
}

#[async_trait]
impl QuestionGenerator for AgentRuntimeClient {
    async fn generate(
        &self,
        request: &QuestionRequest,
    ) -> Result<GeneratedQuestion, GenerationError> {
        let prompt = build_generation_prompt(
            &request.exam_id,
            request.diversity_instruction.as_deref(),
        );

        let body = InvokeRequest {
            system: QUESTION_GENERATION_SYSTEM,
            prompt: &prompt,
        };

        let mut http_request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(ref api_key) = self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::RuntimeError {
                code: status.as_u16(),
                message,
            });
        }

        let invoke_response: InvokeResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        let question = parse_question(&invoke_response.output)?;

        tracing::info!(
            question_id = %question.id,
            topic = %question.topic,
            "Question generated"
        );
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_direct_json() {
        let output = r#"{
            "topic": "Security",
            "difficulty": "professional",
            "question": "An enterprise needs...",
            "options": [
                {"label": "A", "text": "Use IAM roles"},
                {"label": "B", "text": "Use access keys"},
                {"label": "C", "text": "Use root credentials"},
                {"label": "D", "text": "Use shared passwords"}
            ],
            "correct_answer": "A",
            "explanation": "Option A is correct because roles rotate credentials.",
            "service_tags": ["IAM", "STS"],
            "concept_tags": ["least privilege", "federation", "rotation"],
            "source_refs": ["https://docs.aws.amazon.com/iam/"]
        }"#;

        let question = parse_question(output).expect("valid output parses");
        assert_eq!(question.topic, "Security");
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct_answer, "A");
        assert!(question.has_standard_option_labels());
    }

    #[test]
    fn test_parse_question_fenced_output() {
        let output = "Here is the question:\n```json\n{\"topic\": \"Networking\", \"question\": \"Which subnet...\"}\n```";
        let question = parse_question(output).expect("fenced output parses");
        assert_eq!(question.topic, "Networking");
        assert!(question.options.is_empty());
    }

    #[test]
    fn test_parse_question_no_json() {
        let err = parse_question("the model refused to answer").unwrap_err();
        assert!(matches!(err, GenerationError::ParseError(_)));
    }

    #[test]
    fn test_request_builder() {
        let request = QuestionRequest::new("AWS-SAP")
            .with_diversity_instruction(Some("avoid Security".to_string()));
        assert_eq!(request.exam_id, "AWS-SAP");
        assert_eq!(
            request.diversity_instruction.as_deref(),
            Some("avoid Security")
        );
    }
}
