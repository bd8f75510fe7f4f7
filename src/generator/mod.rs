//! Question generation through the managed agent runtime.
//!
//! The runtime is a black box that turns a prompt into structured output.
//! `QuestionGenerator` is the seam the pipeline depends on;
//! `AgentRuntimeClient` is the production HTTP implementation.

pub mod client;
pub mod question;

pub use client::{AgentRuntimeClient, QuestionGenerator, QuestionRequest};
pub use question::{AnswerOption, GeneratedQuestion, EXPECTED_DIFFICULTY};
