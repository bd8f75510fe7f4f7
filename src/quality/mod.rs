//! Quality gating for generated questions.
//!
//! A generated question is scored across five deterministic rubric
//! dimensions before it is accepted. The validator never calls external
//! services and never fails; a malformed question simply scores low.

mod validator;

pub use validator::{DimensionChecks, QualityAssessment, QualityValidator, PASSING_SCORE};
