//! Iteration records: the thread's typed, append-only history.

use serde::{Deserialize, Serialize};

use super::verdict::{Finding, ValidationOutput};

/// Marks whether an AR_FEEDBACK iteration is the first generation or a
/// subsequent rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmDecision {
    Initial,
    Continue,
}

/// The questions asked of the user and, once answered, their answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaExchange {
    pub questions: Vec<String>,
    pub answers: Option<Vec<String>>,
    pub skipped: bool,
}

/// One pass through the validate-rewrite loop.
///
/// A discriminated union keyed on iteration type; renderers dispatch on
/// the tag and never need to down-cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "iteration_type", rename_all = "snake_case")]
pub enum Iteration {
    ArFeedback {
        iteration_number: u32,
        original_answer: String,
        rewriting_prompt: String,
        rewritten_answer: String,
        findings: Vec<Finding>,
        validation_output: ValidationOutput,
        llm_decision: LlmDecision,
    },
    UserClarification {
        iteration_number: u32,
        original_answer: String,
        rewriting_prompt: String,
        /// Absent while the iteration is pending (`qa_exchange.answers` is
        /// `None`); populated once answers arrive and the iteration is
        /// resolved.
        rewritten_answer: Option<String>,
        qa_exchange: QaExchange,
        context_augmentation: Option<String>,
        validation_findings: Vec<Finding>,
        validation_output: Option<ValidationOutput>,
    },
}

impl Iteration {
    pub fn iteration_number(&self) -> u32 {
        match self {
            Iteration::ArFeedback { iteration_number, .. }
            | Iteration::UserClarification { iteration_number, .. } => *iteration_number,
        }
    }

    pub fn validation_output(&self) -> Option<ValidationOutput> {
        match self {
            Iteration::ArFeedback {
                validation_output, ..
            } => Some(*validation_output),
            Iteration::UserClarification {
                validation_output, ..
            } => *validation_output,
        }
    }

    pub fn rewritten_answer(&self) -> Option<&str> {
        match self {
            Iteration::ArFeedback { rewritten_answer, .. } => Some(rewritten_answer.as_str()),
            Iteration::UserClarification { rewritten_answer, .. } => rewritten_answer.as_deref(),
        }
    }

    pub fn is_pending_clarification(&self) -> bool {
        matches!(
            self,
            Iteration::UserClarification {
                rewritten_answer: None,
                ..
            }
        )
    }

    pub fn is_user_clarification(&self) -> bool {
        matches!(self, Iteration::UserClarification { .. })
    }
}
