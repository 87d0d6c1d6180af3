//! The Thread: the unit of work and the only long-lived entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ThreadId;
use super::iteration::Iteration;

/// The current `schema_version` stamped on every Thread, so a future
/// persistence layer can migrate the iteration record format.
pub const SCHEMA_VERSION: &str = "2.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Processing,
    AwaitingUserInput,
    Completed,
    Error,
}

impl ThreadStatus {
    /// Whether `self -> next` is a legal transition per the state machine
    /// in the data model: PROCESSING -> {AWAITING_USER_INPUT <-> PROCESSING}* -> {COMPLETED, ERROR}.
    pub fn can_transition_to(self, next: ThreadStatus) -> bool {
        use ThreadStatus::*;
        matches!(
            (self, next),
            (Processing, AwaitingUserInput)
                | (Processing, Completed)
                | (Processing, Error)
                | (AwaitingUserInput, Processing)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ThreadStatus::Completed | ThreadStatus::Error)
    }
}

/// Immutable configuration snapshotted at thread creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadConfig {
    pub model_id: String,
    pub policy_id: String,
    pub max_iterations: u32,
}

/// The unit of work and the only long-lived entity in the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: ThreadId,
    pub schema_version: String,
    pub user_prompt: String,
    pub config: ThreadConfig,
    pub status: ThreadStatus,
    pub iterations: Vec<Iteration>,
    pub final_response: Option<String>,
    pub warning_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Thread {
    pub fn new(thread_id: ThreadId, user_prompt: String, config: ThreadConfig) -> Self {
        Self {
            thread_id,
            schema_version: SCHEMA_VERSION.to_string(),
            user_prompt,
            config,
            status: ThreadStatus::Processing,
            iterations: Vec::new(),
            final_response: None,
            warning_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn iteration_counter(&self) -> u32 {
        self.iterations.len() as u32
    }

    /// At most one `UserClarification` iteration is ever produced per
    /// thread; used by the decision policy to enforce rule 4.
    pub fn has_requested_clarification(&self) -> bool {
        self.iterations.iter().any(Iteration::is_user_clarification)
    }

    pub fn pending_clarification_index(&self) -> Option<usize> {
        self.iterations
            .iter()
            .position(Iteration::is_pending_clarification)
    }

    pub fn last_iteration(&self) -> Option<&Iteration> {
        self.iterations.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::iteration::{LlmDecision, QaExchange};
    use crate::types::verdict::{Finding, FindingDetails, ValidationOutput};

    #[test]
    fn test_serializes_to_the_wire_shape_named_by_the_spec() {
        let mut thread = Thread::new(
            ThreadId::new(),
            "What is 2+2?".into(),
            ThreadConfig {
                model_id: "default-model".into(),
                policy_id: "default-policy".into(),
                max_iterations: 5,
            },
        );
        thread.iterations.push(Iteration::ArFeedback {
            iteration_number: 0,
            original_answer: "5".into(),
            rewriting_prompt: "rewrite".into(),
            rewritten_answer: "4".into(),
            findings: vec![Finding {
                validation_output: ValidationOutput::Valid,
                details: FindingDetails {
                    premises: vec![],
                    claims: vec![],
                    supporting_rules: vec![],
                    confidence: 1.0,
                },
            }],
            validation_output: ValidationOutput::Valid,
            llm_decision: LlmDecision::Initial,
        });
        thread.iterations.push(Iteration::UserClarification {
            iteration_number: 1,
            original_answer: "4".into(),
            rewriting_prompt: "ask".into(),
            rewritten_answer: None,
            qa_exchange: QaExchange {
                questions: vec!["Which year?".into()],
                answers: None,
                skipped: false,
            },
            context_augmentation: None,
            validation_findings: vec![],
            validation_output: None,
        });

        let value = serde_json::to_value(&thread).unwrap();
        let iterations = value["iterations"].as_array().unwrap();
        assert_eq!(iterations[0]["iteration_type"], "ar_feedback");
        assert_eq!(iterations[0]["validation_output"], "valid");
        assert_eq!(iterations[1]["iteration_type"], "user_clarification");
        assert!(iterations[1]["rewritten_answer"].is_null());
        assert!(iterations[1]["validation_output"].is_null());

        let round_tripped: Thread = serde_json::from_value(value).unwrap();
        assert_eq!(round_tripped.iterations.len(), 2);
        assert!(round_tripped.iterations[1].is_pending_clarification());
        assert_eq!(round_tripped.iterations[0].rewritten_answer(), Some("4"));
    }

    #[test]
    fn test_new_thread_is_processing_with_no_iterations() {
        let t = Thread::new(
            ThreadId::new(),
            "hi".into(),
            ThreadConfig {
                model_id: "m".into(),
                policy_id: "p".into(),
                max_iterations: 5,
            },
        );
        assert_eq!(t.status, ThreadStatus::Processing);
        assert_eq!(t.iteration_counter(), 0);
        assert!(t.final_response.is_none());
    }

    #[test]
    fn test_legal_transitions() {
        use ThreadStatus::*;
        assert!(Processing.can_transition_to(AwaitingUserInput));
        assert!(Processing.can_transition_to(Completed));
        assert!(AwaitingUserInput.can_transition_to(Processing));
        assert!(!AwaitingUserInput.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Error.can_transition_to(Processing));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ThreadStatus::Completed.is_terminal());
        assert!(ThreadStatus::Error.is_terminal());
        assert!(!ThreadStatus::Processing.is_terminal());
        assert!(!ThreadStatus::AwaitingUserInput.is_terminal());
    }
}
