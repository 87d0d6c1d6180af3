//! Decision Policy: chooses CONTINUE / ASK_USER / STOP for a thread.

use crate::types::{Thread, ValidationOutput};

/// Outcome of evaluating a thread's latest validation output against its
/// history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Proceed with an AR-feedback rewrite.
    Continue,
    /// Suspend the thread and ask the user for clarification. The
    /// questions themselves are synthesised afterward by the Rewriter
    /// through the LLM Adapter, not by the policy.
    AskUser,
    /// Terminate the thread. `is_error` distinguishes a fatal adapter
    /// failure (status=ERROR) from a policy-driven stop (status=COMPLETED).
    Stop { reason: StopReason, is_error: bool },
}

/// Why the orchestrator stopped driving a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Success,
    BudgetExhausted,
    OutOfPolicy,
    Error,
}

/// Evaluates the thread's iteration history and latest verdict.
///
/// Implementations must apply the rules in order and stop at the first
/// match; rule 4's "no prior clarification" check is what prevents a
/// thread from entering `AWAITING_USER_INPUT` more than once.
pub trait DecisionPolicy: Send + Sync {
    fn decide(&self, thread: &Thread, latest_verdict: ValidationOutput) -> Decision;
}

/// The policy described in the component design: five ordered rules,
/// evaluated top to bottom, first match wins.
#[derive(Debug, Default)]
pub struct DefaultDecisionPolicy;

impl DecisionPolicy for DefaultDecisionPolicy {
    fn decide(&self, thread: &Thread, latest_verdict: ValidationOutput) -> Decision {
        if latest_verdict == ValidationOutput::Valid {
            return Decision::Stop {
                reason: StopReason::Success,
                is_error: false,
            };
        }

        if thread.iteration_counter() + 1 > thread.config.max_iterations {
            return Decision::Stop {
                reason: StopReason::BudgetExhausted,
                is_error: false,
            };
        }

        if matches!(
            latest_verdict,
            ValidationOutput::NoTranslations | ValidationOutput::TranslationAmbiguous
        ) {
            return Decision::Stop {
                reason: StopReason::OutOfPolicy,
                is_error: false,
            };
        }

        if latest_verdict == ValidationOutput::Satisfiable && !thread.has_requested_clarification() {
            return Decision::AskUser;
        }

        Decision::Continue
    }
}
