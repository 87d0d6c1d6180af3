//! End-to-end scenarios for the validate-rewrite orchestration loop,
//! driven against scripted LLM and validator adapters.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ar_rewrite_core::prelude::*;
use ar_rewrite_core::types::AdapterError;
use async_trait::async_trait;

struct QueueLlm {
    answers: Mutex<VecDeque<Result<String, AdapterError>>>,
}

impl QueueLlm {
    fn new(answers: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.to_string())).collect()),
        })
    }
}

#[async_trait]
impl LlmAdapter for QueueLlm {
    async fn generate(&self, _model_id: &str, _prompt: &str) -> Result<String, AdapterError> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("test scripted fewer LLM calls than the orchestrator made")
    }
}

struct QueueValidator {
    verdicts: Mutex<VecDeque<ValidationOutput>>,
}

impl QueueValidator {
    fn new(verdicts: Vec<ValidationOutput>) -> Arc<Self> {
        Arc::new(Self {
            verdicts: Mutex::new(verdicts.into_iter().collect()),
        })
    }
}

#[async_trait]
impl ValidatorAdapter for QueueValidator {
    async fn validate(
        &self,
        _policy_id: &str,
        _answer: &str,
    ) -> Result<(Vec<Finding>, ValidationOutput), AdapterError> {
        let verdict = self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .expect("test scripted fewer validator calls than the orchestrator made");
        let finding = Finding {
            validation_output: verdict,
            details: FindingDetails {
                premises: vec![],
                claims: vec![],
                supporting_rules: vec![],
                confidence: 1.0,
            },
        };
        Ok((vec![finding], verdict))
    }
}

fn core(llm: Vec<&str>, verdicts: Vec<ValidationOutput>) -> ReasoningCore {
    ReasoningCoreBuilder::new().build(QueueLlm::new(llm), QueueValidator::new(verdicts))
}

const MODEL: &str = "default-model";
const POLICY: &str = "default-policy";

#[tokio::test]
async fn test_scenario_1_happy_path() {
    let core = core(vec!["4"], vec![ValidationOutput::Valid]);
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();
    let thread = core.get_thread(thread_id).await.unwrap();

    assert_eq!(thread.iterations.len(), 1);
    assert_eq!(thread.iterations[0].iteration_number(), 0);
    assert_eq!(thread.status, ThreadStatus::Completed);
    assert_eq!(thread.final_response.as_deref(), Some("4"));
    assert!(thread.warning_message.is_none());
}

#[tokio::test]
async fn test_scenario_2_one_rewrite() {
    let core = core(vec!["5", "4"], vec![ValidationOutput::Invalid, ValidationOutput::Valid]);
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();
    let thread = core.get_thread(thread_id).await.unwrap();

    assert_eq!(thread.iterations.len(), 2);
    assert_eq!(thread.status, ThreadStatus::Completed);
    assert_eq!(thread.final_response.as_deref(), Some("4"));
    assert_eq!(thread.iterations[1].iteration_number(), 1);
    match &thread.iterations[1] {
        Iteration::ArFeedback {
            original_answer,
            rewritten_answer,
            ..
        } => {
            assert_eq!(original_answer, "5");
            assert_eq!(rewritten_answer, "4");
        }
        other => panic!("expected ArFeedback iteration, got {other:?}"),
    }
}

#[tokio::test]
async fn test_scenario_3_clarification_path() {
    let core = core(
        vec!["5", "Which year?\nWhich region?", "4"],
        vec![ValidationOutput::Satisfiable, ValidationOutput::Valid],
    );
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();

    let thread = core.get_thread(thread_id).await.unwrap();
    assert_eq!(thread.status, ThreadStatus::AwaitingUserInput);
    // [0] is the initial AR_FEEDBACK iteration; [1] is the pending clarification.
    assert_eq!(thread.iterations.len(), 2);
    let Iteration::UserClarification { qa_exchange, .. } = &thread.iterations[1] else {
        panic!("expected a pending UserClarification iteration at index 1");
    };
    assert_eq!(qa_exchange.questions, vec!["Which year?", "Which region?"]);
    assert!(qa_exchange.answers.is_none());

    core.submit_answers(thread_id, Some(vec!["2024".into(), "EU".into()]), false)
        .await
        .unwrap();

    let thread = core.get_thread(thread_id).await.unwrap();
    assert_eq!(thread.status, ThreadStatus::Completed);
    assert_eq!(thread.iterations.len(), 2);
    let Iteration::UserClarification {
        qa_exchange,
        validation_output,
        ..
    } = &thread.iterations[1]
    else {
        panic!("expected the resolved clarification iteration at index 1");
    };
    assert_eq!(qa_exchange.answers, Some(vec!["2024".to_string(), "EU".to_string()]));
    assert_eq!(*validation_output, Some(ValidationOutput::Valid));
}

#[tokio::test]
async fn test_scenario_4_skip_path_falls_back_to_ar_feedback() {
    let core = core(
        vec!["5", "Which year?", "5"],
        vec![ValidationOutput::Satisfiable, ValidationOutput::Invalid],
    );
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 2)
        .await
        .unwrap();

    core.submit_answers(thread_id, None, true).await.unwrap();

    let thread = core.get_thread(thread_id).await.unwrap();
    let Iteration::UserClarification { qa_exchange, .. } = &thread.iterations[1] else {
        panic!("expected the resolved clarification iteration at index 1");
    };
    assert!(qa_exchange.skipped);
    assert!(qa_exchange.answers.is_none());
    // budget (2) is exhausted by the clarification turn itself, so the
    // thread terminates rather than looping further.
    assert_eq!(thread.status, ThreadStatus::Completed);
    assert!(thread.warning_message.as_deref().unwrap().contains("budget"));
}

#[tokio::test]
async fn test_scenario_5_budget_exhaustion() {
    let core = core(
        vec!["5", "5"],
        vec![ValidationOutput::Invalid, ValidationOutput::Invalid],
    );
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 2)
        .await
        .unwrap();
    let thread = core.get_thread(thread_id).await.unwrap();

    assert_eq!(thread.status, ThreadStatus::Completed);
    assert_eq!(thread.iterations.len(), 2);
    assert_eq!(
        thread.final_response.as_deref(),
        thread.iterations[1].rewritten_answer()
    );
    assert!(thread.warning_message.as_deref().unwrap().contains("budget"));
}

#[tokio::test]
async fn test_scenario_6_out_of_policy() {
    let core = core(vec!["purple"], vec![ValidationOutput::NoTranslations]);
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();
    let thread = core.get_thread(thread_id).await.unwrap();

    assert_eq!(thread.iterations.len(), 1);
    assert_eq!(thread.status, ThreadStatus::Completed);
    assert_eq!(thread.final_response.as_deref(), Some("purple"));
    assert!(thread.warning_message.as_deref().unwrap().contains("scope"));
}

#[tokio::test]
async fn test_property_single_clarification_per_thread() {
    // Satisfiable persists after the one clarification is resolved
    // non-VALID; rule 5 must route to CONTINUE rather than asking again.
    let core = core(
        vec!["5", "Which year?", "4", "3"],
        vec![
            ValidationOutput::Satisfiable,
            ValidationOutput::Satisfiable,
            ValidationOutput::Valid,
        ],
    );
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();
    core.submit_answers(thread_id, Some(vec!["2024".into()]), false)
        .await
        .unwrap();

    let thread = core.get_thread(thread_id).await.unwrap();
    let clarifications = thread.iterations.iter().filter(|it| it.is_user_clarification()).count();
    assert_eq!(clarifications, 1);
    assert_eq!(thread.status, ThreadStatus::Completed);
}

#[tokio::test]
async fn test_property_iteration_numbering_has_no_gaps() {
    let core = core(
        vec!["5", "6", "4"],
        vec![
            ValidationOutput::Invalid,
            ValidationOutput::Invalid,
            ValidationOutput::Valid,
        ],
    );
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();
    let thread = core.get_thread(thread_id).await.unwrap();

    for (k, iteration) in thread.iterations.iter().enumerate() {
        assert_eq!(iteration.iteration_number(), k as u32);
    }
}

#[tokio::test]
async fn test_submit_answers_rejects_wrong_answer_count() {
    let core = core(
        vec!["5", "Which year?\nWhich region?"],
        vec![ValidationOutput::Satisfiable],
    );
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();

    let err = core
        .submit_answers(thread_id, Some(vec!["2024".into()]), false)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::IllegalState { .. }));
}

#[tokio::test]
async fn test_submit_answers_outside_awaiting_state_is_illegal() {
    let core = core(vec!["4"], vec![ValidationOutput::Valid]);
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();

    let err = core
        .submit_answers(thread_id, Some(vec!["x".into()]), false)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::IllegalState { .. }));
}

#[tokio::test]
async fn test_submit_answers_rejects_pending_iteration_with_no_questions() {
    // A blank question-synthesis response leaves qa_exchange.questions
    // empty; submit_answers must refuse it regardless of skipped.
    let core = core(vec!["5", "   \n  "], vec![ValidationOutput::Satisfiable]);
    let thread_id = core
        .create_thread("What is 2+2?".into(), MODEL.into(), POLICY.into(), 5)
        .await
        .unwrap();
    let thread = core.get_thread(thread_id).await.unwrap();
    assert_eq!(thread.status, ThreadStatus::AwaitingUserInput);

    let err = core
        .submit_answers(thread_id, None, true)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::IllegalState { .. }));
}
