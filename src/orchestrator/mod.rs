//! Orchestrator: drives one thread from creation to a terminal status.

use std::sync::Arc;

use crate::adapters::{LlmAdapter, ValidatorAdapter};
use crate::config::CoreConfig;
use crate::policy::{Decision, DecisionPolicy, StopReason};
use crate::rewriter::Rewriter;
use crate::store::{to_core_error, SharedThreadStore};
use crate::types::{
    CoreError, CoreResult, Finding, Iteration, LlmDecision, QaExchange, Thread, ThreadId,
    ThreadStatus, ValidationOutput,
};

const FIXED_SYSTEM_INSTRUCTION: &str =
    "Answer the user's question directly and concisely.";

/// Drives the validate -> decide -> rewrite loop for a single thread.
/// Holds no state of its own between invocations; everything that
/// survives between calls lives on the Thread in the store.
pub struct Orchestrator {
    store: SharedThreadStore,
    llm: Arc<dyn LlmAdapter>,
    validator: Arc<dyn ValidatorAdapter>,
    policy: Arc<dyn DecisionPolicy>,
    rewriter: Arc<dyn Rewriter>,
    config: CoreConfig,
}

impl Orchestrator {
    pub fn new(
        store: SharedThreadStore,
        llm: Arc<dyn LlmAdapter>,
        validator: Arc<dyn ValidatorAdapter>,
        policy: Arc<dyn DecisionPolicy>,
        rewriter: Arc<dyn Rewriter>,
        config: CoreConfig,
    ) -> Self {
        Self {
            store,
            llm,
            validator,
            policy,
            rewriter,
            config,
        }
    }

    /// Drive the thread forward until it reaches a terminal status or
    /// `AWAITING_USER_INPUT`. Safe to call repeatedly; a thread already
    /// in a terminal or suspended state returns immediately.
    pub async fn drive(&self, thread_id: ThreadId) -> CoreResult<()> {
        loop {
            let thread = self.store.get(thread_id).await.map_err(to_core_error)?;

            if thread.status.is_terminal() || thread.status == ThreadStatus::AwaitingUserInput {
                return Ok(());
            }

            let last = match thread.last_iteration() {
                None => {
                    if !self.generate_initial_iteration(&thread).await? {
                        return Ok(());
                    }
                    continue;
                }
                Some(it) => it.clone(),
            };
            if last.is_pending_clarification() {
                // Awaiting-user status already covers this; defensive only.
                return Ok(());
            }
            let Some(verdict) = last.validation_output() else {
                return Err(CoreError::IllegalState {
                    thread_id,
                    reason: "resolved iteration missing a verdict".to_string(),
                });
            };

            match self.policy.decide(&thread, verdict) {
                Decision::Stop { reason, is_error } => {
                    self.finish(&thread, &last, reason, is_error).await?;
                    return Ok(());
                }
                Decision::AskUser => {
                    self.suspend_for_clarification(&thread, &last).await?;
                    return Ok(());
                }
                Decision::Continue => {
                    if !self.continue_with_rewrite(&thread, &last).await? {
                        return Ok(());
                    }
                    continue;
                }
            }
        }
    }

    /// Step 1: first generation. Returns `Ok(true)` to keep looping,
    /// `Ok(false)` if the thread was terminated by an adapter failure.
    async fn generate_initial_iteration(&self, thread: &Thread) -> CoreResult<bool> {
        let thread_id = thread.thread_id;
        let prompt = format!("{}\n\n{FIXED_SYSTEM_INSTRUCTION}", thread.user_prompt);

        let Some(answer) = self
            .generate_or_terminate(thread_id, &thread.config.model_id, &prompt, String::new())
            .await?
        else {
            return Ok(false);
        };

        let Some((findings, verdict)) = self
            .validate_or_terminate(thread_id, &thread.config.policy_id, &answer, answer.clone())
            .await?
        else {
            return Ok(false);
        };

        let iteration = Iteration::ArFeedback {
            iteration_number: 0,
            original_answer: thread.user_prompt.clone(),
            rewriting_prompt: prompt,
            rewritten_answer: answer,
            findings,
            validation_output: verdict,
            llm_decision: LlmDecision::Initial,
        };
        self.store
            .append_iteration(thread_id, iteration)
            .await
            .map_err(to_core_error)?;
        Ok(true)
    }

    /// Step 2c: AR-feedback rewrite. Returns `Ok(true)` to keep looping.
    async fn continue_with_rewrite(&self, thread: &Thread, last: &Iteration) -> CoreResult<bool> {
        let thread_id = thread.thread_id;
        let Some(previous_answer) = last.rewritten_answer().map(str::to_string) else {
            return Err(CoreError::IllegalState {
                thread_id,
                reason: "resolved iteration missing an answer".to_string(),
            });
        };
        let findings = findings_of(last);

        let prompt = self
            .rewriter
            .ar_feedback_prompt(&thread.user_prompt, &previous_answer, &findings);

        let Some(answer) = self
            .generate_or_terminate(thread_id, &thread.config.model_id, &prompt, previous_answer.clone())
            .await?
        else {
            return Ok(false);
        };

        let Some((new_findings, verdict)) = self
            .validate_or_terminate(thread_id, &thread.config.policy_id, &answer, answer.clone())
            .await?
        else {
            return Ok(false);
        };

        let iteration = Iteration::ArFeedback {
            iteration_number: thread.iteration_counter(),
            original_answer: previous_answer,
            rewriting_prompt: prompt,
            rewritten_answer: answer,
            findings: new_findings,
            validation_output: verdict,
            llm_decision: LlmDecision::Continue,
        };
        self.store
            .append_iteration(thread_id, iteration)
            .await
            .map_err(to_core_error)?;
        Ok(true)
    }

    /// Step 2 ASK_USER branch: synthesise questions and suspend the
    /// thread. Returns `Ok(true)` on success, `Ok(false)` if an adapter
    /// failure terminated the thread instead.
    async fn suspend_for_clarification(&self, thread: &Thread, last: &Iteration) -> CoreResult<bool> {
        let thread_id = thread.thread_id;
        let Some(previous_answer) = last.rewritten_answer().map(str::to_string) else {
            return Err(CoreError::IllegalState {
                thread_id,
                reason: "resolved iteration missing an answer".to_string(),
            });
        };
        let findings = findings_of(last);

        let prompt = self
            .rewriter
            .clarification_question_prompt(&thread.user_prompt, &previous_answer, &findings);

        let Some(raw) = self
            .generate_or_terminate(thread_id, &thread.config.model_id, &prompt, previous_answer.clone())
            .await?
        else {
            return Ok(false);
        };

        let questions = parse_questions(&raw, self.rewriter.max_clarification_questions());

        let pending = Iteration::UserClarification {
            iteration_number: thread.iteration_counter(),
            original_answer: previous_answer,
            rewriting_prompt: prompt,
            rewritten_answer: None,
            qa_exchange: QaExchange {
                questions,
                answers: None,
                skipped: false,
            },
            context_augmentation: None,
            validation_findings: findings,
            validation_output: None,
        };
        self.store
            .append_iteration(thread_id, pending)
            .await
            .map_err(to_core_error)?;
        self.store
            .update_status(thread_id, ThreadStatus::AwaitingUserInput, None, None)
            .await
            .map_err(to_core_error)?;
        Ok(true)
    }

    async fn finish(
        &self,
        thread: &Thread,
        last: &Iteration,
        reason: StopReason,
        is_error: bool,
    ) -> CoreResult<()> {
        let thread_id = thread.thread_id;
        let final_response = last
            .rewritten_answer()
            .unwrap_or(&thread.user_prompt)
            .to_string();
        let warning = match reason {
            StopReason::Success => None,
            StopReason::BudgetExhausted => {
                Some("iteration budget exhausted before validation reached VALID".to_string())
            }
            StopReason::OutOfPolicy => {
                Some("the question is outside the active policy's scope".to_string())
            }
            StopReason::Error => Some("validation could not proceed".to_string()),
        };
        let status = if is_error {
            ThreadStatus::Error
        } else {
            ThreadStatus::Completed
        };
        self.store
            .update_status(thread_id, status, Some(final_response), warning)
            .await
            .map_err(to_core_error)
    }

    /// Resume a thread after a clarification answer (or skip) arrives.
    pub async fn submit_answers(
        &self,
        thread_id: ThreadId,
        answers: Option<Vec<String>>,
        skipped: bool,
    ) -> CoreResult<()> {
        let thread = self.store.get(thread_id).await.map_err(to_core_error)?;
        if thread.status != ThreadStatus::AwaitingUserInput {
            return Err(CoreError::IllegalState {
                thread_id,
                reason: "submit_answers requires AWAITING_USER_INPUT".to_string(),
            });
        }
        let pending_idx = thread.pending_clarification_index().ok_or(CoreError::IllegalState {
            thread_id,
            reason: "no pending clarification iteration".to_string(),
        })?;
        let Iteration::UserClarification {
            iteration_number,
            original_answer,
            rewriting_prompt: _,
            qa_exchange,
            context_augmentation,
            validation_findings,
            ..
        } = thread.iterations[pending_idx].clone()
        else {
            unreachable!("pending_clarification_index only points at UserClarification iterations");
        };

        if qa_exchange.questions.is_empty() {
            return Err(CoreError::IllegalState {
                thread_id,
                reason: "pending clarification iteration has no questions".to_string(),
            });
        }

        if !skipped {
            let answers = answers.as_ref().ok_or(CoreError::IllegalState {
                thread_id,
                reason: "answers required when skipped=false".to_string(),
            })?;
            if answers.len() != qa_exchange.questions.len() {
                return Err(CoreError::IllegalState {
                    thread_id,
                    reason: format!(
                        "expected {} answers, got {}",
                        qa_exchange.questions.len(),
                        answers.len()
                    ),
                });
            }
        }

        let prompt = if skipped {
            self.rewriter
                .ar_feedback_prompt(&thread.user_prompt, &original_answer, &validation_findings)
        } else {
            self.rewriter.post_clarification_prompt(
                &thread.user_prompt,
                &original_answer,
                &validation_findings,
                &qa_exchange.questions,
                answers.as_deref(),
            )
        };

        let Some(answer) = self
            .generate_or_terminate(thread_id, &thread.config.model_id, &prompt, original_answer.clone())
            .await?
        else {
            return Ok(());
        };

        let Some((findings, verdict)) = self
            .validate_or_terminate(thread_id, &thread.config.policy_id, &answer, answer.clone())
            .await?
        else {
            return Ok(());
        };

        let resolved = Iteration::UserClarification {
            iteration_number,
            original_answer,
            rewriting_prompt: prompt,
            rewritten_answer: Some(answer),
            qa_exchange: QaExchange {
                questions: qa_exchange.questions,
                answers,
                skipped,
            },
            context_augmentation,
            validation_findings: findings,
            validation_output: Some(verdict),
        };
        self.store
            .resolve_pending_clarification(thread_id, resolved)
            .await
            .map_err(to_core_error)?;
        self.store
            .update_status(thread_id, ThreadStatus::Processing, None, None)
            .await
            .map_err(to_core_error)?;

        self.drive(thread_id).await
    }

    /// Retries once (per the configured retry budget) before terminating
    /// the thread with `STOP(ERROR)`. Returns `None` once the thread has
    /// been terminated; the caller must stop processing in that case.
    async fn generate_or_terminate(
        &self,
        thread_id: ThreadId,
        model_id: &str,
        prompt: &str,
        fallback_answer: String,
    ) -> CoreResult<Option<String>> {
        let mut attempt = 0u32;
        loop {
            match self.llm.generate(model_id, prompt).await {
                Ok(answer) => return Ok(Some(answer)),
                Err(err) => {
                    tracing::warn!(%thread_id, attempt, %err, "llm adapter call failed");
                    if attempt >= self.config.adapter_retries {
                        self.store
                            .update_status(
                                thread_id,
                                ThreadStatus::Error,
                                Some(fallback_answer),
                                Some(format!("model unavailable: {err}")),
                            )
                            .await
                            .map_err(to_core_error)?;
                        return Ok(None);
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn validate_or_terminate(
        &self,
        thread_id: ThreadId,
        policy_id: &str,
        answer: &str,
        fallback_answer: String,
    ) -> CoreResult<Option<(Vec<Finding>, ValidationOutput)>> {
        let mut attempt = 0u32;
        loop {
            match self.validator.validate(policy_id, answer).await {
                Ok(result) => return Ok(Some(result)),
                Err(err) => {
                    tracing::warn!(%thread_id, attempt, %err, "validator adapter call failed");
                    if attempt >= self.config.adapter_retries {
                        self.store
                            .update_status(
                                thread_id,
                                ThreadStatus::Error,
                                Some(fallback_answer),
                                Some(format!("validator unavailable: {err}")),
                            )
                            .await
                            .map_err(to_core_error)?;
                        return Ok(None);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

fn findings_of(iteration: &Iteration) -> Vec<Finding> {
    match iteration {
        Iteration::ArFeedback { findings, .. } => findings.clone(),
        Iteration::UserClarification {
            validation_findings, ..
        } => validation_findings.clone(),
    }
}

/// Splits the LLM's question-synthesis response into individual
/// questions (one per non-empty line) and truncates to the bound the
/// Rewriter declares.
fn parse_questions(raw: &str, max: usize) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
        .filter(|line| !line.is_empty())
        .take(max)
        .collect()
}
