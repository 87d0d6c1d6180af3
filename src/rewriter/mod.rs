//! Rewriter: stateless prompt construction for the three rewrite strategies.

use crate::types::Finding;

/// Builds the three prompt templates the orchestrator needs. Stateless;
/// only the WHAT of each prompt is fixed by the contract below, not the
/// exact wording.
pub trait Rewriter: Send + Sync {
    /// (a) AR-feedback rewrite: ask the LLM for a new answer that
    /// preserves intent while correcting the claims the validator
    /// rejected.
    fn ar_feedback_prompt(&self, user_prompt: &str, previous_answer: &str, findings: &[Finding]) -> String;

    /// (b) Clarification-question synthesis: ask the LLM for a bounded
    /// list of short follow-up questions that would make a SATISFIABLE
    /// claim decidable.
    fn clarification_question_prompt(
        &self,
        user_prompt: &str,
        previous_answer: &str,
        findings: &[Finding],
    ) -> String;

    /// (c) Post-clarification rewrite: ask the LLM to re-answer using
    /// the user's answers as additional context. Falls back to (a) when
    /// the questions were skipped.
    fn post_clarification_prompt(
        &self,
        user_prompt: &str,
        previous_answer: &str,
        findings: &[Finding],
        questions: &[String],
        answers: Option<&[String]>,
    ) -> String;

    /// Upper bound on the number of clarification questions synthesised
    /// by (b); enforced by truncating the LLM's response.
    fn max_clarification_questions(&self) -> usize {
        5
    }
}

/// Default template set.
#[derive(Debug, Default)]
pub struct DefaultRewriter;

impl Rewriter for DefaultRewriter {
    fn ar_feedback_prompt(&self, user_prompt: &str, previous_answer: &str, findings: &[Finding]) -> String {
        let summary = summarize_findings(findings);
        format!(
            "The user asked: \"{user_prompt}\"\n\
             Your previous answer was: \"{previous_answer}\"\n\
             An automated reasoning check found the following issues:\n{summary}\n\
             Produce a corrected answer that preserves the user's intent but removes or \
             corrects the rejected claims."
        )
    }

    fn clarification_question_prompt(
        &self,
        user_prompt: &str,
        previous_answer: &str,
        findings: &[Finding],
    ) -> String {
        let summary = summarize_findings(findings);
        format!(
            "The user asked: \"{user_prompt}\"\n\
             Your previous answer was: \"{previous_answer}\"\n\
             The claim could not be decided without more information:\n{summary}\n\
             List up to {max} short questions whose answers would let you decide the claim.",
            max = self.max_clarification_questions()
        )
    }

    fn post_clarification_prompt(
        &self,
        user_prompt: &str,
        previous_answer: &str,
        findings: &[Finding],
        questions: &[String],
        answers: Option<&[String]>,
    ) -> String {
        let Some(answers) = answers else {
            return self.ar_feedback_prompt(user_prompt, previous_answer, findings);
        };
        let qa: String = questions
            .iter()
            .zip(answers.iter())
            .map(|(q, a)| format!("- {q} -> {a}\n"))
            .collect();
        format!(
            "The user asked: \"{user_prompt}\"\n\
             Your previous answer was: \"{previous_answer}\"\n\
             The user provided the following clarifications:\n{qa}\n\
             Re-answer using this additional context."
        )
    }
}

fn summarize_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "(no findings)".to_string();
    }
    findings
        .iter()
        .map(|f| format!("- {:?}\n", f.validation_output))
        .collect()
}
