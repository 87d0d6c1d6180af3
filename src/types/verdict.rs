//! Validator verdicts and findings.

use serde::{Deserialize, Serialize};

/// Overall verdict on an answer, or on one finding within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutput {
    Valid,
    Invalid,
    Satisfiable,
    Impossible,
    NoTranslations,
    TranslationAmbiguous,
}

impl ValidationOutput {
    pub fn is_valid(self) -> bool {
        matches!(self, ValidationOutput::Valid)
    }
}

/// One premise fed to the validator, in natural language and in its
/// translated logical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Premise {
    pub natural_language: String,
    pub logic: String,
}

/// One claim the validator checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub natural_language: String,
    pub logic: String,
}

/// One rule the validator drew on to reach its verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportingRule {
    pub identifier: String,
    pub natural_language: String,
}

/// Structured detail behind a single Finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingDetails {
    pub premises: Vec<Premise>,
    pub claims: Vec<Claim>,
    pub supporting_rules: Vec<SupportingRule>,
    /// 0..1; stored but never consulted by the decision policy.
    pub confidence: f32,
}

/// One atomic verdict from the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub validation_output: ValidationOutput,
    pub details: FindingDetails,
}

/// Derive the overall verdict from a set of findings, per the rule order
/// the validator adapter is required to apply: VALID only if every
/// finding is VALID; otherwise INVALID beats IMPOSSIBLE beats
/// SATISFIABLE; NO_TRANSLATIONS only if every finding is NO_TRANSLATIONS;
/// anything else falls through to TRANSLATION_AMBIGUOUS.
pub fn aggregate_verdict(findings: &[Finding]) -> ValidationOutput {
    if findings.is_empty() || findings.iter().all(|f| f.validation_output == ValidationOutput::Valid) {
        return ValidationOutput::Valid;
    }
    if findings
        .iter()
        .any(|f| f.validation_output == ValidationOutput::Invalid)
    {
        return ValidationOutput::Invalid;
    }
    if findings
        .iter()
        .any(|f| f.validation_output == ValidationOutput::Impossible)
    {
        return ValidationOutput::Impossible;
    }
    if findings
        .iter()
        .any(|f| f.validation_output == ValidationOutput::Satisfiable)
    {
        return ValidationOutput::Satisfiable;
    }
    if findings
        .iter()
        .all(|f| f.validation_output == ValidationOutput::NoTranslations)
    {
        return ValidationOutput::NoTranslations;
    }
    ValidationOutput::TranslationAmbiguous
}
