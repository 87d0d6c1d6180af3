//! Validator Adapter: wraps the external automated-reasoning validator.

use async_trait::async_trait;

use crate::types::{aggregate_verdict, AdapterError, Finding, ValidationOutput};

/// A pure function from answer text (plus the active policy_id) to a
/// list of findings and a single overall verdict. The overall verdict
/// is derived by `aggregate_verdict` so the real adapter and tests
/// share one code path.
#[async_trait]
pub trait ValidatorAdapter: Send + Sync {
    async fn validate(
        &self,
        policy_id: &str,
        answer: &str,
    ) -> Result<(Vec<Finding>, ValidationOutput), AdapterError>;
}

/// Wraps any `Fn(&str) -> Vec<Finding>`-style per-answer scorer and
/// derives the overall verdict via `aggregate_verdict`, so concrete
/// validator backends only need to produce findings.
pub struct FindingsOnlyValidator<F> {
    score: F,
}

impl<F> FindingsOnlyValidator<F>
where
    F: Fn(&str, &str) -> Vec<Finding> + Send + Sync,
{
    pub fn new(score: F) -> Self {
        Self { score }
    }
}

#[async_trait]
impl<F> ValidatorAdapter for FindingsOnlyValidator<F>
where
    F: Fn(&str, &str) -> Vec<Finding> + Send + Sync,
{
    async fn validate(
        &self,
        policy_id: &str,
        answer: &str,
    ) -> Result<(Vec<Finding>, ValidationOutput), AdapterError> {
        let findings = (self.score)(policy_id, answer);
        let verdict = aggregate_verdict(&findings);
        Ok((findings, verdict))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::types::FindingDetails;
    use std::sync::Mutex;

    fn finding(output: ValidationOutput) -> Finding {
        Finding {
            validation_output: output,
            details: FindingDetails {
                premises: vec![],
                claims: vec![],
                supporting_rules: vec![],
                confidence: 1.0,
            },
        }
    }

    /// Returns queued verdicts in order, one per call; wraps each in a
    /// single matching finding so `aggregate_verdict` is a no-op.
    pub struct MockValidatorAdapter {
        verdicts: Mutex<Vec<Result<ValidationOutput, AdapterError>>>,
    }

    impl MockValidatorAdapter {
        pub fn new(verdicts: Vec<ValidationOutput>) -> Self {
            Self {
                verdicts: Mutex::new(verdicts.into_iter().rev().map(Ok).collect()),
            }
        }
    }

    #[async_trait]
    impl ValidatorAdapter for MockValidatorAdapter {
        async fn validate(
            &self,
            _policy_id: &str,
            _answer: &str,
        ) -> Result<(Vec<Finding>, ValidationOutput), AdapterError> {
            let verdict = self
                .verdicts
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok(ValidationOutput::Valid))?;
            Ok((vec![finding(verdict)], verdict))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockValidatorAdapter;
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_verdicts_in_order() {
        let adapter = MockValidatorAdapter::new(vec![ValidationOutput::Invalid, ValidationOutput::Valid]);
        let (_, v1) = adapter.validate("p", "5").await.unwrap();
        let (_, v2) = adapter.validate("p", "4").await.unwrap();
        assert_eq!(v1, ValidationOutput::Invalid);
        assert_eq!(v2, ValidationOutput::Valid);
    }

    #[tokio::test]
    async fn test_findings_only_validator_derives_verdict() {
        use crate::types::FindingDetails;
        let validator = FindingsOnlyValidator::new(|_policy, _answer| {
            vec![Finding {
                validation_output: ValidationOutput::Valid,
                details: FindingDetails {
                    premises: vec![],
                    claims: vec![],
                    supporting_rules: vec![],
                    confidence: 1.0,
                },
            }]
        });
        let (findings, verdict) = validator.validate("p", "4").await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(verdict, ValidationOutput::Valid);
    }
}
