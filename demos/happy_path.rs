//! Drives a single thread end-to-end against a pair of scripted
//! adapters, printing each iteration as it is appended. Exercises the
//! library the way an external transport layer would, without adding
//! one.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use ar_rewrite_core::prelude::*;
use async_trait::async_trait;

struct ScriptedLlm {
    answers: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmAdapter for ScriptedLlm {
    async fn generate(&self, _model_id: &str, _prompt: &str) -> Result<String, ar_rewrite_core::types::AdapterError> {
        Ok(self.answers.lock().unwrap().remove(0))
    }
}

struct ScriptedValidator {
    verdicts: Mutex<Vec<ValidationOutput>>,
}

#[async_trait]
impl ValidatorAdapter for ScriptedValidator {
    async fn validate(
        &self,
        _policy_id: &str,
        _answer: &str,
    ) -> Result<(Vec<Finding>, ValidationOutput), ar_rewrite_core::types::AdapterError> {
        let verdict = self.verdicts.lock().unwrap().remove(0);
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

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let llm = Arc::new(ScriptedLlm {
        answers: Mutex::new(vec!["5".to_string(), "4".to_string()]),
    });
    let validator = Arc::new(ScriptedValidator {
        verdicts: Mutex::new(vec![ValidationOutput::Invalid, ValidationOutput::Valid]),
    });
    let core = ReasoningCoreBuilder::new().build(llm, validator);

    let thread_id = core
        .create_thread(
            "What is 2+2?".to_string(),
            "default-model".to_string(),
            "default-policy".to_string(),
            5,
        )
        .await
        .context("thread creation should succeed with known model/policy")?;

    let thread = core
        .get_thread(thread_id)
        .await
        .context("thread was just created")?;
    println!("status: {:?}", thread.status);
    println!("final_response: {:?}", thread.final_response);
    for iteration in &thread.iterations {
        println!("{iteration:?}");
    }
    Ok(())
}
