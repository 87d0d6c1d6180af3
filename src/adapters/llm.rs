//! LLM Adapter: wraps the external text-generation service.

use async_trait::async_trait;

use crate::types::AdapterError;

/// A pure function from prompt text (plus model_id) to answer text.
///
/// Transport failures map to `AdapterError`; the orchestrator retries
/// once before giving up on the thread.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String, AdapterError>;
}
