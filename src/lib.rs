//! Orchestration core for an automated-reasoning rewriting chatbot.
//!
//! Drives a bounded iterative validate-rewrite loop against a noisy
//! external automated-reasoning validator until it certifies an answer
//! VALID or the thread's iteration budget is exhausted. Transport,
//! authentication, UI rendering, and persistence beyond the in-memory
//! thread store are the concern of the caller.

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod orchestrator;
pub mod policy;
pub mod rewriter;
pub mod store;
pub mod types;

pub mod prelude {
    pub use crate::adapters::{FindingsOnlyValidator, LlmAdapter, ValidatorAdapter};
    pub use crate::catalog::{CatalogError, ModelCatalog, ModelInfo, PolicyCatalog, PolicyInfo, TestPromptInfo};
    pub use crate::config::CoreConfig;
    pub use crate::policy::{Decision, DecisionPolicy, DefaultDecisionPolicy, StopReason};
    pub use crate::rewriter::{DefaultRewriter, Rewriter};
    pub use crate::store::{DefaultThreadStore, SharedThreadStore, ThreadStore};
    pub use crate::types::{
        CoreError, CoreResult, Finding, FindingDetails, Iteration, LlmDecision, QaExchange, Thread,
        ThreadConfig, ThreadId, ThreadStatus, ValidationOutput,
    };
    pub use crate::{ReasoningCore, ReasoningCoreBuilder};

    #[cfg(test)]
    fn test_prelude_imports_compile() {
        fn _assert<T>() {}
        _assert::<CoreError>();
        _assert::<ReasoningCore>();
    }
}

use std::sync::Arc;

use adapters::{LlmAdapter, ValidatorAdapter};
use catalog::{CatalogError, ModelCatalog, ModelInfo, PolicyCatalog, PolicyInfo, TestPromptInfo};
use config::CoreConfig;
use orchestrator::Orchestrator;
use policy::{DecisionPolicy, DefaultDecisionPolicy};
use rewriter::{DefaultRewriter, Rewriter};
use store::{DefaultThreadStore, SharedThreadStore, ThreadStore};
use types::{ConfigError, CoreError, CoreResult, Thread, ThreadConfig, ThreadId};

/// The core's external interface, consumed by a transport layer the
/// core does not define. Wraps the Orchestrator, Thread Store, and
/// catalogs behind a single facade, in the manner of the teacher's
/// top-level runtime struct.
pub struct ReasoningCore {
    store: SharedThreadStore,
    orchestrator: Orchestrator,
    models: ModelCatalog,
    policies: PolicyCatalog,
    config: CoreConfig,
}

impl ReasoningCore {
    /// create_thread(user_prompt, model_id, policy_id, max_iterations) ->
    /// thread_id. Starts the orchestrator and returns once the initial
    /// iteration has been appended or AWAITING_USER_INPUT has been
    /// reached.
    pub async fn create_thread(
        &self,
        user_prompt: String,
        model_id: String,
        policy_id: String,
        max_iterations: u32,
    ) -> CoreResult<ThreadId> {
        if !self.models.contains(&model_id) {
            return Err(CoreError::Config(ConfigError::UnknownModel(model_id)));
        }
        if !self.policies.contains(&policy_id) {
            return Err(CoreError::Config(ConfigError::UnknownPolicy(policy_id)));
        }
        let max_iterations = self
            .config
            .validate_max_iterations(max_iterations)
            .map_err(CoreError::Config)?;

        let thread_config = ThreadConfig {
            model_id,
            policy_id,
            max_iterations,
        };
        let thread = self.store.create(user_prompt, thread_config).await;
        self.orchestrator.drive(thread.thread_id).await?;
        Ok(thread.thread_id)
    }

    pub async fn get_thread(&self, thread_id: ThreadId) -> CoreResult<Thread> {
        self.store.get(thread_id).await.map_err(store::to_core_error)
    }

    pub async fn list_threads(&self) -> Vec<Thread> {
        self.store.list().await
    }

    /// submit_answers(thread_id, answers, skipped). Valid only when
    /// status=AWAITING_USER_INPUT and the pending iteration's question
    /// list is non-empty; must supply exactly as many answers as
    /// questions when skipped=false.
    pub async fn submit_answers(
        &self,
        thread_id: ThreadId,
        answers: Option<Vec<String>>,
        skipped: bool,
    ) -> CoreResult<()> {
        self.orchestrator.submit_answers(thread_id, answers, skipped).await
    }

    pub fn list_models(&self) -> Vec<ModelInfo> {
        self.models.list()
    }

    pub fn list_policies(&self) -> Vec<PolicyInfo> {
        self.policies.list()
    }

    pub fn list_test_prompts(&self, policy_id: &str) -> Result<Vec<TestPromptInfo>, CatalogError> {
        self.policies.list_test_prompts(policy_id)
    }
}

/// Builds a `ReasoningCore` from its components, defaulting the Thread
/// Store, Decision Policy, and Rewriter to the implementations in this
/// crate while requiring the caller to supply the two external
/// adapters and the model/policy catalogs.
pub struct ReasoningCoreBuilder {
    store: SharedThreadStore,
    policy: Arc<dyn DecisionPolicy>,
    rewriter: Arc<dyn Rewriter>,
    config: CoreConfig,
    models: ModelCatalog,
    policies: PolicyCatalog,
}

impl ReasoningCoreBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DefaultThreadStore::new()),
            policy: Arc::new(DefaultDecisionPolicy),
            rewriter: Arc::new(DefaultRewriter),
            config: CoreConfig::default(),
            models: ModelCatalog::default(),
            policies: PolicyCatalog::default(),
        }
    }

    pub fn with_store(mut self, store: SharedThreadStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn DecisionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rewriter(mut self, rewriter: Arc<dyn Rewriter>) -> Self {
        self.rewriter = rewriter;
        self
    }

    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_models(mut self, models: ModelCatalog) -> Self {
        self.models = models;
        self
    }

    pub fn with_policies(mut self, policies: PolicyCatalog) -> Self {
        self.policies = policies;
        self
    }

    pub fn build(
        self,
        llm: Arc<dyn LlmAdapter>,
        validator: Arc<dyn ValidatorAdapter>,
    ) -> ReasoningCore {
        let orchestrator = Orchestrator::new(
            self.store.clone(),
            llm,
            validator,
            self.policy,
            self.rewriter,
            self.config.clone(),
        );
        ReasoningCore {
            store: self.store,
            orchestrator,
            models: self.models,
            policies: self.policies,
            config: self.config,
        }
    }
}

impl Default for ReasoningCoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
