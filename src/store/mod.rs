//! The Thread Store: the core's single shared mutable resource.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::types::{
    CoreError, Iteration, StoreError, Thread, ThreadConfig, ThreadId, ThreadStatus,
};

/// Keyed map of Thread states with an append-only iteration log.
///
/// Any implementation must guarantee that `append_iteration` and
/// `update_status` occurring on the same thread are serialised, and
/// that readers never observe a half-written iteration.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn create(&self, user_prompt: String, config: ThreadConfig) -> Thread;

    async fn get(&self, thread_id: ThreadId) -> Result<Thread, StoreError>;

    async fn append_iteration(
        &self,
        thread_id: ThreadId,
        iteration: Iteration,
    ) -> Result<(), StoreError>;

    async fn update_status(
        &self,
        thread_id: ThreadId,
        new_status: ThreadStatus,
        final_response: Option<String>,
        warning: Option<String>,
    ) -> Result<(), StoreError>;

    /// Replace the pending `UserClarification` iteration in place. The
    /// only sanctioned exception to append-only: the record is not
    /// observable-as-complete until the replacement lands, because its
    /// `rewritten_answer` was absent.
    async fn resolve_pending_clarification(
        &self,
        thread_id: ThreadId,
        resolved: Iteration,
    ) -> Result<(), StoreError>;

    async fn list(&self) -> Vec<Thread>;
}

/// In-memory `ThreadStore`, one `DashMap` entry per thread. Per-thread
/// mutations take the entry's exclusive reference for their duration,
/// giving per-key serialisation without a store-wide lock.
pub struct DefaultThreadStore {
    threads: DashMap<ThreadId, Thread>,
}

impl DefaultThreadStore {
    pub fn new() -> Self {
        Self {
            threads: DashMap::new(),
        }
    }
}

impl Default for DefaultThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadStore for DefaultThreadStore {
    async fn create(&self, user_prompt: String, config: ThreadConfig) -> Thread {
        let thread_id = ThreadId::new();
        let thread = Thread::new(thread_id, user_prompt, config);
        self.threads.insert(thread_id, thread.clone());
        tracing::info!(%thread_id, "thread created");
        thread
    }

    async fn get(&self, thread_id: ThreadId) -> Result<Thread, StoreError> {
        self.threads
            .get(&thread_id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::NotFound(thread_id))
    }

    async fn append_iteration(
        &self,
        thread_id: ThreadId,
        iteration: Iteration,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .threads
            .get_mut(&thread_id)
            .ok_or(StoreError::NotFound(thread_id))?;
        if entry.iteration_counter() >= entry.config.max_iterations {
            return Err(StoreError::BudgetExceeded(thread_id));
        }
        tracing::debug!(
            %thread_id,
            iteration_number = iteration.iteration_number(),
            "appending iteration"
        );
        entry.iterations.push(iteration);
        Ok(())
    }

    async fn update_status(
        &self,
        thread_id: ThreadId,
        new_status: ThreadStatus,
        final_response: Option<String>,
        warning: Option<String>,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .threads
            .get_mut(&thread_id)
            .ok_or(StoreError::NotFound(thread_id))?;
        if !entry.status.can_transition_to(new_status) {
            return Err(StoreError::IllegalTransition {
                thread_id,
                from: entry.status,
                to: new_status,
            });
        }
        tracing::info!(%thread_id, from = ?entry.status, to = ?new_status, "status transition");
        entry.status = new_status;
        if let Some(response) = final_response {
            entry.final_response = Some(response);
        }
        if let Some(warning) = warning {
            entry.warning_message = Some(warning);
        }
        if new_status.is_terminal() {
            entry.completed_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn resolve_pending_clarification(
        &self,
        thread_id: ThreadId,
        resolved: Iteration,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .threads
            .get_mut(&thread_id)
            .ok_or(StoreError::NotFound(thread_id))?;
        let idx = entry
            .pending_clarification_index()
            .ok_or(StoreError::NotFound(thread_id))?;
        entry.iterations[idx] = resolved;
        Ok(())
    }

    async fn list(&self) -> Vec<Thread> {
        self.threads.iter().map(|entry| entry.value().clone()).collect()
    }
}

/// Convenience alias used by the orchestrator and facade.
pub type SharedThreadStore = Arc<dyn ThreadStore>;

/// Map a `StoreError` into the public-facing `CoreError` for surfacing
/// through the external interface (used for `NotFound`/`IllegalTransition`,
/// which are programmer errors or caller misuse and always propagate).
pub fn to_core_error(err: StoreError) -> CoreError {
    match err {
        StoreError::NotFound(id) => CoreError::NotFound(id),
        StoreError::BudgetExceeded(id) => CoreError::IllegalState {
            thread_id: id,
            reason: "iteration budget exceeded".into(),
        },
        StoreError::IllegalTransition { from, to, .. } => CoreError::IllegalTransition { from, to },
    }
}
