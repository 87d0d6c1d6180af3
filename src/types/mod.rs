//! Core data model: identifiers, threads, iterations, findings, errors.

pub mod error;
pub mod ids;
pub mod iteration;
pub mod thread;
pub mod verdict;

pub use error::{AdapterError, ConfigError, CoreError, CoreResult, StoreError};
pub use ids::ThreadId;
pub use iteration::{Iteration, LlmDecision, QaExchange};
pub use thread::{Thread, ThreadConfig, ThreadStatus, SCHEMA_VERSION};
pub use verdict::{aggregate_verdict, Claim, Finding, FindingDetails, Premise, SupportingRule, ValidationOutput};
