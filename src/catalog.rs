//! In-memory catalogs backing the `list_models`/`list_policies`/
//! `list_test_prompts` pass-through endpoints and `create_thread`'s
//! model/policy validation.

use std::collections::HashMap;
use thiserror::Error;

/// One entry in the model catalog.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// One entry in the policy catalog.
#[derive(Debug, Clone)]
pub struct PolicyInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// One test prompt registered under a policy.
#[derive(Debug, Clone)]
pub struct TestPromptInfo {
    pub test_case_id: String,
    pub guard_content: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown model_id: {0}")]
    UnknownModel(String),
    #[error("unknown policy_id: {0}")]
    UnknownPolicy(String),
}

/// Registry of available LLM backends.
pub struct ModelCatalog {
    models: HashMap<String, ModelInfo>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self {
            models: models.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn get(&self, model_id: &str) -> Result<&ModelInfo, CatalogError> {
        self.models
            .get(model_id)
            .ok_or_else(|| CatalogError::UnknownModel(model_id.to_string()))
    }

    pub fn list(&self) -> Vec<ModelInfo> {
        self.models.values().cloned().collect()
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(vec![ModelInfo {
            id: "default-model".to_string(),
            name: "Default Model".to_string(),
        }])
    }
}

/// Registry of available AR policies, each with its own test prompts.
pub struct PolicyCatalog {
    policies: HashMap<String, PolicyInfo>,
    test_prompts: HashMap<String, Vec<TestPromptInfo>>,
}

impl PolicyCatalog {
    pub fn new(policies: Vec<PolicyInfo>, test_prompts: HashMap<String, Vec<TestPromptInfo>>) -> Self {
        Self {
            policies: policies.into_iter().map(|p| (p.id.clone(), p)).collect(),
            test_prompts,
        }
    }

    pub fn get(&self, policy_id: &str) -> Result<&PolicyInfo, CatalogError> {
        self.policies
            .get(policy_id)
            .ok_or_else(|| CatalogError::UnknownPolicy(policy_id.to_string()))
    }

    pub fn list(&self) -> Vec<PolicyInfo> {
        self.policies.values().cloned().collect()
    }

    pub fn contains(&self, policy_id: &str) -> bool {
        self.policies.contains_key(policy_id)
    }

    pub fn list_test_prompts(&self, policy_id: &str) -> Result<Vec<TestPromptInfo>, CatalogError> {
        if !self.contains(policy_id) {
            return Err(CatalogError::UnknownPolicy(policy_id.to_string()));
        }
        Ok(self.test_prompts.get(policy_id).cloned().unwrap_or_default())
    }
}

impl Default for PolicyCatalog {
    fn default() -> Self {
        Self::new(
            vec![PolicyInfo {
                id: "default-policy".to_string(),
                name: "Default Policy".to_string(),
                description: "Permissive default policy".to_string(),
            }],
            HashMap::new(),
        )
    }
}
