//! Analyst trait and implementations
//!
//! An Analyst turns a role definition plus a prompt context into free text.
//! The pipeline never interprets that text beyond the risk decision parse.

use crate::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiAnalyst;
pub use prompts::RolePrompt;

/// Trait for stage-level text generation (LLM controlled)
#[async_trait]
pub trait Analyst: Send + Sync {
    /// Generate text for a role given a prompt context. A failure here is
    /// caught at the attempt boundary of the trading cycle.
    async fn generate(&self, role: &RolePrompt, context: &str) -> Result<String>;
}

/// Scripted analyst for development & testing.
/// Keeps the pipeline functional without LLM dependency.
pub struct ScriptedAnalyst {
    responses: HashMap<String, String>,
    failing_roles: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedAnalyst {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failing_roles: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Canned response for a role (matched on `RolePrompt::role`).
    pub fn with_response(mut self, role: &str, text: &str) -> Self {
        self.responses.insert(role.to_string(), text.to_string());
        self
    }

    /// Make every call for this role fail.
    pub fn with_failure(mut self, role: &str) -> Self {
        self.failing_roles.insert(role.to_string());
        self
    }

    /// Roles invoked so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(role, _)| role.clone())
            .collect()
    }

    /// Number of invocations for one role.
    pub async fn calls_for(&self, role: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(r, _)| r == role)
            .count()
    }

    /// Prompt context of the most recent invocation for one role.
    pub async fn last_context_for(&self, role: &str) -> Option<String> {
        self.calls
            .lock()
            .await
            .iter()
            .rev()
            .find(|(r, _)| r == role)
            .map(|(_, context)| context.clone())
    }
}

impl Default for ScriptedAnalyst {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyst for ScriptedAnalyst {
    async fn generate(&self, role: &RolePrompt, context: &str) -> Result<String> {
        self.calls
            .lock()
            .await
            .push((role.role.to_string(), context.to_string()));

        if self.failing_roles.contains(role.role) {
            return Err(crate::error::TradingError::LlmError(format!(
                "scripted failure for role '{}'",
                role.role
            )));
        }

        Ok(self
            .responses
            .get(role.role)
            .cloned()
            .unwrap_or_else(|| format!("{} output", role.role)))
    }
}
