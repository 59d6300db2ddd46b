//! Intelligence registry
//!
//! Holds provider instances, fans analysis requests out over a bounded
//! worker pool and fans the results back in as an aggregated prompt
//! context plus a confidence-weighted risk adjustment.
//!
//! The provider map is caller-synchronized: mutation takes `&mut self`
//! and therefore cannot race an in-flight gather.

use crate::intelligence::{IntelligenceProvider, IntelligenceResult, IntelligenceType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const DEFAULT_MAX_WORKERS: usize = 5;

struct ProviderEntry {
    provider: Arc<dyn IntelligenceProvider>,
    enabled: bool,
}

/// Registry for managing intelligence providers.
pub struct IntelligenceRegistry {
    providers: HashMap<String, ProviderEntry>,
    // Registration order; overwrites keep the original position.
    order: Vec<String>,
    parallel: bool,
    max_workers: usize,
}

impl IntelligenceRegistry {
    pub fn new(parallel: bool, max_workers: usize) -> Self {
        Self {
            providers: HashMap::new(),
            order: Vec::new(),
            parallel,
            max_workers: max_workers.max(1),
        }
    }

    /// Register a provider, replacing any provider with the same name.
    /// Returns the registry for chaining.
    pub fn register(&mut self, provider: Arc<dyn IntelligenceProvider>) -> &mut Self {
        let name = provider.name().to_string();

        if self.providers.contains_key(&name) {
            warn!(provider = %name, "Provider already registered, replacing");
        } else {
            self.order.push(name.clone());
        }

        info!(
            provider = %name,
            intelligence_type = %provider.intelligence_type(),
            "Registered provider"
        );
        self.providers.insert(name, ProviderEntry { provider, enabled: true });
        self
    }

    /// Remove a provider by name. Returns true iff it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        if self.providers.remove(name).is_some() {
            self.order.retain(|n| n != name);
            info!(provider = name, "Unregistered provider");
            true
        } else {
            false
        }
    }

    /// Enable a provider for future gather calls.
    pub fn enable(&mut self, name: &str) -> bool {
        match self.providers.get_mut(name) {
            Some(entry) => {
                entry.enabled = true;
                info!(provider = name, "Enabled provider");
                true
            }
            None => false,
        }
    }

    /// Disable a provider without removing it.
    pub fn disable(&mut self, name: &str) -> bool {
        match self.providers.get_mut(name) {
            Some(entry) => {
                entry.enabled = false;
                info!(provider = name, "Disabled provider");
                true
            }
            None => false,
        }
    }

    /// All registered provider names, in registration order.
    pub fn list_providers(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Enabled provider names, in registration order.
    pub fn list_enabled(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| self.providers.get(*name).is_some_and(|e| e.enabled))
            .cloned()
            .collect()
    }

    /// Remove all providers.
    pub fn clear(&mut self) {
        self.providers.clear();
        self.order.clear();
        info!("Registry cleared");
    }

    /// Eligible providers for one gather call, in registration order.
    fn select(
        &self,
        stock: &str,
        type_filter: Option<&[IntelligenceType]>,
    ) -> Vec<Arc<dyn IntelligenceProvider>> {
        self.order
            .iter()
            .filter_map(|name| self.providers.get(name))
            .filter(|entry| entry.enabled)
            .map(|entry| Arc::clone(&entry.provider))
            .filter(|provider| provider.validate_stock(stock))
            .filter(|provider| {
                type_filter
                    .map(|types| types.contains(&provider.intelligence_type()))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Gather results from all eligible providers.
    ///
    /// Sequential mode preserves registration order; parallel mode returns
    /// results in completion order, which is non-deterministic. A provider
    /// failure is isolated and excluded from the returned list.
    pub async fn gather(
        &self,
        stock: &str,
        context: &Value,
        type_filter: Option<&[IntelligenceType]>,
    ) -> Vec<IntelligenceResult> {
        let selected = self.select(stock, type_filter);

        if selected.is_empty() {
            warn!(stock = stock, "No enabled providers for gathering insights");
            return Vec::new();
        }

        let results = if self.parallel && selected.len() > 1 {
            self.gather_parallel(selected, stock, context).await
        } else {
            self.gather_sequential(selected, stock, context).await
        };

        info!(stock = stock, count = results.len(), "Gathered insights");
        results
    }

    async fn gather_sequential(
        &self,
        providers: Vec<Arc<dyn IntelligenceProvider>>,
        stock: &str,
        context: &Value,
    ) -> Vec<IntelligenceResult> {
        let mut results = Vec::with_capacity(providers.len());

        for provider in providers {
            match provider.analyze(stock, context).await {
                Ok(result) => {
                    debug!(provider = provider.name(), stock = stock, "Provider completed");
                    results.push(result);
                }
                Err(e) => {
                    error!(provider = provider.name(), error = %e, "Provider failed");
                }
            }
        }

        results
    }

    async fn gather_parallel(
        &self,
        providers: Vec<Arc<dyn IntelligenceProvider>>,
        stock: &str,
        context: &Value,
    ) -> Vec<IntelligenceResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks: JoinSet<(String, crate::Result<IntelligenceResult>)> = JoinSet::new();

        for provider in providers {
            let semaphore = Arc::clone(&semaphore);
            let stock = stock.to_string();
            let context = context.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only ends
                // with a permit.
                let _permit = semaphore.acquire_owned().await;
                let name = provider.name().to_string();
                let result = provider.analyze(&stock, &context).await;
                (name, result)
            });
        }

        // Full join: completion order, wait for every submitted invocation.
        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(result))) => {
                    debug!(provider = %name, stock = stock, "Provider completed");
                    results.push(result);
                }
                Ok((name, Err(e))) => {
                    error!(provider = %name, error = %e, "Provider failed");
                }
                Err(e) => {
                    error!(error = %e, "Provider task aborted");
                }
            }
        }

        results
    }

    /// Aggregated context string for LLM prompts.
    pub async fn aggregated_context(&self, stock: &str, context: &Value) -> String {
        let insights = self.gather(stock, context, None).await;

        if insights.is_empty() {
            return "No additional market intelligence available.".to_string();
        }

        let rule = "=".repeat(50);
        let mut sections = vec![rule.clone(), "ADDITIONAL MARKET INTELLIGENCE".to_string(), rule.clone()];
        sections.extend(insights.iter().map(|i| i.to_prompt_context()));
        sections.push(rule);
        sections.join("\n")
    }

    /// Confidence-weighted average risk impact over all gathered results.
    /// Exactly 0.0 when nothing is gathered or the confidence sum is zero.
    pub async fn risk_adjustment(&self, stock: &str) -> f64 {
        let insights = self.gather(stock, &Value::Null, None).await;

        if insights.is_empty() {
            return 0.0;
        }

        let total_weight: f64 = insights.iter().map(|i| i.confidence).sum();
        if total_weight == 0.0 {
            return 0.0;
        }

        let weighted_sum: f64 = insights.iter().map(|i| i.risk_impact * i.confidence).sum();
        weighted_sum / total_weight
    }
}

impl Default for IntelligenceRegistry {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_WORKERS)
    }
}
