//! Batch orchestrator
//!
//! Thin consumer of the trading cycle: loops the configured instruments,
//! collects completed analyses and keeps going when an instrument fails.

use crate::analyst::Analyst;
use crate::config::Config;
use crate::intelligence::{IntelligenceProvider, IntelligenceRegistry, ProviderCatalog};
use crate::market::MarketDataSource;
use crate::models::TradingCycleResult;
use crate::pipeline::TradingCycle;
use std::sync::Arc;
use tracing::{info, warn};

/// Coordinates trading cycles across all configured instruments.
pub struct TradingOrchestrator {
    config: Config,
    analyst: Arc<dyn Analyst>,
    market_data: Arc<dyn MarketDataSource>,
    intelligence: Option<IntelligenceRegistry>,
    results: TradingCycleResult,
}

impl TradingOrchestrator {
    /// Orchestrator with the standard provider catalog.
    pub fn new(
        config: Config,
        analyst: Arc<dyn Analyst>,
        market_data: Arc<dyn MarketDataSource>,
    ) -> Self {
        Self::with_catalog(config, analyst, market_data, &ProviderCatalog::standard())
    }

    /// Orchestrator with an explicit provider catalog.
    pub fn with_catalog(
        config: Config,
        analyst: Arc<dyn Analyst>,
        market_data: Arc<dyn MarketDataSource>,
        catalog: &ProviderCatalog,
    ) -> Self {
        let config = config.normalize();

        let intelligence = if config.enable_intelligence {
            Some(build_registry(&config, catalog, Arc::clone(&analyst)))
        } else {
            None
        };

        let results =
            TradingCycleResult::new(&config.name, &config.description, config.stocks.clone());

        info!(
            name = %config.name,
            stocks = ?config.stocks,
            intelligence = intelligence.is_some(),
            "Orchestrator initialized"
        );

        Self {
            config,
            analyst,
            market_data,
            intelligence,
            results,
        }
    }

    /// Register a custom provider, creating the registry on demand.
    pub fn add_provider(&mut self, provider: Arc<dyn IntelligenceProvider>) -> &mut Self {
        self.intelligence
            .get_or_insert_with(IntelligenceRegistry::default)
            .register(provider);
        self
    }

    /// Remove a provider by name. Returns true iff it existed.
    pub fn remove_provider(&mut self, name: &str) -> bool {
        match self.intelligence.as_mut() {
            Some(registry) => registry.unregister(name),
            None => false,
        }
    }

    /// Registered provider names, in registration order.
    pub fn list_providers(&self) -> Vec<String> {
        self.intelligence
            .as_ref()
            .map(|registry| registry.list_providers())
            .unwrap_or_default()
    }

    /// Execute one trading cycle per configured instrument.
    ///
    /// A failed instrument yields a logged reason and no analysis; the
    /// batch always continues with the remaining instruments.
    pub async fn run(&mut self, task: &str) -> TradingCycleResult {
        info!(task = task, "Starting trading cycle batch");

        self.results.task = Some(task.to_string());
        self.results.analyses.clear();

        for stock in self.config.stocks.clone() {
            info!(stock = %stock, "Processing");

            let mut cycle = TradingCycle::new(
                Arc::clone(&self.analyst),
                Arc::clone(&self.market_data),
                self.intelligence.as_ref(),
                self.config.max_retries,
            );

            match cycle.run(&stock, task).await {
                Ok(analysis) => {
                    self.results.add_analysis(analysis);
                    info!(stock = %stock, "Completed");
                }
                Err(e) => {
                    warn!(stock = %stock, error = %e, "Failed to complete analysis");
                }
            }
        }

        self.results.clone()
    }

    pub fn results(&self) -> &TradingCycleResult {
        &self.results
    }

    /// Discard accumulated analyses for a fresh batch.
    pub fn reset(&mut self) {
        self.results = TradingCycleResult::new(
            &self.config.name,
            &self.config.description,
            self.config.stocks.clone(),
        );
        info!("Orchestrator reset");
    }
}

fn build_registry(
    config: &Config,
    catalog: &ProviderCatalog,
    analyst: Arc<dyn Analyst>,
) -> IntelligenceRegistry {
    let mut registry =
        IntelligenceRegistry::new(config.parallel_intelligence, config.max_workers);

    let identifiers = config
        .intelligence_providers
        .clone()
        .unwrap_or_else(|| catalog.identifiers());

    for id in identifiers {
        match catalog.build(&id, Arc::clone(&analyst)) {
            Some(provider) => {
                registry.register(provider);
            }
            None => warn!(provider = %id, "Unknown intelligence provider"),
        }
    }

    registry
}
