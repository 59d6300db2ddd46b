//! Configuration for the trading pipeline

use std::env;

/// Runtime configuration consumed by the orchestrator.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub description: String,
    /// Instrument symbols to analyze, in batch order.
    pub stocks: Vec<String>,
    /// Maximum pipeline attempts per instrument (minimum 1).
    pub max_retries: u32,
    pub enable_intelligence: bool,
    /// Provider identifiers to register from the catalog; `None` means
    /// every catalog entry.
    pub intelligence_providers: Option<Vec<String>>,
    /// Run eligible providers concurrently during a gather.
    pub parallel_intelligence: bool,
    /// Worker pool width for parallel gathers.
    pub max_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "hedge-pipeline".to_string(),
            description: "autonomous trading analysis pipeline".to_string(),
            stocks: Vec::new(),
            max_retries: 3,
            enable_intelligence: false,
            intelligence_providers: None,
            parallel_intelligence: true,
            max_workers: 5,
        }
    }
}

impl Config {
    /// Load configuration from the environment (with `.env` support).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Ok(stocks) = env::var("STOCKS") {
            config.stocks = stocks
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(max_retries) = parse_var("MAX_RETRIES") {
            config.max_retries = max_retries;
        }

        if let Ok(flag) = env::var("ENABLE_INTELLIGENCE") {
            config.enable_intelligence = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        if let Ok(providers) = env::var("INTEL_PROVIDERS") {
            config.intelligence_providers = if providers.trim() == "all" {
                None
            } else {
                Some(
                    providers
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                )
            };
        }

        if let Ok(flag) = env::var("INTEL_PARALLEL") {
            config.parallel_intelligence = !matches!(flag.as_str(), "0" | "false" | "no");
        }

        if let Some(max_workers) = parse_var("INTEL_MAX_WORKERS") {
            config.max_workers = max_workers;
        }

        config.normalize()
    }

    /// Clamp fields to their documented minimums.
    pub fn normalize(mut self) -> Self {
        self.max_retries = self.max_retries.max(1);
        self.max_workers = self.max_workers.max(1);
        self
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_workers, 5);
        assert!(config.parallel_intelligence);
        assert!(!config.enable_intelligence);
        assert!(config.intelligence_providers.is_none());
    }

    #[test]
    fn test_normalize_clamps_minimums() {
        let config = Config {
            max_retries: 0,
            max_workers: 0,
            ..Config::default()
        }
        .normalize();

        assert_eq!(config.max_retries, 1);
        assert_eq!(config.max_workers, 1);
    }
}
