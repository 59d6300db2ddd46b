//! Market data collaborator
//!
//! Sources never fail: any upstream problem collapses into a degraded
//! record whose `formatted` text explains what happened.

use crate::models::MarketData;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Trait for market data retrieval
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch a snapshot for the symbol. Must not fail; degraded records
    /// are acceptable.
    async fn fetch(&self, symbol: &str) -> MarketData;
}

/// Format market data as a readable block for prompt contexts.
pub fn format_market_data(data: &MarketData) -> String {
    fn fmt(value: Option<f64>, prefix: &str, suffix: &str, decimals: usize) -> String {
        match value {
            Some(v) => format!("{}{:.prec$}{}", prefix, v, suffix, prec = decimals),
            None => "N/A".to_string(),
        }
    }

    format!(
        "Market Data for {}:\n\
- Current Price: {}\n\
- Market Cap: {}\n\
- Volume: {}\n\
- P/E Ratio: {}\n\
- SMA 20 days: {}\n\
- SMA 50 days: {}\n\
- Annualized Volatility: {}\n\
- 1 Month Change: {}",
        data.stock,
        fmt(data.current_price, "$", "", 2),
        fmt(data.market_cap, "$", "", 0),
        fmt(data.volume, "", "", 0),
        fmt(data.pe_ratio, "", "", 2),
        fmt(data.sma_20, "$", "", 2),
        fmt(data.sma_50, "$", "", 2),
        fmt(data.volatility, "", "%", 2),
        fmt(data.variation_1m, "", "%", 2),
    )
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    current_price: Option<f64>,
    market_cap: Option<f64>,
    volume: Option<f64>,
    pe_ratio: Option<f64>,
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    volatility: Option<f64>,
    variation_1m: Option<f64>,
}

/// HTTP-backed market data source against a quote API.
pub struct ApiMarketDataSource {
    client: Client,
    base_url: String,
}

impl ApiMarketDataSource {
    /// Build from `MARKET_DATA_BASE_URL`; `None` when unconfigured.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("MARKET_DATA_BASE_URL").ok()?;

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .ok()?;

        Some(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn quote(&self, symbol: &str) -> Result<QuoteResponse, String> {
        let url = format!("{}/api/v1/market/quote/{}", self.base_url, symbol);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("quote request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("quote API returned {}", status));
        }

        response
            .json::<QuoteResponse>()
            .await
            .map_err(|e| format!("invalid quote response: {}", e))
    }
}

#[async_trait]
impl MarketDataSource for ApiMarketDataSource {
    async fn fetch(&self, symbol: &str) -> MarketData {
        match self.quote(symbol).await {
            Ok(quote) => {
                let mut data = MarketData {
                    stock: symbol.to_string(),
                    current_price: quote.current_price,
                    market_cap: quote.market_cap,
                    volume: quote.volume,
                    pe_ratio: quote.pe_ratio,
                    sma_20: quote.sma_20,
                    sma_50: quote.sma_50,
                    volatility: quote.volatility,
                    variation_1m: quote.variation_1m,
                    formatted: String::new(),
                    timestamp: Utc::now(),
                };
                data.formatted = format_market_data(&data);

                info!(symbol = symbol, "Market data retrieved");
                data
            }
            Err(reason) => {
                warn!(symbol = symbol, reason = %reason, "Market data degraded");
                MarketData::degraded(symbol, &reason)
            }
        }
    }
}

/// Fixed-value source for development & testing.
pub struct StaticMarketDataSource;

#[async_trait]
impl MarketDataSource for StaticMarketDataSource {
    async fn fetch(&self, symbol: &str) -> MarketData {
        let mut data = MarketData {
            stock: symbol.to_string(),
            current_price: Some(150.50),
            market_cap: Some(2_500_000_000_000.0),
            volume: Some(1_000_000.0),
            pe_ratio: Some(32.5),
            sma_20: Some(148.20),
            sma_50: Some(144.75),
            volatility: Some(28.4),
            variation_1m: Some(4.2),
            formatted: String::new(),
            timestamp: Utc::now(),
        };
        data.formatted = format_market_data(&data);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_is_fully_populated() {
        let source = StaticMarketDataSource;
        let data = source.fetch("AAPL").await;

        assert_eq!(data.stock, "AAPL");
        assert!(data.current_price.is_some());
        assert!(data.formatted.contains("Market Data for AAPL"));
        assert!(data.formatted.contains("$150.50"));
    }

    #[test]
    fn test_format_handles_missing_fields() {
        let data = MarketData::degraded("TSLA", "unavailable");
        let formatted = format_market_data(&data);

        assert!(formatted.contains("Market Data for TSLA"));
        assert!(formatted.contains("Current Price: N/A"));
    }
}
