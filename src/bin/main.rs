use hedge_pipeline::{
    analyst::{Analyst, GeminiAnalyst, ScriptedAnalyst},
    config::Config,
    market::{ApiMarketDataSource, MarketDataSource, StaticMarketDataSource},
    orchestrator::TradingOrchestrator,
};
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Hedge pipeline starting");

    let mut config = Config::from_env();
    if config.stocks.is_empty() {
        config.stocks = vec!["NVDA".to_string(), "TSLA".to_string()];
    }

    let analyst: Arc<dyn Analyst> = match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => Arc::new(GeminiAnalyst::new(key)),
        _ => {
            info!("GEMINI_API_KEY not set, using scripted analyst");
            Arc::new(
                ScriptedAnalyst::new()
                    .with_response("Risk Manager", "Risk within tolerance. APPROVED"),
            )
        }
    };

    let market_data: Arc<dyn MarketDataSource> = match ApiMarketDataSource::from_env() {
        Some(source) => Arc::new(source),
        None => {
            info!("MARKET_DATA_BASE_URL not set, using static market data");
            Arc::new(StaticMarketDataSource)
        }
    };

    let mut orchestrator = TradingOrchestrator::new(config, analyst, market_data);

    info!(
        providers = ?orchestrator.list_providers(),
        "Running trading cycle batch"
    );

    let results = orchestrator
        .run("Analyze for a medium-term swing entry with strict risk limits")
        .await;

    println!("\n=== TRADING CYCLE RESULTS ===");
    println!(
        "{} / {} instrument(s) completed\n",
        results.analyses.len(),
        results.stocks.len()
    );
    println!("{}", results);

    Ok(())
}
