//! Core data models for the trading pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

/// Stages of the trading cycle. External log consumers compare against the
/// literal variant names, so no serde renaming is applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    ThesisGeneration,
    QuantAnalysis,
    RiskAssessment,
    OrderGeneration,
    OrderExecution,
    Monitoring,
    Complete,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskDecision {
    Approved,
    Rejected,
}

//
// ================= Market Data =================
//

/// Snapshot of market data for a single instrument. Numeric fields are
/// unset when the upstream source could not provide them; `formatted`
/// always carries a human-readable rendering (or an explanation of why
/// the data is limited).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub stock: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub volatility: Option<f64>,
    pub variation_1m: Option<f64>,
    pub formatted: String,
    pub timestamp: DateTime<Utc>,
}

impl MarketData {
    /// Record with all numeric fields unset and an explanatory text.
    pub fn degraded(stock: &str, reason: &str) -> Self {
        Self {
            stock: stock.to_string(),
            current_price: None,
            market_cap: None,
            volume: None,
            pe_ratio: None,
            sma_20: None,
            sma_50: None,
            volatility: None,
            variation_1m: None,
            formatted: format!("Limited market data for {}. {}", stock, reason),
            timestamp: Utc::now(),
        }
    }

    /// Raw view handed to intelligence providers as opaque context.
    pub fn raw(&self) -> Value {
        json!({
            "current_price": self.current_price,
            "market_cap": self.market_cap,
            "volume": self.volume,
            "pe_ratio": self.pe_ratio,
            "technical_indicators": self.technical_indicators(),
        })
    }

    pub fn technical_indicators(&self) -> Value {
        json!({
            "sma_20": self.sma_20,
            "sma_50": self.sma_50,
            "volatility": self.volatility,
            "variation_1m": self.variation_1m,
        })
    }
}

//
// ================= Analysis Output =================
//

/// Complete analysis for a single instrument, produced by one successful
/// trading cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub id: Uuid,
    pub stock: String,
    pub thesis: String,
    pub quant_analysis: String,
    pub risk_assessment: String,
    pub risk_decision: RiskDecision,
    pub order: String,
    pub decision: String,
    pub state: Stage,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate output for one batch run across all configured instruments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingCycleResult {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub stocks: Vec<String>,
    pub task: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub analyses: Vec<StockAnalysis>,
}

impl TradingCycleResult {
    pub fn new(name: &str, description: &str, stocks: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            stocks,
            task: None,
            timestamp: Utc::now(),
            analyses: Vec::new(),
        }
    }

    pub fn add_analysis(&mut self, analysis: StockAnalysis) {
        self.analyses.push(analysis);
    }
}

//
// ================= Display =================
//

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Init => "Init",
            Stage::ThesisGeneration => "ThesisGeneration",
            Stage::QuantAnalysis => "QuantAnalysis",
            Stage::RiskAssessment => "RiskAssessment",
            Stage::OrderGeneration => "OrderGeneration",
            Stage::OrderExecution => "OrderExecution",
            Stage::Monitoring => "Monitoring",
            Stage::Complete => "Complete",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for RiskDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskDecision::Approved => "Approved",
            RiskDecision::Rejected => "Rejected",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TradingCycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        for analysis in &self.analyses {
            writeln!(f, "{}", rule)?;
            writeln!(f, "RESULT FOR {}", analysis.stock)?;
            writeln!(f, "{}", rule)?;
            writeln!(f, "\nTHESIS:\n{}", analysis.thesis)?;
            writeln!(f, "\nQUANTITATIVE ANALYSIS:\n{}", analysis.quant_analysis)?;
            writeln!(
                f,
                "\nRISK ASSESSMENT:\n{}\nRisk Decision: {}",
                analysis.risk_assessment, analysis.risk_decision
            )?;
            writeln!(f, "\nPROPOSED ORDER:\n{}", analysis.order)?;
            writeln!(f, "\nFINAL DECISION:\n{}\n", analysis.decision)?;
        }
        Ok(())
    }
}
