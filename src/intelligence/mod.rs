//! Intelligence provider contract and result types
//!
//! Providers are independent signal sources managed by the registry.
//! Adding a new provider requires no registry change.

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod providers;
pub mod registry;

pub use providers::{AnalystProvider, ProviderCatalog};
pub use registry::IntelligenceRegistry;

/// Types of intelligence that can be provided. External log consumers
/// compare against the literal variant names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IntelligenceType {
    Sentiment,
    Macro,
    Sector,
    Technical,
    News,
    Fundamental,
    Options,
    Insider,
    Institutional,
    Custom,
}

impl fmt::Display for IntelligenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntelligenceType::Sentiment => "Sentiment",
            IntelligenceType::Macro => "Macro",
            IntelligenceType::Sector => "Sector",
            IntelligenceType::Technical => "Technical",
            IntelligenceType::News => "News",
            IntelligenceType::Fundamental => "Fundamental",
            IntelligenceType::Options => "Options",
            IntelligenceType::Insider => "Insider",
            IntelligenceType::Institutional => "Institutional",
            IntelligenceType::Custom => "Custom",
        };
        write!(f, "{}", s)
    }
}

/// Result from one intelligence provider.
///
/// The producing provider clamps `confidence` to [0, 1] and `risk_impact`
/// to [-1, 1]; the registry does not re-clamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceResult {
    pub provider_name: String,
    pub intelligence_type: IntelligenceType,
    pub stock: String,
    pub data: Value,
    pub summary: String,
    pub confidence: f64,
    pub risk_impact: f64,
    pub timestamp: DateTime<Utc>,
}

impl IntelligenceResult {
    /// Render the result as a section of an LLM prompt context.
    pub fn to_prompt_context(&self) -> String {
        format!(
            "[{}] ({})\nSummary: {}\nConfidence: {:.0}%\nRisk Impact: {:+.2}\nDetails: {}",
            self.provider_name,
            self.intelligence_type,
            self.summary,
            self.confidence * 100.0,
            self.risk_impact,
            self.data,
        )
    }
}

/// Trait for a single intelligence provider.
///
/// Raising from `analyze` is the provider's only error-signaling
/// mechanism; the registry isolates such failures.
#[async_trait]
pub trait IntelligenceProvider: Send + Sync {
    /// Unique name of the provider.
    fn name(&self) -> &str;

    /// Type of intelligence this provider offers.
    fn intelligence_type(&self) -> IntelligenceType;

    fn description(&self) -> String {
        format!("{} intelligence provider", self.name())
    }

    /// Whether this provider can analyze the given stock.
    fn validate_stock(&self, _stock: &str) -> bool {
        true
    }

    async fn analyze(&self, stock: &str, context: &Value) -> Result<IntelligenceResult>;
}
