//! LLM-backed intelligence providers
//!
//! One configurable provider struct covers the standard signal sources;
//! each catalog entry is the same struct with its own role, focus and
//! weighting. Custom providers only need the `IntelligenceProvider` trait.

use crate::analyst::{Analyst, RolePrompt};
use crate::intelligence::{IntelligenceProvider, IntelligenceResult, IntelligenceType};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const SUMMARY_LIMIT: usize = 500;

const BULLISH_WORDS: &[&str] = &["bullish", "positive", "optimistic", "strong", "buy"];
const BEARISH_WORDS: &[&str] = &["bearish", "negative", "pessimistic", "weak", "sell"];

/// Lexical sentiment score in [-1, 1] from bullish/bearish word counts.
fn lexical_score(text: &str) -> f64 {
    let lower = text.to_lowercase();

    let bullish = BULLISH_WORDS.iter().filter(|w| lower.contains(**w)).count() as f64;
    let bearish = BEARISH_WORDS.iter().filter(|w| lower.contains(**w)).count() as f64;

    let total = bullish + bearish;
    if total == 0.0 {
        return 0.0;
    }
    (bullish - bearish) / total
}

/// Confidence dampening for suspiciously short or rambling responses.
fn length_factor(text: &str) -> f64 {
    if text.len() < 50 {
        0.6
    } else if text.len() > 2000 {
        0.8
    } else {
        1.0
    }
}

/// Intelligence provider that delegates its analysis to an Analyst role.
pub struct AnalystProvider {
    name: String,
    intelligence_type: IntelligenceType,
    role: RolePrompt,
    focus: &'static str,
    base_confidence: f64,
    risk_weight: f64,
    analyst: Arc<dyn Analyst>,
}

impl AnalystProvider {
    pub fn new(
        name: &str,
        intelligence_type: IntelligenceType,
        role: RolePrompt,
        focus: &'static str,
        base_confidence: f64,
        risk_weight: f64,
        analyst: Arc<dyn Analyst>,
    ) -> Self {
        Self {
            name: name.to_string(),
            intelligence_type,
            role,
            focus,
            base_confidence,
            risk_weight,
            analyst,
        }
    }

    pub fn sentiment(analyst: Arc<dyn Analyst>) -> Self {
        Self::new(
            "sentiment_analyzer",
            IntelligenceType::Sentiment,
            SENTIMENT_ROLE,
            "Overall market sentiment: social media tone, analyst consensus, \
institutional positioning and retail activity. State whether sentiment is \
improving, declining or stable.",
            0.7,
            0.3,
            analyst,
        )
    }

    pub fn macroeconomic(analyst: Arc<dyn Analyst>) -> Self {
        Self::new(
            "macro_analyzer",
            IntelligenceType::Macro,
            MACRO_ROLE,
            "Macroeconomic backdrop: interest rates, inflation, currency moves \
and policy events that could affect this stock over the next quarter.",
            0.65,
            0.4,
            analyst,
        )
    }

    pub fn sector(analyst: Arc<dyn Analyst>) -> Self {
        Self::new(
            "sector_analyzer",
            IntelligenceType::Sector,
            SECTOR_ROLE,
            "Sector dynamics: competitive position, peer valuations, supply \
chain pressures and rotation flows into or out of the sector.",
            0.65,
            0.3,
            analyst,
        )
    }

    pub fn technical(analyst: Arc<dyn Analyst>) -> Self {
        Self::new(
            "technical_analyzer",
            IntelligenceType::Technical,
            TECHNICAL_ROLE,
            "Advanced technicals: trend structure, momentum, key support and \
resistance levels, volume profile and any notable chart patterns.",
            0.75,
            0.5,
            analyst,
        )
    }

    pub fn news(analyst: Arc<dyn Analyst>) -> Self {
        Self::new(
            "news_analyzer",
            IntelligenceType::News,
            NEWS_ROLE,
            "Recent news and events: earnings, product announcements, legal or \
regulatory developments and their likely market impact.",
            0.6,
            0.4,
            analyst,
        )
    }
}

#[async_trait]
impl IntelligenceProvider for AnalystProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn intelligence_type(&self) -> IntelligenceType {
        self.intelligence_type
    }

    fn description(&self) -> String {
        format!("{} ({})", self.name, self.intelligence_type)
    }

    async fn analyze(&self, stock: &str, context: &Value) -> Result<IntelligenceResult> {
        debug!(provider = %self.name, stock = stock, "Running analysis");

        let prompt = format!(
            "Analyze {} with the following focus.\n\n{}\n\nContext: {}",
            stock, self.focus, context
        );

        let text = self.analyst.generate(&self.role, &prompt).await?;

        let score = lexical_score(&text);
        let risk_impact = (score * self.risk_weight).clamp(-1.0, 1.0);
        let confidence = (self.base_confidence * length_factor(&text)).clamp(0.0, 1.0);

        let summary = if text.len() > SUMMARY_LIMIT {
            let cut = text
                .char_indices()
                .take_while(|(i, _)| *i < SUMMARY_LIMIT)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}...", &text[..cut])
        } else {
            text.clone()
        };

        Ok(IntelligenceResult {
            provider_name: self.name.clone(),
            intelligence_type: self.intelligence_type,
            stock: stock.to_string(),
            data: json!({
                "raw_analysis": text,
                "score": score,
            }),
            summary,
            confidence,
            risk_impact,
            timestamp: Utc::now(),
        })
    }
}

const SENTIMENT_ROLE: RolePrompt = RolePrompt {
    role: "Sentiment Analyst",
    goal: "Analyze market sentiment and provide actionable insights",
    backstory: "You are a Market Sentiment Analyst AI specializing in gauging sentiment from social media, \
analyst ratings, institutional flows and options activity. Provide sentiment scores and clear reasoning.",
};

const MACRO_ROLE: RolePrompt = RolePrompt {
    role: "Macro Analyst",
    goal: "Assess macroeconomic factors relevant to a trade",
    backstory: "You are a Macroeconomic Analyst AI. Evaluate rates, inflation, growth and policy developments \
and translate them into their likely effect on the instrument under analysis.",
};

const SECTOR_ROLE: RolePrompt = RolePrompt {
    role: "Sector Analyst",
    goal: "Evaluate sector dynamics and competitive positioning",
    backstory: "You are a Sector Analyst AI. Compare the company against its peers, track rotation flows and \
industry-level catalysts, and summarize the sector backdrop for the trade.",
};

const TECHNICAL_ROLE: RolePrompt = RolePrompt {
    role: "Technical Analyst",
    goal: "Provide advanced technical analysis",
    backstory: "You are a Technical Analyst AI. Read trend structure, momentum, volume and key levels from the \
provided indicators and describe the technically likely path.",
};

const NEWS_ROLE: RolePrompt = RolePrompt {
    role: "News Analyst",
    goal: "Summarize market-moving news and events",
    backstory: "You are a News Analyst AI. Identify recent headlines and events for the instrument and assess \
their likely market impact, flagging anything that changes the risk picture.",
};

type ProviderCtor = Box<dyn Fn(Arc<dyn Analyst>) -> Arc<dyn IntelligenceProvider> + Send + Sync>;

/// Explicit mapping of provider identifiers to constructors.
///
/// Passed to the orchestrator at construction time; there is no global
/// provider state.
pub struct ProviderCatalog {
    ctors: HashMap<String, ProviderCtor>,
    order: Vec<String>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self {
            ctors: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Catalog with the five standard analyst-backed providers.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog
            .add("sentiment", |analyst| {
                Arc::new(AnalystProvider::sentiment(analyst))
            })
            .add("macro", |analyst| {
                Arc::new(AnalystProvider::macroeconomic(analyst))
            })
            .add("sector", |analyst| Arc::new(AnalystProvider::sector(analyst)))
            .add("technical", |analyst| {
                Arc::new(AnalystProvider::technical(analyst))
            })
            .add("news", |analyst| Arc::new(AnalystProvider::news(analyst)));
        catalog
    }

    pub fn add<F>(&mut self, id: &str, ctor: F) -> &mut Self
    where
        F: Fn(Arc<dyn Analyst>) -> Arc<dyn IntelligenceProvider> + Send + Sync + 'static,
    {
        if !self.ctors.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.ctors.insert(id.to_string(), Box::new(ctor));
        self
    }

    /// Build a provider by identifier; `None` for unknown identifiers.
    pub fn build(
        &self,
        id: &str,
        analyst: Arc<dyn Analyst>,
    ) -> Option<Arc<dyn IntelligenceProvider>> {
        self.ctors.get(id).map(|ctor| ctor(analyst))
    }

    /// Known identifiers, in catalog order.
    pub fn identifiers(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyst::ScriptedAnalyst;

    #[test]
    fn test_lexical_score() {
        assert!(lexical_score("Strong bullish setup, buy the dip") > 0.0);
        assert!(lexical_score("Bearish breakdown, sell now") < 0.0);
        assert_eq!(lexical_score("no signal words here at all"), 0.0);
    }

    #[tokio::test]
    async fn test_provider_clamps_risk_impact() {
        let analyst = Arc::new(
            ScriptedAnalyst::new()
                .with_response("Sentiment Analyst", "bullish positive optimistic strong buy"),
        );
        let provider = AnalystProvider::new(
            "overweighted",
            IntelligenceType::Sentiment,
            SENTIMENT_ROLE,
            "focus",
            0.7,
            5.0,
            analyst,
        );

        let result = provider.analyze("NVDA", &Value::Null).await.unwrap();
        assert!(result.risk_impact <= 1.0);
        assert!(result.confidence <= 1.0);
        assert!(result.confidence >= 0.0);
    }

    #[tokio::test]
    async fn test_provider_propagates_analyst_failure() {
        let analyst = Arc::new(ScriptedAnalyst::new().with_failure("Sentiment Analyst"));
        let provider = AnalystProvider::sentiment(analyst);

        assert!(provider.analyze("NVDA", &Value::Null).await.is_err());
    }

    #[tokio::test]
    async fn test_provider_truncates_summary() {
        let long = "bullish ".repeat(200);
        let analyst = Arc::new(ScriptedAnalyst::new().with_response("News Analyst", &long));
        let provider = AnalystProvider::news(analyst);

        let result = provider.analyze("NVDA", &Value::Null).await.unwrap();
        assert!(result.summary.len() <= SUMMARY_LIMIT + 3);
        assert!(result.summary.ends_with("..."));
    }

    #[test]
    fn test_standard_catalog_identifiers() {
        let catalog = ProviderCatalog::standard();
        assert_eq!(
            catalog.identifiers(),
            vec!["sentiment", "macro", "sector", "technical", "news"]
        );
    }

    #[test]
    fn test_catalog_build() {
        let catalog = ProviderCatalog::standard();
        let analyst: Arc<dyn Analyst> = Arc::new(ScriptedAnalyst::new());

        let provider = catalog.build("technical", Arc::clone(&analyst));
        assert!(provider.is_some());
        assert_eq!(provider.unwrap().name(), "technical_analyzer");

        assert!(catalog.build("astrology", analyst).is_none());
    }
}
