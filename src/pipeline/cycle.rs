//! Trading cycle controller
//!
//! Drives exactly one instrument through the pipeline, bounded by a
//! maximum attempt count. A rejection or a collaborator failure consumes
//! one attempt; attempts never reuse stage output from earlier attempts.

use crate::analyst::{prompts, Analyst};
use crate::error::TradingError;
use crate::intelligence::IntelligenceRegistry;
use crate::market::MarketDataSource;
use crate::models::{RiskDecision, Stage, StockAnalysis};
use crate::pipeline::state_machine::TradingStateMachine;
use crate::pipeline::tasks;
use crate::Result;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Parse a risk decision out of free-form risk assessment text.
///
/// Lexical, not semantic: a case-insensitive substring search for
/// "reject" (which also matches "rejected").
pub fn parse_risk_decision(risk_assessment: &str) -> RiskDecision {
    if risk_assessment.to_lowercase().contains("reject") {
        RiskDecision::Rejected
    } else {
        RiskDecision::Approved
    }
}

enum AttemptOutcome {
    Completed(StockAnalysis),
    Rejected,
}

/// Orchestrates a complete trading cycle for a single instrument.
pub struct TradingCycle<'a> {
    analyst: Arc<dyn Analyst>,
    market_data: Arc<dyn MarketDataSource>,
    intelligence: Option<&'a IntelligenceRegistry>,
    max_retries: u32,
    state_machine: TradingStateMachine,
}

impl<'a> TradingCycle<'a> {
    pub fn new(
        analyst: Arc<dyn Analyst>,
        market_data: Arc<dyn MarketDataSource>,
        intelligence: Option<&'a IntelligenceRegistry>,
        max_retries: u32,
    ) -> Self {
        Self {
            analyst,
            market_data,
            intelligence,
            max_retries: max_retries.max(1),
            state_machine: TradingStateMachine::new(),
        }
    }

    pub fn state_machine(&self) -> &TradingStateMachine {
        &self.state_machine
    }

    /// Execute the cycle for one instrument.
    ///
    /// Returns the completed analysis, or `RetriesExhausted` once
    /// `max_retries` attempts have been consumed by rejections or
    /// collaborator failures.
    pub async fn run(&mut self, stock: &str, task: &str) -> Result<StockAnalysis> {
        info!(stock = stock, "Starting trading cycle");
        self.state_machine.reset();
        let mut retry_count = 0;

        while retry_count < self.max_retries {
            match self.attempt(stock, task).await {
                Ok(AttemptOutcome::Completed(analysis)) => return Ok(analysis),
                Ok(AttemptOutcome::Rejected) => {
                    retry_count += 1;
                    warn!(
                        stock = stock,
                        retry = retry_count,
                        max_retries = self.max_retries,
                        "Risk rejected"
                    );
                }
                Err(e) => {
                    retry_count += 1;
                    error!(
                        stock = stock,
                        retry = retry_count,
                        error = %e,
                        "Error in trading cycle"
                    );
                }
            }
        }

        error!(
            stock = stock,
            max_retries = self.max_retries,
            "Trading cycle failed"
        );
        Err(TradingError::RetriesExhausted {
            stock: stock.to_string(),
            attempts: self.max_retries,
        })
    }

    /// Advance the machine to ThesisGeneration at the start of an attempt.
    ///
    /// After a rejection the machine already sits at ThesisGeneration, so
    /// the redundant transition is skipped rather than attempted and
    /// failed. After a mid-attempt collaborator failure the machine may be
    /// stranded in a stage with no path back; the attempt then restarts
    /// from the initial stage.
    fn enter_thesis_stage(&mut self) {
        if self.state_machine.current() == Stage::ThesisGeneration {
            return;
        }
        if !self.state_machine.transition(Stage::ThesisGeneration) {
            self.state_machine.reset();
            self.state_machine.transition(Stage::ThesisGeneration);
        }
    }

    async fn gather_intelligence(&self, stock: &str, context: &Value) -> String {
        match self.intelligence {
            Some(registry) => {
                info!(stock = stock, "Gathering intelligence");
                registry.aggregated_context(stock, context).await
            }
            None => String::new(),
        }
    }

    async fn attempt(&mut self, stock: &str, task: &str) -> Result<AttemptOutcome> {
        self.enter_thesis_stage();

        let market_data = self.market_data.fetch(stock).await;

        let intel_context = self
            .gather_intelligence(
                stock,
                &json!({ "market_data": market_data.raw(), "task": task }),
            )
            .await;

        let thesis = self
            .analyst
            .generate(
                &prompts::DIRECTOR_PROMPT,
                &tasks::thesis_context(stock, task, &market_data.formatted, &intel_context),
            )
            .await?;
        info!(stock = stock, "Thesis generated");

        self.state_machine.transition(Stage::QuantAnalysis);
        let quant_analysis = self
            .analyst
            .generate(
                &prompts::QUANT_PROMPT,
                &tasks::quant_context(
                    stock,
                    &thesis,
                    &market_data.formatted,
                    &market_data.technical_indicators(),
                ),
            )
            .await?;
        info!(stock = stock, "Quant analysis completed");

        self.state_machine.transition(Stage::RiskAssessment);
        let risk_assessment = self
            .analyst
            .generate(
                &prompts::RISK_PROMPT,
                &tasks::risk_context(stock, &thesis, &quant_analysis, &intel_context),
            )
            .await?;
        let risk_decision = parse_risk_decision(&risk_assessment);
        info!(stock = stock, decision = %risk_decision, "Risk assessment completed");

        self.state_machine.handle_risk_decision(risk_decision);
        if risk_decision == RiskDecision::Rejected {
            return Ok(AttemptOutcome::Rejected);
        }

        // handle_risk_decision already moved us to OrderGeneration.
        let order = self
            .analyst
            .generate(
                &prompts::EXECUTION_PROMPT,
                &tasks::order_context(stock, &thesis, &risk_assessment),
            )
            .await?;
        info!(stock = stock, "Order generated");

        // Simulated execution: bookkeeping-only stage advances.
        self.state_machine.transition(Stage::OrderExecution);
        self.state_machine.transition(Stage::Monitoring);
        self.state_machine.transition(Stage::Complete);

        Ok(AttemptOutcome::Completed(StockAnalysis {
            id: Uuid::new_v4(),
            stock: stock.to_string(),
            thesis,
            quant_analysis,
            risk_assessment,
            risk_decision,
            order,
            decision: format!("APPROVED - Order execution simulated for {}", stock),
            state: self.state_machine.current(),
            timestamp: Utc::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyst::ScriptedAnalyst;
    use crate::intelligence::{IntelligenceProvider, IntelligenceResult, IntelligenceType};
    use crate::market::StaticMarketDataSource;
    use async_trait::async_trait;

    fn market() -> Arc<dyn MarketDataSource> {
        Arc::new(StaticMarketDataSource)
    }

    #[test]
    fn test_parse_risk_decision() {
        assert_eq!(parse_risk_decision("Trade APPROVED"), RiskDecision::Approved);
        assert_eq!(parse_risk_decision("REJECTED"), RiskDecision::Rejected);
        assert_eq!(parse_risk_decision("I reject this"), RiskDecision::Rejected);
        assert_eq!(parse_risk_decision("Rejected: too risky"), RiskDecision::Rejected);
        assert_eq!(parse_risk_decision("all clear"), RiskDecision::Approved);
        assert_eq!(parse_risk_decision(""), RiskDecision::Approved);
    }

    #[tokio::test]
    async fn test_happy_path_produces_complete_analysis() {
        let analyst = Arc::new(
            ScriptedAnalyst::new()
                .with_response("Trading Director", "Long NVDA on datacenter demand")
                .with_response("Risk Manager", "Risk acceptable. APPROVED"),
        );
        let mut cycle = TradingCycle::new(Arc::clone(&analyst) as Arc<dyn Analyst>, market(), None, 3);

        let analysis = cycle.run("NVDA", "swing trade").await.unwrap();

        assert_eq!(analysis.stock, "NVDA");
        assert_eq!(analysis.risk_decision, RiskDecision::Approved);
        assert_eq!(analysis.state, Stage::Complete);
        assert_eq!(analysis.thesis, "Long NVDA on datacenter demand");
        assert!(cycle.state_machine().is_complete());
        assert_eq!(cycle.state_machine().history().len(), 8);
    }

    #[tokio::test]
    async fn test_persistent_rejection_exhausts_exact_retry_budget() {
        let analyst = Arc::new(
            ScriptedAnalyst::new().with_response("Risk Manager", "Too volatile. REJECTED"),
        );
        let mut cycle = TradingCycle::new(Arc::clone(&analyst) as Arc<dyn Analyst>, market(), None, 3);

        let result = cycle.run("NVDA", "swing trade").await;

        assert!(matches!(
            result,
            Err(TradingError::RetriesExhausted { attempts: 3, .. })
        ));
        // Every attempt re-runs thesis and quant; nothing is cached.
        assert_eq!(analyst.calls_for("Trading Director").await, 3);
        assert_eq!(analyst.calls_for("Quantitative Analyst").await, 3);
        assert_eq!(analyst.calls_for("Risk Manager").await, 3);
        assert_eq!(analyst.calls_for("Execution Agent").await, 0);
    }

    #[tokio::test]
    async fn test_collaborator_failure_consumes_retry_budget() {
        let analyst =
            Arc::new(ScriptedAnalyst::new().with_failure("Quantitative Analyst"));
        let mut cycle = TradingCycle::new(Arc::clone(&analyst) as Arc<dyn Analyst>, market(), None, 2);

        let result = cycle.run("NVDA", "swing trade").await;

        assert!(matches!(
            result,
            Err(TradingError::RetriesExhausted { attempts: 2, .. })
        ));
        assert_eq!(analyst.calls_for("Trading Director").await, 2);
    }

    #[tokio::test]
    async fn test_max_retries_clamped_to_one() {
        let analyst = Arc::new(
            ScriptedAnalyst::new().with_response("Risk Manager", "REJECTED"),
        );
        let mut cycle = TradingCycle::new(Arc::clone(&analyst) as Arc<dyn Analyst>, market(), None, 0);

        let result = cycle.run("NVDA", "swing trade").await;

        assert!(matches!(
            result,
            Err(TradingError::RetriesExhausted { attempts: 1, .. })
        ));
        assert_eq!(analyst.calls_for("Trading Director").await, 1);
    }

    struct BullishProvider;

    #[async_trait]
    impl IntelligenceProvider for BullishProvider {
        fn name(&self) -> &str {
            "bullish_signal"
        }

        fn intelligence_type(&self) -> IntelligenceType {
            IntelligenceType::Custom
        }

        async fn analyze(
            &self,
            stock: &str,
            _context: &Value,
        ) -> crate::Result<IntelligenceResult> {
            Ok(IntelligenceResult {
                provider_name: "bullish_signal".to_string(),
                intelligence_type: IntelligenceType::Custom,
                stock: stock.to_string(),
                data: json!({}),
                summary: "Institutional accumulation detected".to_string(),
                confidence: 0.9,
                risk_impact: 0.4,
                timestamp: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_intelligence_context_reaches_thesis_and_risk_prompts() {
        let analyst = Arc::new(
            ScriptedAnalyst::new().with_response("Risk Manager", "APPROVED"),
        );
        let mut registry = IntelligenceRegistry::default();
        registry.register(Arc::new(BullishProvider));

        let mut cycle = TradingCycle::new(
            Arc::clone(&analyst) as Arc<dyn Analyst>,
            market(),
            Some(&registry),
            3,
        );
        cycle.run("NVDA", "swing trade").await.unwrap();

        let thesis_context = analyst.last_context_for("Trading Director").await.unwrap();
        assert!(thesis_context.contains("Institutional accumulation detected"));

        let risk_context = analyst.last_context_for("Risk Manager").await.unwrap();
        assert!(risk_context.contains("Institutional accumulation detected"));
    }

    #[tokio::test]
    async fn test_no_registry_means_no_intelligence_section() {
        let analyst = Arc::new(
            ScriptedAnalyst::new().with_response("Risk Manager", "APPROVED"),
        );
        let mut cycle = TradingCycle::new(Arc::clone(&analyst) as Arc<dyn Analyst>, market(), None, 1);
        cycle.run("NVDA", "swing trade").await.unwrap();

        let thesis_context = analyst.last_context_for("Trading Director").await.unwrap();
        assert!(!thesis_context.contains("ADDITIONAL MARKET INTELLIGENCE"));
    }

    #[tokio::test]
    async fn test_rejection_then_approval_recovers() {
        // First risk call rejects, second approves: the machine re-enters
        // ThesisGeneration without an illegal transition and completes.
        struct FlipFlopAnalyst {
            risk_calls: tokio::sync::Mutex<u32>,
        }

        #[async_trait]
        impl Analyst for FlipFlopAnalyst {
            async fn generate(
                &self,
                role: &prompts::RolePrompt,
                _context: &str,
            ) -> crate::Result<String> {
                if role.role == "Risk Manager" {
                    let mut calls = self.risk_calls.lock().await;
                    *calls += 1;
                    if *calls == 1 {
                        return Ok("REJECTED".to_string());
                    }
                    return Ok("APPROVED".to_string());
                }
                Ok(format!("{} output", role.role))
            }
        }

        let analyst = Arc::new(FlipFlopAnalyst {
            risk_calls: tokio::sync::Mutex::new(0),
        });
        let mut cycle = TradingCycle::new(analyst, market(), None, 3);

        let analysis = cycle.run("NVDA", "swing trade").await.unwrap();
        assert_eq!(analysis.risk_decision, RiskDecision::Approved);
        assert!(cycle.state_machine().is_complete());
    }
}
