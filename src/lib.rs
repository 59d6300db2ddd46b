//! Hedge Pipeline
//!
//! A multi-stage trading analysis pipeline that:
//! - Drives each instrument through a fixed stage graph
//!   (thesis -> quant -> risk -> order -> execution -> monitoring)
//! - Delegates stage reasoning to an external Analyst capability
//! - Retries rejected instruments within a bounded attempt budget
//! - Fans out to pluggable intelligence providers and fans in a
//!   confidence-weighted risk adjustment
//!
//! CYCLE LOOP:
//! THESIS → QUANT → RISK → APPROVED? → ORDER → EXECUTE → MONITOR → COMPLETE
//!                            └─ REJECTED → retry from THESIS

pub mod analyst;
pub mod config;
pub mod error;
pub mod intelligence;
pub mod market;
pub mod models;
pub mod orchestrator;
pub mod pipeline;

pub use error::{Result, TradingError};

// Re-export common types
pub use config::Config;
pub use intelligence::{IntelligenceRegistry, IntelligenceResult, IntelligenceType};
pub use models::*;
pub use orchestrator::TradingOrchestrator;
pub use pipeline::{TradingCycle, TradingStateMachine};
