//! Trading pipeline: state machine, per-stage contexts and the cycle
//! controller.

pub mod cycle;
pub mod state_machine;
pub mod tasks;

pub use cycle::{parse_risk_decision, TradingCycle};
pub use state_machine::TradingStateMachine;
