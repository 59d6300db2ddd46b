//! Trading state machine
//!
//! Validates and records transitions through the fixed pipeline graph:
//!
//! ```text
//! Init -> ThesisGeneration -> QuantAnalysis -> RiskAssessment
//!             ^                                   |       |
//!             |__________ (rejected) _____________|       | (approved)
//!             |                                           v
//!             |                    OrderGeneration -> OrderExecution
//!             |                                           |
//!             |_____________ Monitoring <________________|
//!                                |
//!                                v
//!                             Complete
//! ```

use crate::models::{RiskDecision, Stage};
use tracing::{info, warn};

/// Allowed successors per stage. Single source of truth for transition
/// legality; nothing bypasses this table.
fn successors(stage: Stage) -> &'static [Stage] {
    match stage {
        Stage::Init => &[Stage::ThesisGeneration],
        Stage::ThesisGeneration => &[Stage::QuantAnalysis],
        Stage::QuantAnalysis => &[Stage::RiskAssessment],
        Stage::RiskAssessment => &[Stage::OrderGeneration, Stage::ThesisGeneration],
        Stage::OrderGeneration => &[Stage::OrderExecution],
        Stage::OrderExecution => &[Stage::Monitoring],
        Stage::Monitoring => &[Stage::Complete, Stage::ThesisGeneration],
        Stage::Complete => &[],
    }
}

type TransitionCallback = Box<dyn Fn(Stage, Stage) + Send + Sync>;

/// State machine for managing trading cycle transitions.
pub struct TradingStateMachine {
    state: Stage,
    initial: Stage,
    history: Vec<Stage>,
    on_transition: Option<TransitionCallback>,
}

impl TradingStateMachine {
    pub fn new() -> Self {
        Self::with_initial(Stage::Init)
    }

    pub fn with_initial(initial: Stage) -> Self {
        info!(initial = %initial, "State machine initialized");
        Self {
            state: initial,
            initial,
            history: vec![initial],
            on_transition: None,
        }
    }

    /// Current stage.
    pub fn current(&self) -> Stage {
        self.state
    }

    /// Ordered snapshot of all stages visited, starting with the initial
    /// stage.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Callback invoked with (from, to) on each successful transition.
    pub fn set_transition_callback<F>(&mut self, callback: F)
    where
        F: Fn(Stage, Stage) + Send + Sync + 'static,
    {
        self.on_transition = Some(Box::new(callback));
    }

    /// Whether a transition to `target` is permitted from the current
    /// stage.
    pub fn can_transition(&self, target: Stage) -> bool {
        successors(self.state).contains(&target)
    }

    /// Transition to `target`. On an illegal transition the state is
    /// unchanged and `false` is returned.
    pub fn transition(&mut self, target: Stage) -> bool {
        if !self.can_transition(target) {
            warn!(from = %self.state, to = %target, "Invalid transition");
            return false;
        }

        let from = self.state;
        self.state = target;
        self.history.push(target);

        info!(from = %from, to = %target, "State transition");

        if let Some(callback) = &self.on_transition {
            callback(from, target);
        }

        true
    }

    /// Map a risk decision to its next stage and perform the transition.
    /// Only meaningful in RiskAssessment; elsewhere it is a no-op that
    /// returns the unchanged current stage.
    pub fn handle_risk_decision(&mut self, decision: RiskDecision) -> Stage {
        if self.state != Stage::RiskAssessment {
            warn!(current = %self.state, "Risk decision outside of RiskAssessment");
            return self.state;
        }

        let next = match decision {
            RiskDecision::Approved => {
                info!("Risk approved, proceeding to order generation");
                Stage::OrderGeneration
            }
            RiskDecision::Rejected => {
                warn!("Risk rejected, returning to thesis generation");
                Stage::ThesisGeneration
            }
        };

        self.transition(next);
        next
    }

    /// Return to the configured initial stage and truncate history to that
    /// single entry.
    pub fn reset(&mut self) {
        self.state = self.initial;
        self.history = vec![self.initial];
        info!("State machine reset");
    }

    pub fn is_complete(&self) -> bool {
        self.state == Stage::Complete
    }
}

impl Default for TradingStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_initial_state() {
        let sm = TradingStateMachine::new();
        assert_eq!(sm.current(), Stage::Init);
        assert_eq!(sm.history(), &[Stage::Init]);
    }

    #[test]
    fn test_custom_initial_state() {
        let sm = TradingStateMachine::with_initial(Stage::ThesisGeneration);
        assert_eq!(sm.current(), Stage::ThesisGeneration);
    }

    #[test]
    fn test_valid_transition() {
        let mut sm = TradingStateMachine::new();
        assert!(sm.transition(Stage::ThesisGeneration));
        assert_eq!(sm.current(), Stage::ThesisGeneration);
    }

    #[test]
    fn test_invalid_transition_leaves_state_unchanged() {
        let mut sm = TradingStateMachine::new();
        assert!(!sm.transition(Stage::OrderExecution));
        assert_eq!(sm.current(), Stage::Init);
        assert_eq!(sm.history().len(), 1);
    }

    #[test]
    fn test_complete_unreachable_from_init() {
        let mut sm = TradingStateMachine::new();
        assert!(!sm.transition(Stage::Complete));
        assert_eq!(sm.current(), Stage::Init);
    }

    #[test]
    fn test_can_transition() {
        let sm = TradingStateMachine::new();
        assert!(sm.can_transition(Stage::ThesisGeneration));
        assert!(!sm.can_transition(Stage::Complete));
        assert!(!sm.can_transition(Stage::Init));
    }

    #[test]
    fn test_full_happy_path() {
        let mut sm = TradingStateMachine::new();

        assert!(sm.transition(Stage::ThesisGeneration));
        assert!(sm.transition(Stage::QuantAnalysis));
        assert!(sm.transition(Stage::RiskAssessment));
        assert!(sm.transition(Stage::OrderGeneration));
        assert!(sm.transition(Stage::OrderExecution));
        assert!(sm.transition(Stage::Monitoring));
        assert!(sm.transition(Stage::Complete));

        assert!(sm.is_complete());
        assert_eq!(sm.history().len(), 8);
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut sm = TradingStateMachine::with_initial(Stage::Complete);
        assert!(!sm.transition(Stage::ThesisGeneration));
        assert!(!sm.transition(Stage::Init));
        assert!(sm.is_complete());
    }

    #[test]
    fn test_risk_rejection_path() {
        let mut sm = TradingStateMachine::new();
        sm.transition(Stage::ThesisGeneration);
        sm.transition(Stage::QuantAnalysis);
        sm.transition(Stage::RiskAssessment);

        let next = sm.handle_risk_decision(RiskDecision::Rejected);

        assert_eq!(next, Stage::ThesisGeneration);
        assert_eq!(sm.current(), Stage::ThesisGeneration);
    }

    #[test]
    fn test_risk_approval_path() {
        let mut sm = TradingStateMachine::new();
        sm.transition(Stage::ThesisGeneration);
        sm.transition(Stage::QuantAnalysis);
        sm.transition(Stage::RiskAssessment);

        let next = sm.handle_risk_decision(RiskDecision::Approved);

        assert_eq!(next, Stage::OrderGeneration);
        assert_eq!(sm.current(), Stage::OrderGeneration);
    }

    #[test]
    fn test_risk_decision_is_noop_outside_risk_assessment() {
        let mut sm = TradingStateMachine::new();
        sm.transition(Stage::ThesisGeneration);

        let next = sm.handle_risk_decision(RiskDecision::Approved);

        assert_eq!(next, Stage::ThesisGeneration);
        assert_eq!(sm.current(), Stage::ThesisGeneration);
        assert_eq!(sm.history().len(), 2);
    }

    #[test]
    fn test_history_tracking() {
        let mut sm = TradingStateMachine::new();
        sm.transition(Stage::ThesisGeneration);
        sm.transition(Stage::QuantAnalysis);

        assert_eq!(
            sm.history(),
            &[Stage::Init, Stage::ThesisGeneration, Stage::QuantAnalysis]
        );
    }

    #[test]
    fn test_reset() {
        let mut sm = TradingStateMachine::new();
        sm.transition(Stage::ThesisGeneration);
        sm.transition(Stage::QuantAnalysis);

        sm.reset();

        assert_eq!(sm.current(), Stage::Init);
        assert_eq!(sm.history(), &[Stage::Init]);
    }

    #[test]
    fn test_reset_to_custom_initial() {
        let mut sm = TradingStateMachine::with_initial(Stage::ThesisGeneration);
        sm.transition(Stage::QuantAnalysis);

        sm.reset();

        assert_eq!(sm.current(), Stage::ThesisGeneration);
    }

    #[test]
    fn test_transition_callback() {
        let mut sm = TradingStateMachine::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        sm.set_transition_callback(move |from, to| {
            log.lock().unwrap().push((from, to));
        });

        sm.transition(Stage::ThesisGeneration);
        sm.transition(Stage::OrderExecution); // invalid, no callback

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[(Stage::Init, Stage::ThesisGeneration)]);
    }
}
