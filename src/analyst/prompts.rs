//! Role definitions for the pipeline's analyst calls
//!
//! Each stage of the trading cycle speaks to the analyst through one of
//! these roles. The wording is advisory; the pipeline only depends on the
//! risk role ending with an explicit APPROVED or REJECTED statement.

/// Role configuration handed to an Analyst call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePrompt {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl RolePrompt {
    /// Render the role as a system prompt block.
    pub fn system_prompt(&self) -> String {
        format!(
            "Role: {}\nGoal: {}\n\n{}",
            self.role, self.goal, self.backstory
        )
    }
}

pub const DIRECTOR_PROMPT: RolePrompt = RolePrompt {
    role: "Trading Director",
    goal: "Orchestrate the trading process and develop comprehensive trading theses",
    backstory: "You are a Trading Director AI responsible for orchestrating the trading process.\n\
For each stock under consideration you must provide:\n\
- A concise market thesis outlining the overall market position and expected trends.\n\
- Key technical and fundamental factors influencing the stock's performance.\n\
- A detailed risk assessment highlighting potential pitfalls and mitigation strategies.\n\
- Trade parameters, including entry and exit points, position sizing and risk management guidelines.",
};

pub const QUANT_PROMPT: RolePrompt = RolePrompt {
    role: "Quantitative Analyst",
    goal: "Provide in-depth numerical analysis to support trading decisions",
    backstory: "You are a Quantitative Analyst AI tasked with providing numerical analysis to support trading decisions.\n\
Evaluate technical indicators (moving averages, RSI, volatility), apply statistical methods to historical \
patterns, calculate risk metrics and provide probability scores for trade success.\n\
Your analysis must include confidence scores for each aspect of your evaluation.",
};

pub const RISK_PROMPT: RolePrompt = RolePrompt {
    role: "Risk Manager",
    goal: "Evaluate and mitigate potential risks associated with a given trade",
    backstory: "You are a Risk Manager AI. Evaluate position sizing, potential drawdown, market risk factors \
and correlation risks for the proposed trade.\n\
Your output must be in a structured format including all relevant metrics and recommendations.\n\
IMPORTANT: At the end of your assessment, clearly state whether the risk is APPROVED or REJECTED.",
};

pub const EXECUTION_PROMPT: RolePrompt = RolePrompt {
    role: "Execution Agent",
    goal: "Generate trade orders with precision and accuracy",
    backstory: "You are a Trade Execution AI. Generate structured order parameters: stock symbol, quantity, \
order type, precise entry and exit levels, stop loss, take profit and time in force.\n\
Trades must be specified exactly; no commentary beyond the order itself.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_contains_role_and_goal() {
        let prompt = DIRECTOR_PROMPT.system_prompt();
        assert!(prompt.contains("Trading Director"));
        assert!(prompt.contains("trading theses"));
    }

    #[test]
    fn test_risk_prompt_demands_explicit_decision() {
        assert!(RISK_PROMPT.backstory.contains("APPROVED"));
        assert!(RISK_PROMPT.backstory.contains("REJECTED"));
    }
}
