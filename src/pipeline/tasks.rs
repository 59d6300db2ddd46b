//! Per-stage prompt contexts
//!
//! Each function renders the context block handed to the analyst for one
//! stage of the trading cycle.

use serde_json::Value;

/// Thesis generation context (director role).
pub fn thesis_context(
    stock: &str,
    task_description: &str,
    market_data: &str,
    intelligence_context: &str,
) -> String {
    let intel_section = if intelligence_context.is_empty() {
        String::new()
    } else {
        format!(
            "\nADDITIONAL MARKET INTELLIGENCE:\n{}\n",
            intelligence_context
        )
    };

    format!(
        "Task: {}\n\n\
Stock: {}\n\
Market Data: {}\n\
{}\n\
Generate a comprehensive trading thesis for {} including:\n\
- A concise market thesis\n\
- Key technical and fundamental factors\n\
- Detailed risk assessment\n\
- Trading parameters (entry/exit points, position sizing)\n\n\
Consider all available market intelligence in your analysis.",
        task_description, stock, market_data, intel_section, stock
    )
}

/// Quantitative analysis context (quant role).
pub fn quant_context(
    stock: &str,
    thesis: &str,
    market_data: &str,
    technical_indicators: &Value,
) -> String {
    format!(
        "Stock: {}\n\
Director's Thesis: {}\n\
Market Data: {}\n\
Technical Indicators: {}\n\n\
Perform quantitative analysis for {} including:\n\
- Technical score (0-1)\n\
- Volume score (0-1)\n\
- Trend strength (0-1)\n\
- Volatility analysis\n\
- Probability score (0-1)\n\
- Key levels (support, resistance, pivot)",
        stock, thesis, market_data, technical_indicators, stock
    )
}

/// Risk assessment context (risk role).
pub fn risk_context(
    stock: &str,
    thesis: &str,
    quant_analysis: &str,
    intelligence_context: &str,
) -> String {
    let intel_section = if intelligence_context.is_empty() {
        String::new()
    } else {
        format!(
            "\nADDITIONAL MARKET INTELLIGENCE FOR RISK ASSESSMENT:\n{}\n\n\
Consider the above intelligence when evaluating risk factors.\n",
            intelligence_context
        )
    };

    format!(
        "Stock: {}\n\
Thesis: {}\n\
Quantitative Analysis: {}\n\
{}\n\
Provide comprehensive risk assessment including:\n\
1. Recommended position size\n\
2. Maximum drawdown risk\n\
3. Market risk exposure\n\
4. Overall risk score\n\n\
IMPORTANT: At the end, clearly state APPROVED or REJECTED.",
        stock, thesis, quant_analysis, intel_section
    )
}

/// Order generation context (execution role).
pub fn order_context(stock: &str, thesis: &str, risk_assessment: &str) -> String {
    format!(
        "Stock: {}\n\
Thesis: {}\n\
Risk Assessment: {}\n\n\
Generate a trade order including:\n\
1. Order type (market/limit)\n\
2. Quantity\n\
3. Entry price\n\
4. Stop loss\n\
5. Take profit\n\
6. Time in force",
        stock, thesis, risk_assessment
    )
}
