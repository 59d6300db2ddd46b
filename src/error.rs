//! Error types for the trading pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TradingError>;

#[derive(Error, Debug)]
pub enum TradingError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Intelligence provider error: {0}")]
    ProviderError(String),

    /// Terminal failure for a single instrument. The batch orchestrator
    /// treats this as "no analysis produced" and moves on.
    #[error("Trading cycle failed for {stock} after {attempts} attempts")]
    RetriesExhausted { stock: String, attempts: u32 },

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
