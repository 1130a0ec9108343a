//! Error types for sample-size inputs.

use thiserror::Error;

/// Rejected calculator input.
///
/// Every variant is final: the computation is deterministic, so there is
/// nothing to retry and no partial result to return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleSizeError {
    /// Population must contain at least one record.
    #[error("population size must be at least 1 (got {0})")]
    InvalidPopulationSize(u64),

    /// Margin of error outside the supported percentage range.
    #[error("margin of error must be between {min}% and {max}% (got {value}%)")]
    InvalidMarginOfError { value: u64, min: u8, max: u8 },

    /// Confidence level with no critical value in the lookup table.
    #[error("unsupported confidence level {0}% (expected one of 90, 95, 99)")]
    InvalidConfidenceLevel(u64),

    /// Input text that is not a whole number.
    #[error("invalid {field}: '{input}' is not a whole number")]
    Parse { field: &'static str, input: String },
}

/// Result type alias for calculator operations.
pub type Result<T> = std::result::Result<T, SampleSizeError>;
