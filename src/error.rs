// =============================================================================
// Indicator Errors
// =============================================================================
//
// Typed failures raised by the series primitives, the individual indicators,
// and the orchestrator's base validation.  Application code (config files,
// the binary) wraps these with `anyhow::Context`.

use thiserror::Error;

/// Errors produced while validating input or computing an indicator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// Non-finite series element or an unusable parameter (e.g. period 0).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Series shorter than the indicator's minimum window.
    #[error("insufficient data: need {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A required input series is absent or empty.
    #[error("missing or invalid field: {field}")]
    MissingField { field: &'static str },

    /// Parallel series of different lengths.
    #[error("data length mismatch: {field} has {actual} elements, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        actual: usize,
        expected: usize,
    },
}

impl IndicatorError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// `true` for the per-indicator "not enough history yet" case, which the
    /// orchestrator treats as non-fatal.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_reports_counts() {
        let err = IndicatorError::insufficient(50, 12);
        assert_eq!(err.to_string(), "insufficient data: need 50 points, got 12");
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn length_mismatch_names_field() {
        let err = IndicatorError::LengthMismatch {
            field: "volume",
            actual: 49,
            expected: 50,
        };
        assert!(err.to_string().contains("volume has 49 elements"));
        assert!(!err.is_insufficient_data());
    }
}
