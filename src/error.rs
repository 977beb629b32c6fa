//! Error types for the moving transform engines

use thiserror::Error;

/// Result type alias for moving transform operations
pub type Result<T> = std::result::Result<T, MovingTransformError>;

/// Fatal errors raised by the aggregation engines.
///
/// Conditions a caller can recover from (a window that is too wide, kinds
/// that do not apply to a method) are reported as
/// [`TransformWarning`](crate::engine::TransformWarning)s instead.
#[derive(Error, Debug)]
pub enum MovingTransformError {
    #[error("Unknown aggregation kind: {0}")]
    UnknownAggregationKind(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    #[error("Table has no time variable")]
    MissingTimeVariable,

    #[error("Duplicate variable name: {0}")]
    DuplicateVariable(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for MovingTransformError {
    fn from(err: polars::error::PolarsError) -> Self {
        MovingTransformError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for MovingTransformError {
    fn from(err: serde_json::Error) -> Self {
        MovingTransformError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for MovingTransformError {
    fn from(err: ndarray::ShapeError) -> Self {
        MovingTransformError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MovingTransformError::UnknownAggregationKind("skew".to_string());
        assert_eq!(err.to_string(), "Unknown aggregation kind: skew");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = MovingTransformError::InvalidParameter {
            name: "window_width".to_string(),
            value: "1".to_string(),
            reason: "must be at least 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter: window_width = 1, must be at least 2"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: MovingTransformError = json_err.into();
        assert!(matches!(err, MovingTransformError::SerializationError(_)));
    }
}
