//! Error types for column transformations.

use thiserror::Error;

use crate::expr::ExpressionError;

/// Errors raised while validating or applying a transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Lookup and Parameter Errors ===
    /// No transformation registered under that name.
    #[error("unknown transformation: {name}")]
    UnknownTransform { name: String },

    /// Required parameter absent from the step's parameter map.
    #[error("Parameter '{label}' is required")]
    MissingParameter { label: String },

    /// Parameter present but unusable.
    #[error("invalid value for parameter '{label}': {reason}")]
    InvalidParameter { label: String, reason: String },

    // === Column Errors ===
    /// Input column absent from the table.
    #[error("Column '{column}' not found in dataframe")]
    ColumnNotFound { column: String },

    /// Numeric coercion produced nothing but nulls.
    #[error("Column '{column}' does not contain valid numeric data")]
    NoNumericData { column: String },

    /// Output column name resolved to nothing.
    #[error("Target column name cannot be empty")]
    EmptyTargetName,

    // === Application Errors ===
    /// The transformation rejected its inputs.
    #[error("{message}")]
    Invalid { message: String },

    /// Calculated column expression failed.
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl TransformError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            TransformError::ColumnNotFound {
                column: "age".to_string()
            }
            .to_string(),
            "Column 'age' not found in dataframe"
        );
        assert_eq!(
            TransformError::MissingParameter {
                label: "Target column".to_string()
            }
            .to_string(),
            "Parameter 'Target column' is required"
        );
        assert_eq!(
            TransformError::EmptyTargetName.to_string(),
            "Target column name cannot be empty"
        );
    }
}
