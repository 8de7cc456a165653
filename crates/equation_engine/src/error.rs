//! Error types for the equation engine

use canvas_model::ModelError;
use thiserror::Error;

/// Errors that terminate a single solve or transform attempt
#[derive(Error, Debug)]
pub enum EngineError {
    /// No container holds an `=`
    #[error("No equation found. Add an equals sign (=) to a container.")]
    NoEquationFound,

    /// Splitting on `=` did not give two sides
    #[error("Invalid equation format")]
    InvalidEquationFormat,

    /// More than one unknown in a single equation
    #[error("Cannot solve equations with multiple variables")]
    UnsupportedVariableCount,

    /// Conversion between units of different (or unknown) categories
    #[error("Cannot convert between {from} and {to} - different unit types")]
    UnitCategoryMismatch { from: String, to: String },

    /// The bounded root search found no sample within tolerance
    #[error("No solution found in range")]
    NoSolutionInRange,

    /// The arithmetic evaluator rejected its input
    #[error("Error evaluating expression: {0}")]
    EvaluationFailure(String),

    /// No eligible equation container, or an incomplete operation container
    #[error("Cannot apply operation: {0}")]
    TransformationTargetMissing(String),

    /// The operation container does not start with a supported operator
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Workspace lookup or mutation failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Settings file could not be read or written
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings file is not valid JSON
    #[error("Settings format error: {0}")]
    SettingsFormat(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_names_both_units() {
        let err = EngineError::UnitCategoryMismatch {
            from: "km".to_string(),
            to: "lb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot convert between km and lb - different unit types"
        );
    }

    #[test]
    fn test_error_from_model() {
        let err: EngineError = ModelError::LastContainerRemovalRefused.into();
        assert!(matches!(err, EngineError::Model(_)));
        assert_eq!(err.to_string(), "Cannot remove the last container");
    }
}
