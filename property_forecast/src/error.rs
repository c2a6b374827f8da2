//! Error types for the property_forecast crate

use polars::prelude::PolarsError;
use std::fmt;
use thiserror::Error;

/// The two per-area artifacts a prediction needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Serialized predictive model
    Model,
    /// Ordered list of feature columns the model was trained on
    TrainedColumns,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => write!(f, "model"),
            ArtifactKind::TrainedColumns => write!(f, "trained columns"),
        }
    }
}

/// Custom error types for the property_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No artifact file of this kind exists for the area
    #[error("{kind} file missing for area: {area}")]
    ArtifactNotFound { kind: ArtifactKind, area: String },

    /// An artifact file exists but could not be read or decoded
    #[error("{kind} file for area {area} is unreadable: {reason}")]
    ArtifactInvalid {
        kind: ArtifactKind,
        area: String,
        reason: String,
    },

    /// Model and trained columns of an area disagree on the feature count
    #[error("Artifact mismatch for area {area}: model expects {model_features} features, trained columns list {columns}")]
    ArtifactMismatch {
        area: String,
        model_features: usize,
        columns: usize,
    },

    /// The model could not produce a prediction
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from configuration loading
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON artifact decoding
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Error from the smoothing kernels
    #[error("Math error: {0}")]
    MathError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<price_math::MathError> for ForecastError {
    fn from(err: price_math::MathError) -> Self {
        ForecastError::MathError(err.to_string())
    }
}
