//! # Price Math
//!
//! Numeric building blocks for price series.
//! This crate provides a weighted least-squares line fit and a LOWESS
//! (locally weighted scatterplot smoothing) implementation used to denoise
//! historical median prices.

use thiserror::Error;

pub mod lowess;
pub mod regression;

pub use lowess::Lowess;
pub use regression::{weighted_linear_fit, LinearFit};

/// Errors that can occur in price series calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for price math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::InvalidInput("frac must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: frac must be positive");
    }
}
