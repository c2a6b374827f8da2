//! Linear regression model

use crate::error::{ForecastError, Result};
use crate::models::{check_width, PriceModel};
use serde::{Deserialize, Serialize};

/// `price = intercept + sum(coefficients[i] * x[i])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Price when every feature is zero
    pub intercept: f64,
    /// One coefficient per trained column
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Create a new linear model
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        let model = Self {
            intercept,
            coefficients,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check that all parameters are finite
    pub fn validate(&self) -> Result<()> {
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::ValidationError(
                "Linear model parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl PriceModel for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_width(self.n_features(), features)?;

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn name(&self) -> &str {
        "Linear Regression"
    }
}
