//! Weighted least-squares line fitting
//!
//! The local fit behind each LOWESS estimate. Points carry non-negative
//! weights; a point with zero weight does not influence the line.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Threshold below which the weighted spread of x is treated as zero
const DEGENERATE_SPREAD: f64 = 1e-10;

/// A fitted line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Slope of the line
    pub slope: f64,
    /// Value of the line at x = 0
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a straight line through `(x, y)` minimising the weighted squared error.
///
/// When every weighted point shares the same x (or only one point has
/// weight) the slope is undefined; the fit then degrades to a flat line at
/// the weighted mean of y.
pub fn weighted_linear_fit(x: &[f64], y: &[f64], weights: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() || x.len() != weights.len() {
        return Err(MathError::InvalidInput(format!(
            "Length mismatch: x={}, y={}, weights={}",
            x.len(),
            y.len(),
            weights.len()
        )));
    }

    if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
        return Err(MathError::InvalidInput(
            "Weights must be finite and non-negative".to_string(),
        ));
    }

    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return Err(MathError::InsufficientData(
            "All weights are zero".to_string(),
        ));
    }

    let x_mean = x.iter().zip(weights).map(|(xi, w)| xi * w).sum::<f64>() / total_weight;
    let y_mean = y.iter().zip(weights).map(|(yi, w)| yi * w).sum::<f64>() / total_weight;

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for ((&xi, &yi), &w) in x.iter().zip(y).zip(weights) {
        let dx = xi - x_mean;
        numerator += w * dx * (yi - y_mean);
        denominator += w * dx * dx;
    }

    // Spread is compared relative to the squared range so that large x
    // values (e.g. month ordinals) do not hide a real slope.
    let range = x
        .iter()
        .zip(weights)
        .filter(|(_, w)| **w > 0.0)
        .map(|(xi, _)| (xi - x_mean).abs())
        .fold(0.0_f64, f64::max);

    if denominator <= DEGENERATE_SPREAD * total_weight * range.max(1.0).powi(2) {
        return Ok(LinearFit {
            slope: 0.0,
            intercept: y_mean,
        });
    }

    let slope = numerator / denominator;
    Ok(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}
