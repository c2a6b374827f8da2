//! LOWESS smoothing
//!
//! Locally weighted linear regression in the style of Cleveland (1979):
//! every output point is the value of a weighted line fitted through its `k`
//! nearest neighbours, weighted by the tricube of the scaled distance. After
//! the first pass, a number of robustifying passes down-weight points with
//! large residuals using bisquare weights.

use crate::regression::weighted_linear_fit;
use crate::{MathError, Result};
use statrs::statistics::{Data, Median};

/// Median absolute residual, relative to the mean magnitude of y, below
/// which the fit is considered exact
const CONVERGENCE_TOLERANCE: f64 = 1e-7;

/// LOWESS smoother configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lowess {
    /// Fraction of the data used for each local fit
    frac: f64,
    /// Number of robustifying iterations after the initial fit
    iterations: usize,
}

impl Default for Lowess {
    fn default() -> Self {
        Self {
            frac: 2.0 / 3.0,
            iterations: 3,
        }
    }
}

impl Lowess {
    /// Create a smoother using `frac` of the points for each local fit
    pub fn new(frac: f64) -> Result<Self> {
        if !(frac > 0.0 && frac <= 1.0) {
            return Err(MathError::InvalidInput(format!(
                "frac must be in (0, 1], got {}",
                frac
            )));
        }

        Ok(Self {
            frac,
            ..Self::default()
        })
    }

    /// Set the number of robustifying iterations (0 disables them)
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Bandwidth fraction
    pub fn frac(&self) -> f64 {
        self.frac
    }

    /// Number of robustifying iterations
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of neighbours used for each local fit over `n` points.
    ///
    /// Clamped to `[2, n]` so that tiny fractions on short series still
    /// produce a defined fit.
    pub fn neighbourhood_size(&self, n: usize) -> usize {
        let k = (self.frac * n as f64 + 1e-10).floor() as usize;
        k.max(2).min(n)
    }

    /// Smooth `y` using its position (0, 1, 2, ...) as the x coordinate
    pub fn fit_indexed(&self, y: &[f64]) -> Result<Vec<f64>> {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        self.fit(&x, y)
    }

    /// Smooth `y` against `x`. `x` must be sorted ascending.
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "x and y must have the same length ({} vs {})",
                x.len(),
                y.len()
            )));
        }

        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "LOWESS input contains non-finite values".to_string(),
            ));
        }

        if x.windows(2).any(|w| w[1] < w[0]) {
            return Err(MathError::InvalidInput(
                "x values must be sorted ascending".to_string(),
            ));
        }

        let n = x.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let k = self.neighbourhood_size(n);
        let mut robustness = vec![1.0; n];
        let mut fitted = local_fit(x, y, k, &robustness)?;

        let mean_abs_y = y.iter().map(|v| v.abs()).sum::<f64>() / n as f64;

        for iteration in 0..self.iterations {
            let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, b)| a - b).collect();
            let scale = Data::new(residuals.iter().map(|r| r.abs()).collect::<Vec<f64>>()).median();

            // Residuals at rounding level leave nothing to robustify
            if scale <= CONVERGENCE_TOLERANCE * mean_abs_y {
                log::debug!("LOWESS converged after {} robustifying passes", iteration);
                break;
            }

            for (weight, residual) in robustness.iter_mut().zip(&residuals) {
                *weight = bisquare(residual / (6.0 * scale));
            }

            fitted = local_fit(x, y, k, &robustness)?;
        }

        Ok(fitted)
    }
}

/// One pass of local linear fits with the given robustness weights
fn local_fit(x: &[f64], y: &[f64], k: usize, robustness: &[f64]) -> Result<Vec<f64>> {
    let n = x.len();
    let mut fitted = Vec::with_capacity(n);
    let mut left = 0;

    for i in 0..n {
        // Slide the window right while the next point is closer than the first one
        while left + k < n && x[left + k] - x[i] < x[i] - x[left] {
            left += 1;
        }
        let right = left + k - 1;
        let radius = (x[i] - x[left]).max(x[right] - x[i]);

        let weights: Vec<f64> = (left..=right)
            .map(|j| {
                let distance = if radius > 0.0 {
                    (x[j] - x[i]).abs() / radius
                } else {
                    0.0
                };
                tricube(distance) * robustness[j]
            })
            .collect();

        let value = match weighted_linear_fit(&x[left..=right], &y[left..=right], &weights) {
            Ok(line) => line.value_at(x[i]),
            // Every neighbour was robustified away; keep the observation
            Err(MathError::InsufficientData(_)) => y[i],
            Err(e) => return Err(e),
        };
        fitted.push(value);
    }

    Ok(fitted)
}

/// Tricube kernel on a distance already scaled to the window radius
fn tricube(distance: f64) -> f64 {
    if distance >= 1.0 {
        0.0
    } else {
        (1.0 - distance.powi(3)).powi(3)
    }
}

/// Bisquare kernel used for robustness weights
fn bisquare(u: f64) -> f64 {
    if u.abs() >= 1.0 {
        0.0
    } else {
        (1.0 - u * u).powi(2)
    }
}
