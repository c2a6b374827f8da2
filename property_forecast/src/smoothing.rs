//! Smoothing of historical price series

use crate::error::Result;
use crate::series::{PricePoint, PriceSeries};
use price_math::Lowess;

/// Default LOWESS bandwidth for historical prices
pub const DEFAULT_FRAC: f64 = 0.04;
/// Default number of robustifying iterations
pub const DEFAULT_ITERATIONS: usize = 3;

/// LOWESS smoother over a price history, using the position of each month as x
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalSmoother {
    frac: f64,
    iterations: usize,
}

impl Default for HistoricalSmoother {
    fn default() -> Self {
        Self {
            frac: DEFAULT_FRAC,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl HistoricalSmoother {
    /// Create a smoother with a bandwidth fraction in `(0, 1]`
    pub fn new(frac: f64, iterations: usize) -> Result<Self> {
        Lowess::new(frac)?;
        Ok(Self { frac, iterations })
    }

    /// Bandwidth fraction
    pub fn frac(&self) -> f64 {
        self.frac
    }

    /// Robustifying iterations
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Smooth the prices of a history.
    ///
    /// The input is sorted by month first (stable). Length and months of the
    /// result match the sorted input; only prices change.
    pub fn smooth(&self, history: &[PricePoint]) -> Result<PriceSeries> {
        if history.is_empty() {
            return Ok(PriceSeries::empty());
        }

        let mut sorted = history.to_vec();
        sorted.sort_by_key(|point| point.month);

        let prices: Vec<f64> = sorted.iter().map(|point| point.median_price).collect();
        let lowess = Lowess::new(self.frac)?.with_iterations(self.iterations);
        let fitted = lowess.fit_indexed(&prices)?;

        log::debug!(
            "Smoothed {} historical points (frac {}, k {})",
            prices.len(),
            self.frac(),
            lowess.neighbourhood_size(prices.len())
        );

        Ok(sorted
            .into_iter()
            .zip(fitted)
            .map(|(point, price)| PricePoint::new(point.month, price))
            .collect())
    }
}
