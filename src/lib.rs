//! # Property Forecast Workspace
//!
//! Re-exports the workspace crates under one roof:
//!
//! - [`price_math`]: weighted regression and LOWESS smoothing
//! - [`property_forecast`]: per-area price prediction and series stitching
//!
//! ## Example
//!
//! ```
//! use property_forecast_workspace::property_forecast::series::{Month, PriceSeries};
//! use property_forecast_workspace::property_forecast::stitch::stitch;
//!
//! let jan = Month::new(2024, 1).unwrap();
//! let history = PriceSeries::from_pairs([(jan, 1000.0), (jan.next(), 1010.0)]);
//! let forecast = PriceSeries::from_pairs([(jan.next().next(), 1000.0)]);
//!
//! let series = stitch(history, forecast);
//! assert_eq!(series.prices(), vec![1000.0, 1000.0, 1000.0]);
//! ```

pub use price_math;
pub use property_forecast;

/// Smooth a plain price sequence with LOWESS over its positions.
///
/// # Examples
///
/// ```
/// use property_forecast_workspace::smooth_prices;
///
/// let smoothed = smooth_prices(&[1.0, 2.0, 3.0, 4.0], 1.0).unwrap();
/// assert_eq!(smoothed.len(), 4);
/// ```
pub fn smooth_prices(prices: &[f64], frac: f64) -> price_math::Result<Vec<f64>> {
    price_math::Lowess::new(frac)?.fit_indexed(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_prices_rejects_bad_frac() {
        assert!(smooth_prices(&[1.0, 2.0], 0.0).is_err());
        assert!(smooth_prices(&[], 0.5).unwrap().is_empty());
    }
}
