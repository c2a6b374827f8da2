//! Scaling of a growth curve by a base price

use crate::data::ForecastPoint;
use crate::series::{PricePoint, PriceSeries};

/// Turn growth factors into prices: `base_price * growth_factor` per point.
///
/// Points keep the order they were given in. No points give an empty series.
pub fn compose_forecast(points: &[ForecastPoint], base_price: f64) -> PriceSeries {
    let series: PriceSeries = points
        .iter()
        .map(|point| PricePoint::new(point.month, base_price * point.growth_factor))
        .collect();

    log::debug!(
        "Composed {} forecast points from base price {}",
        series.len(),
        base_price
    );

    series
}
