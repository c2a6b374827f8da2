//! Joining a smoothed history with a forecast

use crate::series::PriceSeries;
use std::collections::HashSet;

/// Join a history and a forecast into one month-ordered series.
///
/// When both are non-empty, the last historical price is replaced by the
/// first forecast price so the seam is continuous, and forecast points at
/// or before the last historical month are dropped. An empty side yields
/// the other side. Within each side only the first point of a month is kept.
pub fn stitch(historic: PriceSeries, forecast: PriceSeries) -> PriceSeries {
    let historic = first_per_month(historic, "historical");
    let forecast = first_per_month(forecast, "forecast");

    let (Some(last), Some(first)) = (historic.last().copied(), forecast.first().copied()) else {
        return if historic.is_empty() { forecast } else { historic };
    };

    let mut points = historic.into_points();
    if let Some(seam) = points.last_mut() {
        seam.median_price = first.median_price;
    }

    let before = points.len();
    points.extend(
        forecast
            .into_iter()
            .filter(|point| point.month > last.month),
    );

    log::debug!(
        "Stitched {} historical and {} forecast points at {}",
        before,
        points.len() - before,
        last.month
    );

    PriceSeries::new(points)
}

fn first_per_month(series: PriceSeries, side: &str) -> PriceSeries {
    let before = series.len();
    let mut seen = HashSet::new();
    let points: Vec<_> = series
        .into_iter()
        .filter(|point| seen.insert(point.month))
        .collect();

    if points.len() < before {
        log::warn!(
            "Dropped {} {} points with a repeated month",
            before - points.len(),
            side
        );
    }

    PriceSeries::new(points)
}
