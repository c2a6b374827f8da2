//! Runs one request against the checked-in fixture artifacts.
//!
//! ```text
//! RUST_LOG=debug cargo run -p property_forecast --example fixture_forecast
//! ```

use property_forecast::config::ForecastConfig;
use property_forecast::features::PropertyFeatureRecord;
use property_forecast::pipeline::{forecast_from_disk, ForecastOutcome};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let config = ForecastConfig::from_file(config_path)?;

    println!("Areas with models:");
    for area in config.resolver().available_areas()? {
        println!("  {}", area);
    }

    for area in ["Business Bay", "Dubai_Marina", "Jumeirah Village Circle"] {
        let record = PropertyFeatureRecord::new()
            .with_field(&config.area_field, area)
            .with_field("procedure_area", 95.0)
            .with_field("rooms_en", "1 B/R")
            .with_field("floor_bin", "11-20")
            .with_field("has_parking", true)
            .with_field("metro", true);

        println!("\n{}", area);
        match forecast_from_disk(&config, &record)? {
            ForecastOutcome::Series(series) => {
                for point in series.tail(6) {
                    println!("  {} {:>10.2}", point.month, point.median_price);
                }
            }
            ForecastOutcome::NoResult(no_result) => println!("  {}", no_result),
        }
    }

    Ok(())
}
