//! # Property Forecast
//!
//! Per-area property price prediction, blended with a precomputed growth
//! forecast and joined onto a smoothed price history.
//!
//! ## Features
//!
//! - Per-area model and trained-column artifacts resolved from disk
//! - Indicator encoding of property features into a model's column space
//! - Decision tree and linear price models stored as JSON
//! - LOWESS smoothing of the historical series
//! - One continuous month-ordered series per request
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use property_forecast::config::ForecastConfig;
//! use property_forecast::features::PropertyFeatureRecord;
//! use property_forecast::pipeline::{forecast_from_disk, ForecastOutcome};
//!
//! let config = ForecastConfig::from_file("forecast.toml")?;
//! let record = PropertyFeatureRecord::new()
//!     .with_field("area_name_en", "Business Bay")
//!     .with_field("procedure_area", 88.0)
//!     .with_field("rooms_en", "1 B/R")
//!     .with_field("floor_bin", "11-20")
//!     .with_field("has_parking", true);
//!
//! match forecast_from_disk(&config, &record)? {
//!     ForecastOutcome::Series(series) => {
//!         for point in series.tail(10) {
//!             println!("{} {:.2}", point.month, point.median_price);
//!         }
//!     }
//!     ForecastOutcome::NoResult(no_result) => eprintln!("{}", no_result),
//! }
//! # Ok::<(), property_forecast::error::ForecastError>(())
//! ```

pub mod area;
pub mod artifacts;
pub mod columns;
pub mod compose;
pub mod config;
pub mod data;
pub mod encoding;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod ranges;
pub mod series;
pub mod smoothing;
pub mod stitch;

pub use area::Area;
pub use artifacts::{ArtifactResolver, ArtifactSource, MemoryArtifacts};
pub use columns::TrainedColumnSpec;
pub use config::ForecastConfig;
pub use error::{ArtifactKind, ForecastError, Result};
pub use features::{FeatureValue, PropertyFeatureRecord};
pub use models::PriceModel;
pub use pipeline::{forecast_from_disk, ForecastInputs, ForecastOutcome, NoResult, Pipeline};
pub use series::{Month, PricePoint, PriceSeries};
