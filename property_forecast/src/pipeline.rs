//! End-to-end price forecast for one property
//!
//! A request runs through: artifact lookup, feature encoding, point
//! prediction, forecast composition, then joins the composed forecast with
//! the smoothed history of the area. Missing or broken artifacts and failed
//! predictions end the request with a [`NoResult`] instead of an error.

use crate::area::Area;
use crate::artifacts::ArtifactSource;
use crate::compose::compose_forecast;
use crate::config::ForecastConfig;
use crate::data::{DataLoader, ForecastTable, HistoricalTable};
use crate::encoding::FeatureEncoder;
use crate::error::{ArtifactKind, ForecastError, Result};
use crate::features::{PropertyFeatureRecord, AREA_FIELD};
use crate::models::predict_point;
use crate::ranges::InputRanges;
use crate::series::{PricePoint, PriceSeries};
use crate::smoothing::HistoricalSmoother;
use crate::stitch::stitch;
use std::fmt;

/// Tables a request reads, loaded once per call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastInputs {
    /// Growth factors per area
    pub forecast: ForecastTable,
    /// Price history per area
    pub historical: HistoricalTable,
    /// Optional observed input ranges per area
    pub ranges: Option<InputRanges>,
}

impl ForecastInputs {
    /// Create inputs without a ranges table
    pub fn new(forecast: ForecastTable, historical: HistoricalTable) -> Self {
        Self {
            forecast,
            historical,
            ranges: None,
        }
    }

    /// Attach a ranges table
    pub fn with_ranges(mut self, ranges: InputRanges) -> Self {
        self.ranges = Some(ranges);
        self
    }

    /// Read every configured table from disk
    pub fn load(config: &ForecastConfig) -> Result<Self> {
        let forecast = DataLoader::forecast_table_from_csv(config.resolve(&config.forecast_table))?;
        let historical =
            DataLoader::historical_table_from_csv(config.resolve(&config.historical_table))?;
        // Ranges only feed warnings, so an unreadable table is dropped
        let ranges = config.ranges_table.as_ref().and_then(|path| {
            let path = config.resolve(path);
            match InputRanges::from_csv(&path) {
                Ok(ranges) => Some(ranges),
                Err(e) => {
                    log::warn!("Ignoring input ranges table {}: {}", path.display(), e);
                    None
                }
            }
        });

        log::debug!(
            "Loaded {} forecast rows and {} historical rows",
            forecast.len(),
            historical.len()
        );

        Ok(Self {
            forecast,
            historical,
            ranges,
        })
    }
}

/// Why a request produced no series
#[derive(Debug, Clone, PartialEq)]
pub enum NoResultReason {
    /// The request does not name an area
    MissingArea { field: String },
    /// No artifact of this kind exists for the area
    ArtifactNotFound(ArtifactKind),
    /// An artifact exists but cannot be used
    ArtifactInvalid { kind: ArtifactKind, reason: String },
    /// Model and trained columns disagree on the feature count
    ArtifactMismatch { model_features: usize, columns: usize },
    /// The model failed on the encoded input
    PredictionFailed(String),
    /// The artifact source itself failed
    SourceFailed(String),
}

/// A request that ended without a series
#[derive(Debug, Clone, PartialEq)]
pub struct NoResult {
    /// Requested area, if the request named one
    pub area: Option<Area>,
    /// What went wrong
    pub reason: NoResultReason,
}

impl NoResult {
    fn for_area(area: &Area, error: ForecastError) -> Self {
        let reason = match error {
            ForecastError::ArtifactNotFound { kind, .. } => NoResultReason::ArtifactNotFound(kind),
            ForecastError::ArtifactInvalid { kind, reason, .. } => {
                NoResultReason::ArtifactInvalid { kind, reason }
            }
            ForecastError::ArtifactMismatch {
                model_features,
                columns,
                ..
            } => NoResultReason::ArtifactMismatch {
                model_features,
                columns,
            },
            ForecastError::PredictionFailed(msg) => NoResultReason::PredictionFailed(msg),
            other => NoResultReason::SourceFailed(other.to_string()),
        };

        Self {
            area: Some(area.clone()),
            reason,
        }
    }

    /// Artifact kind involved, for artifact failures
    pub fn artifact_kind(&self) -> Option<ArtifactKind> {
        match &self.reason {
            NoResultReason::ArtifactNotFound(kind) => Some(*kind),
            NoResultReason::ArtifactInvalid { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for NoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let area = self.area.as_ref().map(Area::name).unwrap_or("<none>");
        match &self.reason {
            NoResultReason::MissingArea { field } => {
                write!(f, "Request has no area in field '{}'", field)
            }
            NoResultReason::ArtifactNotFound(kind) => write!(
                f,
                "{} file missing for area: {}",
                capitalize(&kind.to_string()),
                area
            ),
            NoResultReason::ArtifactInvalid { kind, reason } => write!(
                f,
                "{} file for area {} is unusable: {}",
                capitalize(&kind.to_string()),
                area,
                reason
            ),
            NoResultReason::ArtifactMismatch {
                model_features,
                columns,
            } => write!(
                f,
                "Model for area {} expects {} features but its trained columns list {}",
                area, model_features, columns
            ),
            NoResultReason::PredictionFailed(msg) => {
                write!(f, "Prediction failed for area {}: {}", area, msg)
            }
            NoResultReason::SourceFailed(msg) => {
                write!(f, "Artifacts for area {} could not be loaded: {}", area, msg)
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result of one request
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// Smoothed history followed by the forecast; may be empty
    Series(PriceSeries),
    /// The request could not be served
    NoResult(NoResult),
}

impl ForecastOutcome {
    /// The series, if one was produced
    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            ForecastOutcome::Series(series) => Some(series),
            ForecastOutcome::NoResult(_) => None,
        }
    }

    /// Take the series, if one was produced
    pub fn into_series(self) -> Option<PriceSeries> {
        match self {
            ForecastOutcome::Series(series) => Some(series),
            ForecastOutcome::NoResult(_) => None,
        }
    }

    /// Check if the request ended without a series
    pub fn is_no_result(&self) -> bool {
        matches!(self, ForecastOutcome::NoResult(_))
    }
}

/// Forecast pipeline over an artifact source and preloaded tables
#[derive(Debug)]
pub struct Pipeline<S: ArtifactSource> {
    source: S,
    inputs: ForecastInputs,
    encoder: FeatureEncoder,
    smoother: HistoricalSmoother,
    area_field: String,
}

impl<S: ArtifactSource> Pipeline<S> {
    /// Create a pipeline with the default encoder, smoother and area field
    pub fn new(source: S, inputs: ForecastInputs) -> Self {
        Self {
            source,
            inputs,
            encoder: FeatureEncoder::default(),
            smoother: HistoricalSmoother::default(),
            area_field: AREA_FIELD.to_string(),
        }
    }

    /// Create a pipeline with the encoder, smoother and area field of a config
    pub fn from_config(source: S, inputs: ForecastInputs, config: &ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            inputs,
            encoder: config.encoder(),
            smoother: config.smoother()?,
            area_field: config.area_field.clone(),
        })
    }

    /// Replace the feature encoder
    pub fn with_encoder(mut self, encoder: FeatureEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replace the historical smoother
    pub fn with_smoother(mut self, smoother: HistoricalSmoother) -> Self {
        self.smoother = smoother;
        self
    }

    /// Read the area from another request field
    pub fn with_area_field(mut self, area_field: &str) -> Self {
        self.area_field = area_field.to_string();
        self
    }

    /// The artifact source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The preloaded tables
    pub fn inputs(&self) -> &ForecastInputs {
        &self.inputs
    }

    /// Serve one request
    pub fn forecast(&self, record: &PropertyFeatureRecord) -> ForecastOutcome {
        let Some(area) = record.area(&self.area_field) else {
            log::warn!("Request has no area in field '{}'", self.area_field);
            return ForecastOutcome::NoResult(NoResult {
                area: None,
                reason: NoResultReason::MissingArea {
                    field: self.area_field.clone(),
                },
            });
        };

        match self.run(&area, record) {
            Ok(series) => {
                log::info!("Forecast for '{}': {} points", area, series.len());
                ForecastOutcome::Series(series)
            }
            Err(error) => {
                let no_result = NoResult::for_area(&area, error);
                log::warn!("{}", no_result);
                ForecastOutcome::NoResult(no_result)
            }
        }
    }

    fn run(&self, area: &Area, record: &PropertyFeatureRecord) -> Result<PriceSeries> {
        let artifacts = self.source.load(area)?;

        if let Some(range) = self.inputs.ranges.as_ref().and_then(|r| r.for_area(area)) {
            for warning in range.check(record) {
                log::warn!("Area '{}': {}", area, warning);
            }
        }

        // Models were trained on the normalized area name
        let request = record.clone().with_field(&self.area_field, area.name());
        let features = self.encoder.encode(&request, &artifacts.columns);
        let base_price = predict_point(artifacts.model.as_ref(), &features)?;

        let forecast = compose_forecast(&self.inputs.forecast.for_area(area), base_price);
        let history = self.smoothed_history(area);

        Ok(stitch(history, forecast))
    }

    fn smoothed_history(&self, area: &Area) -> PriceSeries {
        let history: Vec<PricePoint> = self
            .inputs
            .historical
            .for_area(area)
            .into_iter()
            .map(|sample| PricePoint::new(sample.month, sample.median_price))
            .collect();

        match self.smoother.smooth(&history) {
            Ok(smoothed) => smoothed,
            Err(e) => {
                log::warn!("Cannot smooth history of '{}', using raw prices: {}", area, e);
                let mut raw = history;
                raw.sort_by_key(|point| point.month);
                PriceSeries::new(raw)
            }
        }
    }
}

/// Load the tables fresh from disk and serve one request with artifacts
/// resolved from the configured directories.
///
/// Only table loading and configuration errors are returned as `Err`.
pub fn forecast_from_disk(
    config: &ForecastConfig,
    record: &PropertyFeatureRecord,
) -> Result<ForecastOutcome> {
    let inputs = ForecastInputs::load(config)?;
    let pipeline = Pipeline::from_config(config.resolver(), inputs, config)?;
    Ok(pipeline.forecast(record))
}
