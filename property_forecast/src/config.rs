//! File locations and tuning knobs, loaded from TOML
//!
//! ```toml
//! base_dir = "/srv/forecast"
//! models_dir = "dt_models"
//! forecast_table = "Sarima_forecast_6M.csv"
//! ranges_table = "column_input_ranges.csv"
//!
//! [smoothing]
//! frac = 0.04
//! iterations = 3
//! ```
//!
//! Every field is optional. Relative paths are resolved against `base_dir`.

use crate::artifacts::{
    ArtifactLayout, ArtifactResolver, DEFAULT_COLUMNS_PREFIX, DEFAULT_EXTENSION,
    DEFAULT_MODEL_PREFIX,
};
use crate::encoding::{FeatureEncoder, PROCEDURE_AREA};
use crate::error::{ForecastError, Result};
use crate::features::AREA_FIELD;
use crate::smoothing::{HistoricalSmoother, DEFAULT_FRAC, DEFAULT_ITERATIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// LOWESS settings for the historical series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Bandwidth fraction in `(0, 1]`
    pub frac: f64,
    /// Robustifying iterations
    pub iterations: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            frac: DEFAULT_FRAC,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Configuration of the forecast pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Directory that relative paths are resolved against
    pub base_dir: PathBuf,
    /// Directory of model artifacts
    pub models_dir: PathBuf,
    /// Directory of trained-column artifacts
    pub columns_dir: PathBuf,
    /// File name prefix of model artifacts
    pub model_prefix: String,
    /// File name prefix of trained-column artifacts
    pub columns_prefix: String,
    /// Extension of artifact files
    pub artifact_extension: String,
    /// Growth factor table
    pub forecast_table: PathBuf,
    /// Historical price table
    pub historical_table: PathBuf,
    /// Optional input ranges table
    pub ranges_table: Option<PathBuf>,
    /// Request field naming the area
    pub area_field: String,
    /// Fields passed to models as plain numbers
    pub numeric_fields: Vec<String>,
    /// Historical smoothing
    pub smoothing: SmoothingConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            models_dir: PathBuf::from("dt_models"),
            columns_dir: PathBuf::from("trained_columns"),
            model_prefix: DEFAULT_MODEL_PREFIX.to_string(),
            columns_prefix: DEFAULT_COLUMNS_PREFIX.to_string(),
            artifact_extension: DEFAULT_EXTENSION.to_string(),
            forecast_table: PathBuf::from("Sarima_forecast_6M.csv"),
            historical_table: PathBuf::from("historical_df.csv"),
            ranges_table: None,
            area_field: AREA_FIELD.to_string(),
            numeric_fields: vec![PROCEDURE_AREA.to_string()],
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Defaults with every relative path under `base_dir`
    pub fn with_base_dir<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    ///
    /// Without an explicit `base_dir`, paths resolve against the file's own
    /// directory. A relative `base_dir` is taken relative to that directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&text)?;
        let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.base_dir = config_dir.join(&config.base_dir);

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check settings that deserialization cannot
    pub fn validate(&self) -> Result<()> {
        let frac = self.smoothing.frac;
        if !(frac > 0.0 && frac <= 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "smoothing.frac must be in (0, 1], got {}",
                frac
            )));
        }

        for (name, value) in [
            ("model_prefix", &self.model_prefix),
            ("columns_prefix", &self.columns_prefix),
            ("area_field", &self.area_field),
        ] {
            if value.trim().is_empty() {
                return Err(ForecastError::ConfigError(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }

    /// Resolve a configured path against `base_dir`
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Artifact directories and naming
    pub fn artifact_layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(self.resolve(&self.models_dir), self.resolve(&self.columns_dir))
            .with_prefixes(&self.model_prefix, &self.columns_prefix)
            .with_extension(&self.artifact_extension)
    }

    /// Filesystem artifact resolver for this layout
    pub fn resolver(&self) -> ArtifactResolver {
        ArtifactResolver::new(self.artifact_layout())
    }

    /// Encoder for the configured numeric fields
    pub fn encoder(&self) -> FeatureEncoder {
        FeatureEncoder::new(&self.numeric_fields)
    }

    /// Smoother with the configured settings
    pub fn smoother(&self) -> Result<HistoricalSmoother> {
        HistoricalSmoother::new(self.smoothing.frac, self.smoothing.iterations)
    }
}
