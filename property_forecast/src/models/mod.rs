//! Per-area price models
//!
//! A model is opaque to the pipeline: it maps an encoded feature vector to a
//! single price. Models are stored as tagged JSON documents:
//!
//! ```json
//! {"kind": "linear", "intercept": 250000.0, "coefficients": [1200.0, 15000.0]}
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

pub mod decision_tree;
pub mod linear;

pub use decision_tree::DecisionTree;
pub use linear::LinearModel;

/// A trained model that predicts a median price from encoded features
pub trait PriceModel: Debug {
    /// Predict a price for one encoded feature vector
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Number of features the model was trained on, when recorded
    fn n_features(&self) -> Option<usize>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Serialized form of the supported models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Regression tree stored as parallel node arrays
    DecisionTree(DecisionTree),
    /// Linear regression
    Linear(LinearModel),
}

impl ModelArtifact {
    /// Validate the artifact and turn it into a usable model
    pub fn into_model(self) -> Result<Box<dyn PriceModel>> {
        match self {
            ModelArtifact::DecisionTree(tree) => {
                tree.validate()?;
                Ok(Box::new(tree))
            }
            ModelArtifact::Linear(linear) => {
                linear.validate()?;
                Ok(Box::new(linear))
            }
        }
    }
}

/// Decode a model from its JSON representation
pub fn model_from_json(json: &str) -> Result<Box<dyn PriceModel>> {
    let artifact: ModelArtifact = serde_json::from_str(json)?;
    artifact.into_model()
}

/// Load a model from a JSON file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Box<dyn PriceModel>> {
    let content = std::fs::read_to_string(path)?;
    model_from_json(&content)
}

/// Run a model on an encoded vector.
///
/// The raw model output is returned unchanged. Any failure inside the model
/// is reported as [`ForecastError::PredictionFailed`].
pub fn predict_point(model: &dyn PriceModel, features: &[f64]) -> Result<f64> {
    match model.predict(features) {
        Ok(price) => {
            log::debug!("{} predicted base price {}", model.name(), price);
            Ok(price)
        }
        Err(ForecastError::PredictionFailed(msg)) => Err(ForecastError::PredictionFailed(msg)),
        Err(other) => Err(ForecastError::PredictionFailed(other.to_string())),
    }
}

/// Shared input-length check for models that record their feature count
pub(crate) fn check_width(expected: Option<usize>, features: &[f64]) -> Result<()> {
    match expected {
        Some(n) if n != features.len() => Err(ForecastError::PredictionFailed(format!(
            "Expected {} features, got {}",
            n,
            features.len()
        ))),
        _ => Ok(()),
    }
}
