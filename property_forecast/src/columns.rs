//! Trained column specifications

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Separator between a feature name and its category in indicator columns
pub const INDICATOR_SEPARATOR: char = '=';

/// Ordered list of feature columns an area's model was trained on.
///
/// Indicator columns are named `feature=value`; all other columns are the
/// bare names of numeric features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TrainedColumnSpec {
    columns: Vec<String>,
}

impl TrainedColumnSpec {
    /// Create a spec, rejecting duplicate column names
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ForecastError::DataError(format!(
                    "Duplicate trained column: '{}'",
                    column
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Parse a spec from a JSON array of column names
    pub fn from_json_str(json: &str) -> Result<Self> {
        let columns: Vec<String> = serde_json::from_str(json)?;
        Self::new(columns)
    }

    /// Load a spec from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Column names in model order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the spec has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

impl TryFrom<Vec<String>> for TrainedColumnSpec {
    type Error = ForecastError;

    fn try_from(columns: Vec<String>) -> Result<Self> {
        Self::new(columns)
    }
}

impl From<TrainedColumnSpec> for Vec<String> {
    fn from(spec: TrainedColumnSpec) -> Self {
        spec.columns
    }
}

/// Name of the indicator column for a feature category
pub fn indicator_column(field: &str, value: &str) -> String {
    format!("{}{}{}", field, INDICATOR_SEPARATOR, value)
}
