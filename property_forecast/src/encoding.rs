//! Feature encoding into a model's trained column space
//!
//! Every field that is not declared numeric is treated as a nominal category
//! and activates the indicator column `field=value`. The output vector then
//! follows the trained column order exactly:
//!
//! - a numeric field's own column carries its value,
//! - an active indicator column carries `1`,
//! - a flag or number given for a nominal field also answers to the bare
//!   field name (dummy encoders keep integer flags as plain columns),
//! - anything else is `0`.
//!
//! Input fields without a matching column are dropped.

use crate::columns::{indicator_column, TrainedColumnSpec};
use crate::features::{FeatureValue, PropertyFeatureRecord};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Default numeric feature: the property's area in square metres
pub const PROCEDURE_AREA: &str = "procedure_area";

/// Encodes property feature records into dense model inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEncoder {
    numeric_fields: BTreeSet<String>,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new([PROCEDURE_AREA])
    }
}

impl FeatureEncoder {
    /// Create an encoder that passes the given fields through as numbers
    pub fn new<I, S>(numeric_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            numeric_fields: numeric_fields
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .collect(),
        }
    }

    /// Check if a field is passed through as a number
    pub fn is_numeric(&self, field: &str) -> bool {
        self.numeric_fields.contains(field)
    }

    /// Numeric fields, sorted
    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.numeric_fields.iter().map(String::as_str)
    }

    /// Indicator columns activated by the record's nominal fields, sorted
    pub fn active_indicators(&self, record: &PropertyFeatureRecord) -> BTreeSet<String> {
        record
            .fields()
            .filter(|(name, _)| !self.is_numeric(name))
            .map(|(name, value)| indicator_column(name, &value.label()))
            .collect()
    }

    /// Encode a record into a vector aligned with `spec`
    pub fn encode(&self, record: &PropertyFeatureRecord, spec: &TrainedColumnSpec) -> Vec<f64> {
        let mut numeric: HashMap<&str, f64> = HashMap::new();
        let mut bare: HashMap<&str, f64> = HashMap::new();

        for (name, value) in record.fields() {
            if self.is_numeric(name) {
                match value.as_number() {
                    Some(number) => {
                        numeric.insert(name, number);
                    }
                    None => log::warn!(
                        "Numeric feature '{}' has non-numeric value '{}'; treated as absent",
                        name,
                        value
                    ),
                }
            } else if !matches!(value, FeatureValue::Text(_)) {
                if let Some(number) = value.as_number() {
                    bare.insert(name, number);
                }
            }
        }

        let indicators = self.active_indicators(record);

        let vector: Vec<f64> = spec
            .columns()
            .iter()
            .map(|column| {
                if let Some(value) = numeric.get(column.as_str()) {
                    *value
                } else if indicators.contains(column) {
                    1.0
                } else if let Some(value) = bare.get(column.as_str()) {
                    *value
                } else {
                    0.0
                }
            })
            .collect();

        if log::log_enabled!(log::Level::Debug) {
            let known: HashSet<&str> = spec.columns().iter().map(String::as_str).collect();
            let dropped: Vec<&str> = record
                .fields()
                .filter(|(name, value)| {
                    !known.contains(name)
                        && !known.contains(indicator_column(name, &value.label()).as_str())
                })
                .map(|(name, _)| name)
                .collect();
            log::debug!(
                "Encoded {} features into {} columns ({} non-zero); dropped fields: {:?}",
                record.len(),
                vector.len(),
                vector.iter().filter(|v| **v != 0.0).count(),
                dropped
            );
        }

        vector
    }
}
