//! Property feature records supplied by callers

use crate::area::Area;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default name of the field carrying the area
pub const AREA_FIELD: &str = "area_name_en";

/// A single loosely-typed feature value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Yes/no amenity
    Flag(bool),
    /// Numeric measurement such as the procedure area
    Number(f64),
    /// Category label such as a room type or floor bin
    Text(String),
}

impl FeatureValue {
    /// Category label of the value, as used in `field=value` indicator columns.
    ///
    /// Flags render as `0`/`1` and whole numbers without a fractional part.
    pub fn label(&self) -> String {
        match self {
            FeatureValue::Flag(flag) => (if *flag { "1" } else { "0" }).to_string(),
            FeatureValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    format!("{}", value)
                }
            }
            FeatureValue::Text(text) => text.trim().to_string(),
        }
    }

    /// Numeric reading of the value, if it has one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Flag(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            FeatureValue::Number(value) => Some(*value),
            FeatureValue::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Check if the value is a yes/no flag
    pub fn is_flag(&self) -> bool {
        matches!(self, FeatureValue::Flag(_))
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Flag(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

/// Caller-supplied property description: feature name to value.
///
/// Fields are kept sorted by name so that every downstream step is
/// independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyFeatureRecord {
    fields: BTreeMap<String, FeatureValue>,
}

impl PropertyFeatureRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style
    pub fn with_field<V: Into<FeatureValue>>(mut self, name: &str, value: V) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value
    pub fn insert<V: Into<FeatureValue>>(&mut self, name: &str, value: V) {
        self.fields.insert(name.trim().to_string(), value.into());
    }

    /// Value of a field
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }

    /// Fields sorted by name
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Area named by `area_field`, if present and non-blank
    pub fn area(&self, area_field: &str) -> Option<Area> {
        self.fields
            .get(area_field)
            .map(|value| Area::new(&value.label()))
            .filter(|area| !area.is_empty())
    }
}

impl<K: Into<String>, V: Into<FeatureValue>> FromIterator<(K, V)> for PropertyFeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            let name: String = name.into();
            record.insert(&name, value);
        }
        record
    }
}
