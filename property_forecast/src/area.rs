//! Area names and their normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named geographic zone such as "Business Bay".
///
/// Underscores and spaces are interchangeable and surrounding whitespace is
/// ignored. Equality is case-insensitive on the normalized name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Area {
    name: String,
}

impl Area {
    /// Create an area, normalizing separators and whitespace
    pub fn new(name: &str) -> Self {
        Self {
            name: name.replace('_', " ").trim().to_string(),
        }
    }

    /// Display name with spaces as separators
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with underscores as separators
    pub fn underscored(&self) -> String {
        self.name.replace(' ', "_")
    }

    /// Lower-cased key used for comparisons
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Check if the area has no name
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Check if a raw (unnormalized) name refers to this area
    pub fn matches(&self, raw: &str) -> bool {
        Area::new(raw) == *self
    }
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Area {}

impl Hash for Area {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Area {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Area {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<String> for Area {
    fn from(name: String) -> Self {
        Area::new(&name)
    }
}

impl From<&str> for Area {
    fn from(name: &str) -> Self {
        Area::new(name)
    }
}

impl From<Area> for String {
    fn from(area: Area) -> Self {
        area.name
    }
}
