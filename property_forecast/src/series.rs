//! Monthly price series

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// Create a month from a year and a 1-based month number
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Month)
            .ok_or_else(|| ForecastError::DataError(format!("Invalid month: {}-{}", year, month)))
    }

    /// Year of the month
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month number, 1 to 12
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// The following calendar month
    pub fn next(&self) -> Self {
        let (year, month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        // Day 1 exists in every month
        Month(NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(self.0))
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month(date.with_day(1).unwrap_or(date))
    }
}

impl FromStr for Month {
    type Err = ForecastError;

    /// Accepts `YYYY-MM`, `YYYY-MM-DD` and datetimes starting with `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();

        if let Some(date_part) = trimmed.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return Ok(Month::from(date));
            }
        }

        NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d")
            .map(Month)
            .map_err(|_| ForecastError::DataError(format!("Unrecognized month value: '{}'", s)))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One month of a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar month
    pub month: Month,
    /// Median sale price for the month
    pub median_price: f64,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(month: Month, median_price: f64) -> Self {
        Self {
            month,
            median_price,
        }
    }
}

/// Ordered sequence of monthly prices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series from points, keeping their order
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// Create an empty series
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from `(month, price)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Month, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(month, price)| PricePoint::new(month, price))
                .collect(),
        )
    }

    /// Points in series order
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Consume the series, returning its points
    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Last point, if any
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Months in series order
    pub fn months(&self) -> Vec<Month> {
        self.points.iter().map(|p| p.month).collect()
    }

    /// Prices in series order
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.median_price).collect()
    }

    /// Price recorded for `month`, if present
    pub fn price_at(&self, month: Month) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.month == month)
            .map(|p| p.median_price)
    }

    /// The last `n` points (fewer if the series is shorter)
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Strictly ascending months with no duplicates
    pub fn is_strictly_ordered(&self) -> bool {
        self.points.windows(2).all(|w| w[0].month < w[1].month)
    }

    /// Write the series as `month,median_price` CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            csv_writer.serialize(point)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the series as CSV to a file
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}

impl IntoIterator for PriceSeries {
    type Item = PricePoint;
    type IntoIter = std::vec::IntoIter<PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
