//! Forecast and historical price tables

use crate::area::Area;
use crate::error::{ForecastError, Result};
use crate::series::Month;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Name of the area column in every table
pub const AREA_COLUMN: &str = "area_name_en";
/// Name of the month column in every table
pub const MONTH_COLUMN: &str = "month";
/// Name of the growth factor column of the forecast table
pub const GROWTH_FACTOR_COLUMN: &str = "growth_factor";
/// Name of the price column of the historical table
pub const MEDIAN_PRICE_COLUMN: &str = "median_price";

/// One step of an area's precomputed growth curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    /// Forecast month
    pub month: Month,
    /// Multiplier on the base price, 1.0 meaning no change
    pub growth_factor: f64,
}

/// One observed month of an area's price history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricSample {
    /// Observation month
    pub month: Month,
    /// Observed median price
    pub median_price: f64,
}

/// Growth factors of all areas, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    rows: Vec<(Area, ForecastPoint)>,
}

impl ForecastTable {
    /// Create a table from rows
    pub fn new(rows: Vec<(Area, ForecastPoint)>) -> Self {
        Self { rows }
    }

    /// Append the growth curve of one area
    pub fn with_area(mut self, area: &str, points: &[(Month, f64)]) -> Self {
        let area = Area::new(area);
        self.rows.extend(points.iter().map(|(month, growth_factor)| {
            (
                area.clone(),
                ForecastPoint {
                    month: *month,
                    growth_factor: *growth_factor,
                },
            )
        }));
        self
    }

    /// Growth curve of an area, in file order
    pub fn for_area(&self, area: &Area) -> Vec<ForecastPoint> {
        self.rows
            .iter()
            .filter(|(row_area, _)| row_area == area)
            .map(|(_, point)| *point)
            .collect()
    }

    /// Number of rows over all areas
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Price history of all areas, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalTable {
    rows: Vec<(Area, HistoricSample)>,
}

impl HistoricalTable {
    /// Create a table from rows
    pub fn new(rows: Vec<(Area, HistoricSample)>) -> Self {
        Self { rows }
    }

    /// Append the history of one area
    pub fn with_area(mut self, area: &str, samples: &[(Month, f64)]) -> Self {
        let area = Area::new(area);
        self.rows.extend(samples.iter().map(|(month, median_price)| {
            (
                area.clone(),
                HistoricSample {
                    month: *month,
                    median_price: *median_price,
                },
            )
        }));
        self
    }

    /// History of an area, in file order
    pub fn for_area(&self, area: &Area) -> Vec<HistoricSample> {
        self.rows
            .iter()
            .filter(|(row_area, _)| row_area == area)
            .map(|(_, sample)| *sample)
            .collect()
    }

    /// Number of rows over all areas
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Data loader for the forecast and historical tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the forecast table (`area_name_en, month, growth_factor`) from CSV
    pub fn forecast_table_from_csv<P: AsRef<Path>>(path: P) -> Result<ForecastTable> {
        let df = Self::read_csv(path.as_ref())?;
        Self::forecast_table_from_dataframe(&df)
    }

    /// Load the historical table (`area_name_en, month, median_price`) from CSV
    pub fn historical_table_from_csv<P: AsRef<Path>>(path: P) -> Result<HistoricalTable> {
        let df = Self::read_csv(path.as_ref())?;
        Self::historical_table_from_dataframe(&df)
    }

    /// Build the forecast table from an existing DataFrame
    pub fn forecast_table_from_dataframe(df: &DataFrame) -> Result<ForecastTable> {
        let rows = Self::area_month_value_rows(df, GROWTH_FACTOR_COLUMN)?
            .into_iter()
            .map(|(area, month, growth_factor)| {
                (
                    area,
                    ForecastPoint {
                        month,
                        growth_factor,
                    },
                )
            })
            .collect();

        Ok(ForecastTable::new(rows))
    }

    /// Build the historical table from an existing DataFrame
    pub fn historical_table_from_dataframe(df: &DataFrame) -> Result<HistoricalTable> {
        let rows = Self::area_month_value_rows(df, MEDIAN_PRICE_COLUMN)?
            .into_iter()
            .map(|(area, month, median_price)| {
                (
                    area,
                    HistoricSample {
                        month,
                        median_price,
                    },
                )
            })
            .collect();

        Ok(HistoricalTable::new(rows))
    }

    fn read_csv(path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        log::debug!("Read {} rows from {}", df.height(), path.display());
        Ok(df)
    }

    /// Extract `(area, month, value)` triples, skipping incomplete rows
    fn area_month_value_rows(df: &DataFrame, value_column: &str) -> Result<Vec<(Area, Month, f64)>> {
        let areas = Self::text_column(df, AREA_COLUMN)?;
        let months = Self::text_column(df, MONTH_COLUMN)?;
        let values = Self::float_column(df, value_column)?;

        let mut rows = Vec::with_capacity(areas.len());
        let mut skipped = 0usize;

        for ((area, month), value) in areas.into_iter().zip(months).zip(values) {
            let (Some(area), Some(month), Some(value)) = (area, month, value) else {
                skipped += 1;
                continue;
            };
            if !value.is_finite() {
                skipped += 1;
                continue;
            }

            match month.parse::<Month>() {
                Ok(month) => rows.push((Area::new(&area), month, value)),
                Err(e) => {
                    log::warn!("Skipping row of area '{}': {}", area, e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} incomplete rows", skipped);
        }

        Ok(rows)
    }

    fn column<'a>(df: &'a DataFrame, column_name: &str) -> Result<&'a Series> {
        df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })
    }

    fn text_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let series = Self::column(df, column_name)?.cast(&DataType::Utf8)?;
        let values = series
            .utf8()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        Ok(values)
    }

    fn float_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let series = Self::column(df, column_name)?
            .cast(&DataType::Float64)
            .map_err(|e| {
                ForecastError::DataError(format!(
                    "Column '{}' cannot be converted to f64: {}",
                    column_name, e
                ))
            })?;
        let values = series.f64()?.into_iter().collect();
        Ok(values)
    }
}
