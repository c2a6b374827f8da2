//! Per-area input ranges
//!
//! The ranges table lists, for each area, the observed span of property
//! sizes and the category values the area's model has seen:
//!
//! ```text
//! area_name_en,min,median_procedure_area,max,rooms_en,floor_bin
//! Business Bay,35.5,88.0,410.0,"['1 B/R', 'Studio']","['1-10', '11-20']"
//! ```
//!
//! The option columns hold serialized lists. They are read with
//! [`parse_option_list`], which never fails.

use crate::area::Area;
use crate::encoding::PROCEDURE_AREA;
use crate::error::Result;
use crate::features::PropertyFeatureRecord;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Room type field
pub const ROOMS_FIELD: &str = "rooms_en";
/// Floor bin field
pub const FLOOR_BIN_FIELD: &str = "floor_bin";

/// Room types offered when an area lists none
pub const DEFAULT_ROOM_OPTIONS: [&str; 6] = [
    "1 B/R",
    "Studio",
    "2 B/R",
    "3 B/R",
    "PENTHOUSE",
    "More than 3B/R",
];

/// Floor bins offered when an area lists none
pub const DEFAULT_FLOOR_BIN_OPTIONS: [&str; 15] = [
    "1-10",
    "11-20",
    "41-50",
    "21-30",
    "Below 1st floor",
    "31-40",
    "51-60",
    "Other",
    "-9-0",
    "61-70",
    "Top floor",
    "91-100",
    "81-90",
    "71-80",
    "Duplex",
];

/// Parse a serialized list of strings.
///
/// Accepts JSON arrays (`["a", "b"]`) and Python list literals
/// (`['a', "b"]`). Blank text is an empty list. Anything else is logged and
/// treated as an empty list.
pub fn parse_option_list(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if let Ok(options) = serde_json::from_str::<Vec<String>>(text) {
        return options;
    }

    match parse_quoted_list(text) {
        Some(options) => options,
        None => {
            log::warn!("Malformed option list, using no options: {}", text);
            Vec::new()
        }
    }
}

/// Parse `[ 'a', "b", ]` with single or double quoted items
fn parse_quoted_list(text: &str) -> Option<Vec<String>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }

        let quote = match chars.next() {
            None => break,
            Some(c @ ('\'' | '"')) => c,
            Some(_) => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(chars.next()?),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(items)
}

/// A problem found when checking a request against an area's ranges
#[derive(Debug, Clone, PartialEq)]
pub enum RangeWarning {
    /// Property size outside the observed span
    SizeOutOfRange { value: f64, min: f64, max: f64 },
    /// Category value the area's model has not seen
    UnknownCategory { field: String, value: String },
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeWarning::SizeOutOfRange { value, min, max } => write!(
                f,
                "{} {} is outside the observed range [{}, {}]",
                PROCEDURE_AREA, value, min, max
            ),
            RangeWarning::UnknownCategory { field, value } => {
                write!(f, "{} '{}' is not a known option", field, value)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RangeRow {
    area_name_en: String,
    min: f64,
    median_procedure_area: f64,
    max: f64,
    #[serde(default)]
    rooms_en: String,
    #[serde(default)]
    floor_bin: String,
}

/// Observed input span of one area
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRange {
    /// The area
    pub area: Area,
    /// Smallest observed property size
    pub min: f64,
    /// Median observed property size, the suggested default
    pub median: f64,
    /// Largest observed property size
    pub max: f64,
    /// Known room types
    pub rooms: Vec<String>,
    /// Known floor bins
    pub floor_bins: Vec<String>,
}

impl From<RangeRow> for AreaRange {
    fn from(row: RangeRow) -> Self {
        Self {
            area: Area::new(&row.area_name_en),
            min: row.min,
            median: row.median_procedure_area,
            max: row.max,
            rooms: parse_option_list(&row.rooms_en),
            floor_bins: parse_option_list(&row.floor_bin),
        }
    }
}

impl AreaRange {
    /// Check if a property size lies within `[min, max]`
    pub fn contains_size(&self, size: f64) -> bool {
        size >= self.min && size <= self.max
    }

    /// Room types accepted for this area
    pub fn room_options(&self) -> Vec<&str> {
        options_or_default(&self.rooms, &DEFAULT_ROOM_OPTIONS)
    }

    /// Floor bins accepted for this area
    pub fn floor_bin_options(&self) -> Vec<&str> {
        options_or_default(&self.floor_bins, &DEFAULT_FLOOR_BIN_OPTIONS)
    }

    /// Check if a room type is known for this area
    pub fn allows_room(&self, value: &str) -> bool {
        self.room_options().contains(&value.trim())
    }

    /// Check if a floor bin is known for this area
    pub fn allows_floor_bin(&self, value: &str) -> bool {
        self.floor_bin_options().contains(&value.trim())
    }

    /// Everything in the record that falls outside this area's ranges
    pub fn check(&self, record: &PropertyFeatureRecord) -> Vec<RangeWarning> {
        let mut warnings = Vec::new();

        if let Some(size) = record.get(PROCEDURE_AREA).and_then(|v| v.as_number()) {
            if !self.contains_size(size) {
                warnings.push(RangeWarning::SizeOutOfRange {
                    value: size,
                    min: self.min,
                    max: self.max,
                });
            }
        }

        if let Some(value) = record.get(ROOMS_FIELD) {
            let label = value.label();
            if !self.allows_room(&label) {
                warnings.push(RangeWarning::UnknownCategory {
                    field: ROOMS_FIELD.to_string(),
                    value: label,
                });
            }
        }

        if let Some(value) = record.get(FLOOR_BIN_FIELD) {
            let label = value.label();
            if !self.allows_floor_bin(&label) {
                warnings.push(RangeWarning::UnknownCategory {
                    field: FLOOR_BIN_FIELD.to_string(),
                    value: label,
                });
            }
        }

        warnings
    }
}

fn options_or_default<'a>(options: &'a [String], defaults: &[&'static str]) -> Vec<&'a str> {
    if options.is_empty() {
        defaults.to_vec()
    } else {
        options.iter().map(String::as_str).collect()
    }
}

/// Input ranges of all areas, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRanges {
    ranges: Vec<AreaRange>,
}

impl InputRanges {
    /// Create a table from area ranges
    pub fn new(ranges: Vec<AreaRange>) -> Self {
        Self { ranges }
    }

    /// Read the ranges table from CSV, skipping rows that do not parse
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut ranges = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<RangeRow>() {
            match row {
                Ok(row) => ranges.push(AreaRange::from(row)),
                Err(e) => {
                    log::warn!("Skipping input ranges row: {}", e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} malformed input ranges rows", skipped);
        }
        log::debug!("Read input ranges for {} areas", ranges.len());
        Ok(Self { ranges })
    }

    /// Load the ranges table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Ranges of an area, if listed
    pub fn for_area(&self, area: &Area) -> Option<&AreaRange> {
        self.ranges.iter().find(|range| &range.area == area)
    }

    /// Listed areas, in file order
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.ranges.iter().map(|range| &range.area)
    }

    /// Number of listed areas
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if no area is listed
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
