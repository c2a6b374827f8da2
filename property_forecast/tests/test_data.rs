use property_forecast::area::Area;
use property_forecast::data::{DataLoader, ForecastTable, HistoricalTable};
use property_forecast::error::ForecastError;
use property_forecast::series::Month;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn month(year: i32, month: u32) -> Month {
    Month::new(year, month).unwrap()
}

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_forecast_table_from_csv() {
    let file = csv_file(&[
        "area_name_en,month,growth_factor",
        "Business Bay,2024-03,1.0",
        "Business Bay,2024-04,1.05",
        "Dubai Marina,2024-03,0.98",
    ]);

    let table = DataLoader::forecast_table_from_csv(file.path()).unwrap();
    assert_eq!(table.len(), 3);

    let points = table.for_area(&Area::new("business_bay"));
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].month, month(2024, 3));
    assert_eq!(points[0].growth_factor, 1.0);
    assert_eq!(points[1].month, month(2024, 4));
    assert_eq!(points[1].growth_factor, 1.05);

    assert!(table.for_area(&Area::new("Al Barsha")).is_empty());
}

#[test]
fn test_historical_table_from_csv() {
    let file = csv_file(&[
        "area_name_en,month,median_price",
        "Business Bay,2024-01-01,1000",
        "Business Bay,2024-02-01 00:00:00,1010.5",
    ]);

    let table = DataLoader::historical_table_from_csv(file.path()).unwrap();
    let samples = table.for_area(&Area::new("Business Bay"));

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].month, month(2024, 1));
    assert_eq!(samples[0].median_price, 1000.0);
    assert_eq!(samples[1].month, month(2024, 2));
    assert_eq!(samples[1].median_price, 1010.5);
}

#[test]
fn test_incomplete_rows_skipped() {
    let file = csv_file(&[
        "area_name_en,month,median_price",
        "Business Bay,2024-01,1000",
        "Business Bay,2024-02,",
        "Business Bay,someday,1020",
        ",2024-04,1030",
        "Business Bay,2024-05,1040",
    ]);

    let table = DataLoader::historical_table_from_csv(file.path()).unwrap();
    let months: Vec<Month> = table
        .for_area(&Area::new("Business Bay"))
        .iter()
        .map(|s| s.month)
        .collect();

    assert_eq!(months, vec![month(2024, 1), month(2024, 5)]);
}

#[test]
fn test_missing_column() {
    let file = csv_file(&["area_name_en,month,price", "Business Bay,2024-01,1000"]);

    let result = DataLoader::historical_table_from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_missing_file() {
    let result = DataLoader::forecast_table_from_csv("nonexistent_forecast.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_fixture_tables() {
    let forecast = DataLoader::forecast_table_from_csv(fixture("Sarima_forecast_6M.csv")).unwrap();
    let historical = DataLoader::historical_table_from_csv(fixture("historical_df.csv")).unwrap();

    assert_eq!(forecast.for_area(&Area::new("Dubai Marina")).len(), 6);
    assert_eq!(historical.for_area(&Area::new("Dubai Marina")).len(), 12);
    assert_eq!(historical.for_area(&Area::new("Business Bay")).len(), 2);
}

#[test]
fn test_tables_built_in_memory() {
    let forecast = ForecastTable::default()
        .with_area("Business Bay", &[(month(2024, 3), 1.0), (month(2024, 4), 1.05)])
        .with_area("Dubai Marina", &[(month(2024, 3), 1.1)]);
    let historical =
        HistoricalTable::default().with_area("Business_Bay", &[(month(2024, 1), 1000.0)]);

    assert_eq!(forecast.len(), 3);
    assert_eq!(forecast.for_area(&Area::new("Dubai Marina"))[0].growth_factor, 1.1);
    assert_eq!(historical.for_area(&Area::new("business bay")).len(), 1);
    assert!(HistoricalTable::default().is_empty());
}
