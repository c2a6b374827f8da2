use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use property_forecast::area::Area;
use property_forecast::artifacts::MemoryArtifacts;
use property_forecast::columns::TrainedColumnSpec;
use property_forecast::config::ForecastConfig;
use property_forecast::data::{ForecastTable, HistoricalTable};
use property_forecast::error::ArtifactKind;
use property_forecast::features::PropertyFeatureRecord;
use property_forecast::models::{DecisionTree, LinearModel, ModelArtifact};
use property_forecast::pipeline::{
    forecast_from_disk, ForecastInputs, ForecastOutcome, NoResultReason, Pipeline,
};
use property_forecast::series::{Month, PriceSeries};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn month(year: i32, month: u32) -> Month {
    Month::new(year, month).unwrap()
}

fn columns(names: &[&str]) -> TrainedColumnSpec {
    TrainedColumnSpec::new(names.iter().map(|c| c.to_string()).collect()).unwrap()
}

fn business_bay_inputs() -> ForecastInputs {
    ForecastInputs::new(
        ForecastTable::default()
            .with_area("Business Bay", &[(month(2024, 3), 1.0), (month(2024, 4), 1.05)]),
        HistoricalTable::default()
            .with_area("Business Bay", &[(month(2024, 1), 1000.0), (month(2024, 2), 1010.0)]),
    )
}

fn constant_source(area: &str, price: f64) -> MemoryArtifacts {
    MemoryArtifacts::new().with_area(
        area,
        ModelArtifact::DecisionTree(DecisionTree::constant(price, Some(2))),
        columns(&["procedure_area", "rooms_en=1 B/R"]),
    )
}

fn request(area: &str) -> PropertyFeatureRecord {
    PropertyFeatureRecord::new()
        .with_field("area_name_en", area)
        .with_field("procedure_area", 88.0)
        .with_field("rooms_en", "1 B/R")
        .with_field("floor_bin", "11-20")
        .with_field("has_parking", true)
}

fn expect_series(outcome: ForecastOutcome) -> PriceSeries {
    match outcome {
        ForecastOutcome::Series(series) => series,
        ForecastOutcome::NoResult(no_result) => panic!("Expected a series, got: {}", no_result),
    }
}

fn assert_business_bay_series(series: &PriceSeries) {
    assert_eq!(
        series.months(),
        vec![month(2024, 1), month(2024, 2), month(2024, 3), month(2024, 4)]
    );
    let prices = series.prices();
    assert_relative_eq!(prices[0], 1000.0, epsilon = 1e-6);
    assert_relative_eq!(prices[1], 1000.0);
    assert_relative_eq!(prices[2], 1000.0);
    assert_relative_eq!(prices[3], 1050.0, epsilon = 1e-9);
}

#[test]
fn test_business_bay_end_to_end() {
    let pipeline = Pipeline::new(constant_source("Business Bay", 1000.0), business_bay_inputs());

    let series = expect_series(pipeline.forecast(&request("Business Bay")));

    assert_business_bay_series(&series);
    assert!(series.is_strictly_ordered());
}

#[test]
fn test_business_bay_from_disk() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let config = ForecastConfig::from_file(config_path).unwrap();

    let series = expect_series(forecast_from_disk(&config, &request("business_bay")).unwrap());

    assert_business_bay_series(&series);
}

#[test]
fn test_dubai_marina_from_disk() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let config = ForecastConfig::from_file(config_path).unwrap();
    let record = PropertyFeatureRecord::new()
        .with_field("area_name_en", "Dubai Marina")
        .with_field("procedure_area", 100.0)
        .with_field("has_parking", true)
        .with_field("metro", false);

    let series = expect_series(forecast_from_disk(&config, &record).unwrap());

    // 12 historical months followed by 6 forecast months
    assert_eq!(series.len(), 18);
    assert!(series.is_strictly_ordered());
    assert_eq!(series.first().unwrap().month, month(2023, 3));
    assert_eq!(series.last().unwrap().month, month(2024, 8));

    // Base price 500 + 10 * 100 + 100 * 1
    assert_relative_eq!(series.price_at(month(2024, 2)).unwrap(), 1600.0);
    assert_relative_eq!(series.price_at(month(2024, 3)).unwrap(), 1600.0);
    assert_relative_eq!(series.price_at(month(2024, 8)).unwrap(), 1664.0, epsilon = 1e-9);
}

#[test]
fn test_missing_model_is_no_result() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let config = ForecastConfig::from_file(config_path).unwrap();

    let outcome = forecast_from_disk(&config, &request("Jumeirah Village Circle")).unwrap();

    let ForecastOutcome::NoResult(no_result) = outcome else {
        panic!("Expected no result");
    };
    assert_eq!(no_result.area, Some(Area::new("Jumeirah Village Circle")));
    assert_eq!(no_result.artifact_kind(), Some(ArtifactKind::TrainedColumns));
    assert_eq!(
        no_result.to_string(),
        "Trained columns file missing for area: Jumeirah Village Circle"
    );
}

#[test]
fn test_memory_source_missing_area_is_no_result() {
    let pipeline = Pipeline::new(constant_source("Business Bay", 1000.0), business_bay_inputs());

    let outcome = pipeline.forecast(&request("Downtown Dubai"));

    assert!(outcome.is_no_result());
    let ForecastOutcome::NoResult(no_result) = outcome else {
        unreachable!()
    };
    assert_eq!(
        no_result.reason,
        NoResultReason::ArtifactNotFound(ArtifactKind::Model)
    );
    assert!(no_result.to_string().contains("Downtown Dubai"));
    assert!(no_result.to_string().starts_with("Model file missing"));
}

#[test]
fn test_request_without_area() {
    let pipeline = Pipeline::new(constant_source("Business Bay", 1000.0), business_bay_inputs());
    let record = PropertyFeatureRecord::new().with_field("procedure_area", 88.0);

    let ForecastOutcome::NoResult(no_result) = pipeline.forecast(&record) else {
        panic!("Expected no result");
    };
    assert_eq!(no_result.area, None);
    assert_eq!(
        no_result.reason,
        NoResultReason::MissingArea {
            field: "area_name_en".to_string()
        }
    );
}

#[test]
fn test_mismatched_artifacts_are_no_result() {
    let source = MemoryArtifacts::new().with_area(
        "Business Bay",
        ModelArtifact::Linear(LinearModel::new(0.0, vec![1.0, 2.0, 3.0]).unwrap()),
        columns(&["procedure_area"]),
    );
    let pipeline = Pipeline::new(source, business_bay_inputs());

    let ForecastOutcome::NoResult(no_result) = pipeline.forecast(&request("Business Bay")) else {
        panic!("Expected no result");
    };
    assert_eq!(
        no_result.reason,
        NoResultReason::ArtifactMismatch {
            model_features: 3,
            columns: 1
        }
    );
}

#[test]
fn test_prediction_failure_is_no_result() {
    // Splits on a feature the column spec does not provide
    let tree = DecisionTree {
        n_features: None,
        children_left: vec![1, -1, -1],
        children_right: vec![2, -1, -1],
        feature: vec![5, -2, -2],
        threshold: vec![1.0, -2.0, -2.0],
        value: vec![0.0, 1.0, 2.0],
    };
    let source = MemoryArtifacts::new().with_area(
        "Business Bay",
        ModelArtifact::DecisionTree(tree),
        columns(&["procedure_area"]),
    );
    let pipeline = Pipeline::new(source, business_bay_inputs());

    let ForecastOutcome::NoResult(no_result) = pipeline.forecast(&request("Business Bay")) else {
        panic!("Expected no result");
    };
    assert!(matches!(no_result.reason, NoResultReason::PredictionFailed(_)));
}

#[test]
fn test_area_without_tables_is_empty_series() {
    let pipeline = Pipeline::new(constant_source("Al Barsha", 900.0), business_bay_inputs());

    let outcome = pipeline.forecast(&request("Al Barsha"));

    assert!(!outcome.is_no_result());
    assert!(outcome.series().unwrap().is_empty());
}

#[test]
fn test_forecast_only_area() {
    let inputs = ForecastInputs::new(
        ForecastTable::default().with_area("Al Barsha", &[(month(2024, 3), 1.1)]),
        HistoricalTable::default(),
    );
    let pipeline = Pipeline::new(constant_source("Al Barsha", 900.0), inputs);

    let series = expect_series(pipeline.forecast(&request("Al Barsha")));

    assert_eq!(series.months(), vec![month(2024, 3)]);
    assert_relative_eq!(series.prices()[0], 990.0, epsilon = 1e-9);
}

#[test]
fn test_model_sees_normalized_area_name() {
    // Price equals 1 only when the indicator for the normalized name is set
    let source = MemoryArtifacts::new().with_area(
        "Business Bay",
        ModelArtifact::Linear(LinearModel::new(0.0, vec![1.0]).unwrap()),
        columns(&["area_name_en=Business Bay"]),
    );
    let pipeline = Pipeline::new(source, business_bay_inputs());

    let series = expect_series(pipeline.forecast(&request("  Business_Bay ")));

    assert_relative_eq!(series.price_at(month(2024, 3)).unwrap(), 1.0);
    assert_relative_eq!(series.price_at(month(2024, 4)).unwrap(), 1.05);
}

#[test]
fn test_out_of_range_input_still_served() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let config = ForecastConfig::from_file(config_path).unwrap();
    let record = request("Business Bay")
        .with_field("procedure_area", 5000.0)
        .with_field("rooms_en", "Castle");

    let series = expect_series(forecast_from_disk(&config, &record).unwrap());

    // Large sizes fall in the right branch of the fixture tree
    assert_relative_eq!(series.price_at(month(2024, 3)).unwrap(), 1800.0);
}

#[test]
fn test_unsmoothable_history_falls_back_to_raw() {
    let inputs = ForecastInputs::new(
        ForecastTable::default().with_area("Business Bay", &[(month(2024, 3), 1.0)]),
        HistoricalTable::default().with_area(
            "Business Bay",
            &[(month(2024, 2), 1010.0), (month(2024, 1), f64::NAN)],
        ),
    );
    let pipeline = Pipeline::new(constant_source("Business Bay", 1000.0), inputs);

    let series = expect_series(pipeline.forecast(&request("Business Bay")));

    assert_eq!(
        series.months(),
        vec![month(2024, 1), month(2024, 2), month(2024, 3)]
    );
    assert!(series.prices()[0].is_nan());
    assert_relative_eq!(series.prices()[1], 1000.0);
}

#[test]
fn test_missing_table_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ForecastConfig::with_base_dir(dir.path());

    assert!(forecast_from_disk(&config, &request("Business Bay")).is_err());
}

#[test]
fn test_bad_ranges_row_still_serves_other_areas() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let mut config = ForecastConfig::from_file(config_path).unwrap();

    let mut ranges = NamedTempFile::new().unwrap();
    writeln!(ranges, "area_name_en,min,median_procedure_area,max,rooms_en,floor_bin").unwrap();
    writeln!(ranges, "Other Area,,88.0,410.0,[],[]").unwrap();
    config.ranges_table = Some(ranges.path().to_path_buf());

    let series = expect_series(forecast_from_disk(&config, &request("Business Bay")).unwrap());
    assert_business_bay_series(&series);
}

#[test]
fn test_missing_ranges_table_is_ignored() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forecast.toml");
    let mut config = ForecastConfig::from_file(config_path).unwrap();
    config.ranges_table = Some("no_such_ranges.csv".into());

    let inputs = ForecastInputs::load(&config).unwrap();
    assert!(inputs.ranges.is_none());

    let series = expect_series(forecast_from_disk(&config, &request("Business Bay")).unwrap());
    assert_business_bay_series(&series);
}
