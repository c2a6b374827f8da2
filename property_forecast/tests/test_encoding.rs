use pretty_assertions::assert_eq;
use property_forecast::columns::TrainedColumnSpec;
use property_forecast::encoding::FeatureEncoder;
use property_forecast::features::{FeatureValue, PropertyFeatureRecord};
use rstest::rstest;

fn spec(columns: &[&str]) -> TrainedColumnSpec {
    TrainedColumnSpec::new(columns.iter().map(|c| c.to_string()).collect()).unwrap()
}

fn business_bay_record() -> PropertyFeatureRecord {
    PropertyFeatureRecord::new()
        .with_field("area_name_en", "Business Bay")
        .with_field("procedure_area", 88.5)
        .with_field("rooms_en", "1 B/R")
        .with_field("floor_bin", "11-20")
        .with_field("has_parking", true)
        .with_field("metro", false)
}

#[test]
fn test_encode_follows_column_order() {
    let columns = spec(&[
        "procedure_area",
        "rooms_en=Studio",
        "rooms_en=1 B/R",
        "floor_bin=11-20",
        "has_parking",
        "metro",
        "area_name_en=Business Bay",
    ]);

    let vector = FeatureEncoder::default().encode(&business_bay_record(), &columns);

    assert_eq!(vector, vec![88.5, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_flag_indicator_columns() {
    let columns = spec(&["has_parking=1", "has_parking=0", "metro=1", "metro=0"]);
    let vector = FeatureEncoder::default().encode(&business_bay_record(), &columns);
    assert_eq!(vector, vec![1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_unreachable_columns_are_zero() {
    let columns = spec(&[
        "rooms_en=PENTHOUSE",
        "floor_bin=Top floor",
        "swimming_pool",
        "balcony=1",
    ]);

    let vector = FeatureEncoder::default().encode(&business_bay_record(), &columns);

    assert_eq!(vector.len(), columns.len());
    assert!(vector.iter().all(|v| *v == 0.0));
}

#[test]
fn test_empty_record_and_empty_spec() {
    let encoder = FeatureEncoder::default();
    let columns = spec(&["procedure_area", "rooms_en=Studio"]);

    assert_eq!(
        encoder.encode(&PropertyFeatureRecord::new(), &columns),
        vec![0.0, 0.0]
    );
    assert!(encoder
        .encode(&business_bay_record(), &spec(&[]))
        .is_empty());
}

#[test]
fn test_independent_of_insertion_order() {
    let forward: PropertyFeatureRecord = vec![
        ("procedure_area", FeatureValue::from(70.0)),
        ("rooms_en", FeatureValue::from("Studio")),
        ("balcony", FeatureValue::from(true)),
    ]
    .into_iter()
    .collect();
    let backward: PropertyFeatureRecord = vec![
        ("balcony", FeatureValue::from(true)),
        ("rooms_en", FeatureValue::from("Studio")),
        ("procedure_area", FeatureValue::from(70.0)),
    ]
    .into_iter()
    .collect();
    let columns = spec(&["balcony", "rooms_en=Studio", "procedure_area"]);
    let encoder = FeatureEncoder::default();

    assert_eq!(encoder.encode(&forward, &columns), encoder.encode(&backward, &columns));
    assert_eq!(encoder.encode(&forward, &columns), vec![1.0, 1.0, 70.0]);
}

#[rstest]
#[case(FeatureValue::from(3), "floor=3", 1.0)]
#[case(FeatureValue::from(3), "floor", 3.0)]
#[case(FeatureValue::from(2.5), "floor=2.5", 1.0)]
#[case(FeatureValue::from("3"), "floor=3", 1.0)]
#[case(FeatureValue::from("3"), "floor", 0.0)]
#[case(FeatureValue::from(" Studio "), "floor=Studio", 1.0)]
fn test_nominal_value_labels(
    #[case] value: FeatureValue,
    #[case] column: &str,
    #[case] expected: f64,
) {
    let record = PropertyFeatureRecord::new().with_field("floor", value);
    let vector = FeatureEncoder::default().encode(&record, &spec(&[column]));
    assert_eq!(vector, vec![expected]);
}

#[test]
fn test_non_numeric_value_in_numeric_field_is_absent() {
    let record = PropertyFeatureRecord::new().with_field("procedure_area", "large");
    let columns = spec(&["procedure_area", "procedure_area=large"]);

    let vector = FeatureEncoder::default().encode(&record, &columns);

    assert_eq!(vector, vec![0.0, 0.0]);
}

#[test]
fn test_custom_numeric_fields() {
    let encoder = FeatureEncoder::new(["procedure_area", "floor"]);
    assert!(encoder.is_numeric("floor"));
    assert_eq!(
        encoder.numeric_fields().collect::<Vec<_>>(),
        vec!["floor", "procedure_area"]
    );

    let record = PropertyFeatureRecord::new()
        .with_field("procedure_area", 120.0)
        .with_field("floor", 14);
    let columns = spec(&["floor", "floor=14", "procedure_area"]);

    assert_eq!(encoder.encode(&record, &columns), vec![14.0, 0.0, 120.0]);
}

#[test]
fn test_active_indicators() {
    let indicators = FeatureEncoder::default().active_indicators(&business_bay_record());
    let expected: Vec<&str> = vec![
        "area_name_en=Business Bay",
        "floor_bin=11-20",
        "has_parking=1",
        "metro=0",
        "rooms_en=1 B/R",
    ];

    assert_eq!(indicators.iter().map(String::as_str).collect::<Vec<_>>(), expected);
}

#[test]
fn test_record_from_json() {
    let record: PropertyFeatureRecord = serde_json::from_str(
        r#"{"area_name_en": "Business Bay", "procedure_area": 88, "has_parking": true, "rooms_en": "Studio"}"#,
    )
    .unwrap();

    assert_eq!(record.len(), 4);
    assert_eq!(record.get("procedure_area"), Some(&FeatureValue::Number(88.0)));
    assert_eq!(record.get("has_parking"), Some(&FeatureValue::Flag(true)));
    assert_eq!(record.area("area_name_en").unwrap().name(), "Business Bay");
}
