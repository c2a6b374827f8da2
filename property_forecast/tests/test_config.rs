use property_forecast::area::Area;
use property_forecast::config::ForecastConfig;
use property_forecast::error::{ArtifactKind, ForecastError};
use std::path::{Path, PathBuf};

#[test]
fn test_defaults() {
    let config = ForecastConfig::default();

    assert_eq!(config.models_dir, PathBuf::from("dt_models"));
    assert_eq!(config.columns_dir, PathBuf::from("trained_columns"));
    assert_eq!(config.forecast_table, PathBuf::from("Sarima_forecast_6M.csv"));
    assert_eq!(config.historical_table, PathBuf::from("historical_df.csv"));
    assert_eq!(config.ranges_table, None);
    assert_eq!(config.area_field, "area_name_en");
    assert_eq!(config.numeric_fields, vec!["procedure_area".to_string()]);
    assert_eq!(config.smoothing.frac, 0.04);
    assert_eq!(config.smoothing.iterations, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = ForecastConfig::from_toml_str(
        r#"
        base_dir = "/srv/forecast"
        model_prefix = "rf_model"
        numeric_fields = ["procedure_area", "floor"]

        [smoothing]
        frac = 0.1
        "#,
    )
    .unwrap();

    assert_eq!(config.base_dir, PathBuf::from("/srv/forecast"));
    assert_eq!(config.model_prefix, "rf_model");
    assert_eq!(config.columns_prefix, "trained_columns");
    assert_eq!(config.smoothing.frac, 0.1);
    assert_eq!(config.smoothing.iterations, 3);
    assert!(config.encoder().is_numeric("floor"));

    assert_eq!(
        config.resolve(&config.forecast_table),
        PathBuf::from("/srv/forecast/Sarima_forecast_6M.csv")
    );
    assert_eq!(config.resolve("/data/h.csv"), PathBuf::from("/data/h.csv"));

    let layout = config.artifact_layout();
    assert_eq!(layout.dir(ArtifactKind::Model), Path::new("/srv/forecast/dt_models"));
    assert_eq!(layout.prefix(ArtifactKind::Model), "rf_model");
}

#[test]
fn test_invalid_settings() {
    let bad_frac = ForecastConfig::from_toml_str("[smoothing]\nfrac = 0.0\n");
    assert!(matches!(bad_frac, Err(ForecastError::ConfigError(_))));

    let empty_prefix = ForecastConfig::from_toml_str("model_prefix = \" \"\n");
    assert!(matches!(empty_prefix, Err(ForecastError::ConfigError(_))));

    let wrong_type = ForecastConfig::from_toml_str("models_dir = 5\n");
    assert!(matches!(wrong_type, Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_from_file_resolves_against_its_directory() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let config = ForecastConfig::from_file(fixtures.join("forecast.toml")).unwrap();

    assert_eq!(config.base_dir, fixtures);
    assert!(config.resolve(&config.historical_table).exists());
    assert!(config
        .resolve(config.ranges_table.as_ref().unwrap())
        .exists());

    let areas = config.resolver().available_areas().unwrap();
    assert!(areas.contains(&Area::new("Business Bay")));
}

#[test]
fn test_from_missing_file() {
    assert!(matches!(
        ForecastConfig::from_file("no_such_config.toml"),
        Err(ForecastError::ConfigError(_))
    ));
}
