//! Command line front end for the property price forecast.
//!
//! ```text
//! property_forecast [--config forecast.toml] forecast --area "Business Bay" \
//!     --procedure-area 88 --rooms "1 B/R" --floor-bin 11-20 --parking
//! property_forecast areas
//! property_forecast check
//! property_forecast ranges --area "Business Bay"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use property_forecast::area::Area;
use property_forecast::config::ForecastConfig;
use property_forecast::encoding::PROCEDURE_AREA;
use property_forecast::features::PropertyFeatureRecord;
use property_forecast::pipeline::{forecast_from_disk, ForecastOutcome};
use property_forecast::ranges::{InputRanges, FLOOR_BIN_FIELD, ROOMS_FIELD};

#[derive(Parser)]
#[command(
    name = "property_forecast",
    about = "Forecast median property prices per area"
)]
struct Cli {
    /// TOML configuration file; defaults apply relative to the working directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict and print the price series for one property
    Forecast {
        /// Area name, with spaces or underscores
        #[arg(long)]
        area: String,
        /// Property size in square metres
        #[arg(long)]
        procedure_area: f64,
        /// Room type, e.g. "1 B/R" or "Studio"
        #[arg(long)]
        rooms: String,
        /// Floor bin, e.g. "11-20" or "Top floor"
        #[arg(long)]
        floor_bin: String,
        /// Has parking
        #[arg(long)]
        parking: bool,
        /// Has a swimming pool
        #[arg(long)]
        pool: bool,
        /// Has a balcony
        #[arg(long)]
        balcony: bool,
        /// Has an elevator
        #[arg(long)]
        elevator: bool,
        /// Close to a metro station
        #[arg(long)]
        metro: bool,
        /// Write the full series to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Number of trailing points to print
        #[arg(long, default_value = "10")]
        tail: usize,
    },
    /// List areas that have a model
    Areas,
    /// Compare the model and trained-columns directories
    Check,
    /// Show the observed input ranges of an area
    Ranges {
        /// Area name, with spaces or underscores
        #[arg(long)]
        area: String,
    },
}

fn main() -> ExitCode {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ForecastConfig::from_file(path)?,
        None => ForecastConfig::default(),
    };

    match cli.command {
        Commands::Forecast {
            area,
            procedure_area,
            rooms,
            floor_bin,
            parking,
            pool,
            balcony,
            elevator,
            metro,
            output,
            tail,
        } => {
            let record = PropertyFeatureRecord::new()
                .with_field(&config.area_field, area.as_str())
                .with_field(PROCEDURE_AREA, procedure_area)
                .with_field(ROOMS_FIELD, rooms.as_str())
                .with_field(FLOOR_BIN_FIELD, floor_bin.as_str())
                .with_field("has_parking", parking)
                .with_field("swimming_pool", pool)
                .with_field("balcony", balcony)
                .with_field("elevator", elevator)
                .with_field("metro", metro);

            match forecast_from_disk(&config, &record)? {
                ForecastOutcome::Series(series) => {
                    if series.is_empty() {
                        println!("No historical or forecast data for {}", Area::new(&area));
                        return Ok(ExitCode::SUCCESS);
                    }

                    println!("Last {} months for {}:", tail.min(series.len()), Area::new(&area));
                    println!("{:<10} {:>14}", "MONTH", "MEDIAN_PRICE");
                    for point in series.tail(tail) {
                        println!("{:<10} {:>14.2}", point.month, point.median_price);
                    }

                    if let Some(path) = output {
                        series.to_csv_file(&path)?;
                        println!("\nWrote {} points to {}", series.len(), path.display());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                ForecastOutcome::NoResult(no_result) => {
                    eprintln!("{no_result}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Areas => {
            let areas = config.resolver().available_areas()?;
            if areas.is_empty() {
                println!("No models found in {}", config.resolve(&config.models_dir).display());
                return Ok(ExitCode::SUCCESS);
            }

            for area in &areas {
                println!("{area}");
            }
            println!("\n{} area(s)", areas.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let report = config.resolver().check_consistency()?;
            println!("{} area(s) with a model", report.model_areas.len());

            for area in &report.missing_columns {
                println!("Trained columns file missing for area: {area}");
            }
            for area in &report.missing_models {
                println!("Model file missing for area: {area}");
            }

            if report.is_consistent() {
                println!("Model and trained-columns directories agree");
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Ranges { area } => {
            let Some(path) = &config.ranges_table else {
                eprintln!("No ranges_table configured");
                return Ok(ExitCode::FAILURE);
            };

            let ranges = InputRanges::from_csv(config.resolve(path))?;
            let area = Area::new(&area);
            let Some(range) = ranges.for_area(&area) else {
                eprintln!("No input ranges for area: {area}");
                return Ok(ExitCode::FAILURE);
            };

            println!("Area:           {}", range.area);
            println!("{PROCEDURE_AREA}: {} .. {} (median {})", range.min, range.max, range.median);
            println!("{ROOMS_FIELD}:       {}", range.room_options().join(", "));
            println!("{FLOOR_BIN_FIELD}:      {}", range.floor_bin_options().join(", "));
            Ok(ExitCode::SUCCESS)
        }
    }
}
