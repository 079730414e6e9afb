use chrono::{Datelike, Duration, NaiveDate};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use weather_digest::analyzers::{filter_by_years, rolling_wind_average};
use weather_digest::cli::{run, Cli};
use weather_digest::readers::WeatherCsvReader;
use weather_digest::writers::ParquetWriter;
use weather_digest::{ProcessingError, WeatherAggregator, YearSelection};

use clap::Parser;

/// Two full years of synthetic Seattle-like rows, 2012 being a leap year.
fn write_fixture_csv() -> NamedTempFile {
    let labels = ["rain", "sun", "drizzle", "rain", "fog", "sun", "snow"];
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "date,precipitation,temp_max,temp_min,wind,weather").unwrap();

    let start = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
    for i in 0..731i64 {
        let date = start + Duration::days(i);
        let precipitation = if i % 3 == 0 { 0.0 } else { (i % 7) as f64 * 0.5 };
        writeln!(
            file,
            "{},{:.1},{:.1},{:.1},{:.1},{}",
            date,
            precipitation,
            8.0 + (i % 20) as f64,
            1.0 + (i % 10) as f64,
            1.0 + (i % 6) as f64 * 0.5,
            labels[i as usize % labels.len()]
        )
        .unwrap();
    }
    file
}

#[test]
fn test_csv_to_aggregate() {
    let csv = write_fixture_csv();
    let dataset = WeatherCsvReader::new().read_dataset(csv.path()).unwrap();
    assert_eq!(dataset.len(), 731);

    let selection = YearSelection::new([2012]).unwrap();
    let result = WeatherAggregator::new().aggregate(&dataset, &selection).unwrap();

    assert_eq!(result.summary.total_day_count, 366);
    assert_eq!(result.weather_breakdown.total_count(), 366);
    assert!((result.weather_breakdown.total_percentage() - 100.0).abs() <= 0.1);
    assert_eq!(result.monthly_precipitation.len(), 12);
    assert_eq!(result.wind_rolling_7d.len(), 366);
    assert!(result.wind_rolling_7d.iter().all(|p| p.date.year() == 2012));

    let filtered = filter_by_years(&dataset, &selection);
    let expected_precip: f64 = filtered.iter().map(|r| r.precipitation).sum();
    assert!((result.summary.total_precipitation - expected_precip).abs() < 1e-9);
    assert!((result.monthly_precipitation.grand_total() - expected_precip).abs() < 1e-9);
}

#[test]
fn test_first_day_of_year_is_unsmoothed() {
    let csv = write_fixture_csv();
    let dataset = WeatherCsvReader::new().read_dataset(csv.path()).unwrap();
    let smoothed = rolling_wind_average(&dataset, 7).unwrap();

    let jan_first_2013 = dataset
        .iter()
        .position(|r| r.date == NaiveDate::from_ymd_opt(2013, 1, 1).unwrap())
        .unwrap();
    assert_eq!(smoothed[jan_first_2013], dataset.records()[jan_first_2013].wind);
}

#[test]
fn test_malformed_csv_fails_fast() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,precipitation,temp_max,temp_min,wind,weather").unwrap();
    writeln!(file, "2012-01-01,0.0,12.8,5.0,4.7,drizzle").unwrap();
    writeln!(file, "2012-01-02,-3.0,10.6,2.8,4.5,rain").unwrap();

    let result = WeatherCsvReader::new().read_dataset(file.path());
    assert!(matches!(
        result,
        Err(ProcessingError::MalformedRecord { row: 2, .. })
    ));
}

#[tokio::test]
async fn test_export_and_info_commands() {
    let csv = write_fixture_csv();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("exports").join("digest.parquet");

    let cli = Cli::try_parse_from([
        "weather-digest",
        "--quiet",
        "export",
        "-i",
        csv.path().to_str().unwrap(),
        "-y",
        "2013",
        "-o",
        output.to_str().unwrap(),
        "-c",
        "zstd",
    ])
    .unwrap();
    run(cli).await.unwrap();

    let writer = ParquetWriter::new();
    let info = writer.get_file_info(&output).unwrap();
    assert_eq!(info.total_rows, 365);

    let restored = writer.read_daily(&output).unwrap();
    assert!(restored.iter().all(|r| r.year() == 2013));

    let cli = Cli::try_parse_from([
        "weather-digest",
        "--quiet",
        "info",
        "-f",
        output.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).await.unwrap();
}

#[tokio::test]
async fn test_summary_command_writes_json() {
    let csv = write_fixture_csv();
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.json");

    let cli = Cli::try_parse_from([
        "weather-digest",
        "--quiet",
        "summary",
        "-i",
        csv.path().to_str().unwrap(),
        "--format",
        "json",
        "--window",
        "3",
        "-o",
        report.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).await.unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["selected_years"], serde_json::json!([2012, 2013]));
    assert_eq!(value["rolling_window"], 3);
    assert_eq!(value["summary"]["total_day_count"], 731);
}

#[tokio::test]
async fn test_summary_rejects_zero_window() {
    let csv = write_fixture_csv();
    let cli = Cli::try_parse_from([
        "weather-digest",
        "--quiet",
        "summary",
        "-i",
        csv.path().to_str().unwrap(),
        "--window",
        "0",
    ])
    .unwrap();

    assert!(matches!(
        run(cli).await,
        Err(ProcessingError::InvalidWindow(0))
    ));
}
