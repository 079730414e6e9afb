use crate::analyzers::{available_years, filter_by_years, rolling_wind_average, WeatherAggregator};
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::cli::report::{render_rows, render_text};
use crate::error::Result;
use crate::models::{WeatherDataset, YearSelection};
use crate::processors::IntegrityChecker;
use crate::readers::WeatherCsvReader;
use crate::settings::AnalysisSettings;
use crate::utils::filename::generate_default_export_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{JsonReportWriter, ParquetWriter};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, Level};

pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // A second init (e.g. in tests) keeps the first subscriber
    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = installed {
        debug!("Keeping the existing tracing subscriber: {}", e);
    }
    Ok(())
}

/// Explicit years, or every year in the dataset when none were given.
fn resolve_selection(dataset: &WeatherDataset, years: Vec<i32>) -> Result<YearSelection> {
    if years.is_empty() {
        YearSelection::new(available_years(dataset))
    } else {
        YearSelection::new(years)
    }
}

async fn load(
    input: &Path,
    settings: &AnalysisSettings,
    mmap: bool,
    quiet: bool,
) -> Result<WeatherDataset> {
    let progress = ProgressReporter::new_spinner("Loading weather data...", quiet);
    let reader = WeatherCsvReader::new()
        .with_mmap(mmap)
        .with_encoding(&settings.encoding)?;
    progress.set_message(&format!("Reading {}...", input.display()));
    let dataset = reader.read_dataset_async(input.to_path_buf()).await?;
    progress.finish_with_message(&format!("Loaded {} records", dataset.len()));

    if let Some((first, last)) = dataset.date_range() {
        info!(
            "Loaded {} records from {} ({} to {})",
            dataset.len(),
            input.display(),
            first,
            last
        );
    }
    Ok(dataset)
}

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = AnalysisSettings::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Years { input } => {
            let dataset = load(&input, &settings, false, quiet).await?;
            let years: Vec<String> = available_years(&dataset)
                .into_iter()
                .map(|y| y.to_string())
                .collect();
            println!("{}", years.join("\n"));
        }

        Commands::Summary {
            input,
            years,
            format,
            window,
            sample,
            output_file,
            mmap,
        } => {
            let settings = settings.with_rolling_window(window);
            let dataset = load(&input, &settings, mmap, quiet).await?;
            let selection = resolve_selection(&dataset, years)?;

            let aggregator = WeatherAggregator::from_settings(&settings);
            let result = aggregator.aggregate(&dataset, &selection)?;

            match format {
                OutputFormat::Text => println!("{}", render_text(&result)),
                OutputFormat::Json => println!("{}", JsonReportWriter::new().render(&result)?),
            }

            if sample > 0 {
                let filtered = filter_by_years(&dataset, &selection);
                let newest = filtered.newest_first();
                let shown = &newest[..sample.min(newest.len())];
                println!("Raw data ({} most recent rows):", shown.len());
                println!("{}", render_rows(shown));
            }

            if let Some(path) = output_file {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                JsonReportWriter::new().write(&result, &path)?;
            }
        }

        Commands::Export {
            input,
            years,
            output_file,
            compression,
            window,
        } => {
            let settings = settings.with_rolling_window(window);
            let dataset = load(&input, &settings, false, quiet).await?;
            let selection = resolve_selection(&dataset, years)?;
            let filtered = filter_by_years(&dataset, &selection);
            let smoothed = rolling_wind_average(&filtered, settings.rolling_window)?;

            let output_file = output_file.unwrap_or_else(generate_default_export_filename);
            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let writer = ParquetWriter::new().with_compression(&compression)?;
            writer.write_daily(&filtered, &smoothed, &output_file)?;

            let file_info = writer.get_file_info(&output_file)?;
            println!("{}", file_info.summary());
            println!("Exported years: {}", selection.label());
        }

        Commands::Validate { input, max_workers } => {
            let dataset = load(&input, &settings, false, quiet).await?;

            let checker = IntegrityChecker::with_max_workers(max_workers);
            let report = checker.check(&dataset)?;
            println!("{}", checker.generate_summary(&report));

            if report.is_clean() {
                println!("✅ All records passed integrity checks");
            } else {
                println!(
                    "⚠️  Found {} issue(s)",
                    report.violations.len() + report.missing_days.len()
                );
            }
        }

        Commands::Info { file, sample } => {
            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("{}", file_info.summary());

            let dataset = writer.read_daily(&file)?;
            if dataset.is_empty() {
                println!("\nFile contains no records");
                return Ok(());
            }

            let selection = YearSelection::new(available_years(&dataset))?;
            let result = WeatherAggregator::from_settings(&settings).aggregate(&dataset, &selection)?;
            println!("\n{}", render_text(&result));

            if sample > 0 {
                let newest = dataset.newest_first();
                let shown = &newest[..sample.min(newest.len())];
                println!("Sample Records (showing {} records):", shown.len());
                println!("{}", render_rows(shown));
            }
        }
    }

    Ok(())
}
