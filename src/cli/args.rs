use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-digest")]
#[command(about = "Year-filtered statistics over a daily weather table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress spinners")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file (TOML, JSON or YAML); WEATHER_DIGEST_* env vars override it"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the years present in the dataset
    Years {
        #[arg(short, long, help = "Input CSV file")]
        input: PathBuf,
    },

    /// Compute aggregate statistics for the selected years
    Summary {
        #[arg(short, long, help = "Input CSV file")]
        input: PathBuf,

        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "Years to include, comma separated [default: every year in the file]"
        )]
        years: Vec<i32>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[arg(long, help = "Rolling wind window in days [default: 7]")]
        window: Option<usize>,

        #[arg(long, default_value = "0", help = "Print the N most recent rows")]
        sample: usize,

        #[arg(short, long, help = "Also write the JSON report to this file")]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Memory-map the input file")]
        mmap: bool,
    },

    /// Write the filtered daily table with rolling wind to Parquet
    Export {
        #[arg(short, long, help = "Input CSV file")]
        input: PathBuf,

        #[arg(short, long, value_delimiter = ',')]
        years: Vec<i32>,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/weather-digest-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long)]
        window: Option<usize>,
    },

    /// Check the dataset for implausible values and missing days
    Validate {
        #[arg(short, long, help = "Input CSV file")]
        input: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display information about an exported Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_years() {
        let cli = Cli::try_parse_from([
            "weather-digest",
            "summary",
            "-i",
            "seattle-weather.csv",
            "--years",
            "2012,2014",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Summary { years, format, window, .. } => {
                assert_eq!(years, vec![2012, 2014]);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(window, None);
            }
            _ => panic!("expected summary command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "weather-digest",
            "years",
            "-i",
            "data.csv",
            "--verbose",
            "--config",
            "digest.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("digest.toml")));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
