/// Input columns, in the order the dataset publishes them
pub const CSV_COLUMNS: [&str; 6] = [
    "date",
    "precipitation",
    "temp_max",
    "temp_min",
    "wind",
    "weather",
];

/// Date format of the `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Analysis defaults
pub const DEFAULT_ROLLING_WINDOW: usize = 7;
pub const DEFAULT_PERCENTAGE_DECIMALS: u32 = 1;
pub const MAX_PERCENTAGE_DECIMALS: u32 = 6;
pub const DEFAULT_RAIN_THRESHOLD_MM: f64 = 0.0;
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "WEATHER_DIGEST";

/// Plausibility limits used by the integrity checker
pub const MIN_PLAUSIBLE_TEMP: f64 = -50.0;
pub const MAX_PLAUSIBLE_TEMP: f64 = 50.0;
pub const MAX_PLAUSIBLE_WIND: f64 = 50.0; // m/s
pub const MAX_PLAUSIBLE_PRECIP: f64 = 500.0; // mm per day

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const PARALLEL_CHECK_THRESHOLD: usize = 10_000;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
pub const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
