use crate::error::{ProcessingError, Result};
use crate::models::{WeatherDataset, WeatherRecord};
use crate::utils::constants::{CSV_COLUMNS, DATE_FORMAT, DEFAULT_BUFFER_SIZE};
use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8};
use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// Some exports of the dataset use slashes in the date column
const ALT_DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    precipitation: Option<f64>,
    temp_max: Option<f64>,
    temp_min: Option<f64>,
    wind: Option<f64>,
    weather: Option<String>,
}

/// Reads the daily weather table from a CSV file.
#[derive(Debug, Clone)]
pub struct WeatherCsvReader {
    use_mmap: bool,
    fallback_encoding: &'static Encoding,
}

impl WeatherCsvReader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            fallback_encoding: UTF_8,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Encoding assumed when the file carries no byte-order mark.
    pub fn with_encoding(mut self, label: &str) -> Result<Self> {
        self.fallback_encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            ProcessingError::Config(format!("Unsupported input encoding: {}", label))
        })?;
        Ok(self)
    }

    pub fn read_dataset(&self, path: &Path) -> Result<WeatherDataset> {
        let records = self.read_records(path)?;
        debug!("Read {} records from {}", records.len(), path.display());
        WeatherDataset::new(records)
    }

    /// Load on the blocking pool so an async caller's runtime is not stalled.
    pub async fn read_dataset_async(&self, path: PathBuf) -> Result<WeatherDataset> {
        let reader = self.clone();
        tokio::task::spawn_blocking(move || reader.read_dataset(&path)).await?
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<WeatherRecord>> {
        if self.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            self.parse_bytes(&mmap)
        } else {
            let mut file = File::open(path)?;
            let mut bytes = Vec::with_capacity(DEFAULT_BUFFER_SIZE);
            file.read_to_end(&mut bytes)?;
            self.parse_bytes(&bytes)
        }
    }

    fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<WeatherRecord>> {
        let (text, encoding, had_errors) = self.fallback_encoding.decode(bytes);
        if had_errors {
            // The header is line 0, so a line index is also a data row number
            let row = text
                .find(char::REPLACEMENT_CHARACTER)
                .map(|pos| text[..pos].matches('\n').count())
                .unwrap_or(0);
            warn!("Undecodable bytes near row {} of input", row);
            return Err(ProcessingError::malformed(
                row,
                format!("contains bytes that are not valid {}", encoding.name()),
            ));
        }
        self.parse_str(&text)
    }

    /// Parse CSV text with a header row into records, in file order.
    pub fn parse_str(&self, content: &str) -> Result<Vec<WeatherRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = CSV_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<RawRow>().enumerate() {
            let row_number = i + 1;
            let raw =
                row.map_err(|e| ProcessingError::malformed(row_number, csv_reason(&e, &headers)))?;
            let record = Self::convert_row(raw, row_number)?;
            record.check_well_formed(row_number)?;
            records.push(record);
        }

        Ok(records)
    }

    fn convert_row(raw: RawRow, row: usize) -> Result<WeatherRecord> {
        let date = parse_date(&raw.date)
            .ok_or_else(|| ProcessingError::malformed(row, format!("invalid date '{}'", raw.date)))?;

        let require = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| ProcessingError::malformed(row, format!("missing {}", name)))
        };

        let weather = raw
            .weather
            .filter(|w| !w.is_empty())
            .ok_or_else(|| ProcessingError::malformed(row, "missing weather"))?;

        Ok(WeatherRecord {
            date,
            precipitation: require(raw.precipitation, "precipitation")?,
            temp_max: require(raw.temp_max, "temp_max")?,
            temp_min: require(raw.temp_min, "temp_min")?,
            wind: require(raw.wind, "wind")?,
            weather,
        })
    }
}

impl Default for WeatherCsvReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    // Timestamps such as "2012-01-01 00:00:00" keep only the date part
    let value = value.split_whitespace().next().unwrap_or(value);
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, ALT_DATE_FORMAT))
        .ok()
}

fn csv_reason(error: &csv::Error, headers: &csv::StringRecord) -> String {
    match error.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(index) => {
                let column = headers.get(index as usize).unwrap_or("?");
                format!("column {} ({}): {}", index + 1, column, err.kind())
            }
            None => err.kind().to_string(),
        },
        _ => error.to_string(),
    }
}
