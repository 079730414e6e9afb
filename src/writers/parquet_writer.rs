use crate::error::{ProcessingError, Result};
use crate::models::{WeatherDataset, WeatherRecord};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE, UNIX_EPOCH_DAYS_FROM_CE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Writes the filtered daily table, with its smoothed wind column, to Parquet.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write one row per record; `wind_avg` must be aligned with `dataset`.
    pub fn write_daily(&self, dataset: &WeatherDataset, wind_avg: &[f64], path: &Path) -> Result<()> {
        if wind_avg.len() != dataset.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Rolling wind series has {} values for {} records",
                wind_avg.len(),
                dataset.len()
            )));
        }

        let schema = Self::create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let records = dataset.records();
        for (chunk, smoothed) in records
            .chunks(self.row_group_size)
            .zip(wind_avg.chunks(self.row_group_size))
        {
            let batch = Self::records_to_batch(chunk, smoothed, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        info!("Wrote {} rows to {}", records.len(), path.display());
        Ok(())
    }

    fn create_schema() -> Arc<Schema> {
        let fields = vec![
            Field::new("date", DataType::Date32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::UInt32, false),
            Field::new("precipitation", DataType::Float64, false),
            Field::new("temp_max", DataType::Float64, false),
            Field::new("temp_min", DataType::Float64, false),
            Field::new("wind", DataType::Float64, false),
            Field::new("weather", DataType::Utf8, false),
            Field::new("wind_avg_7d", DataType::Float64, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(
        records: &[WeatherRecord],
        wind_avg: &[f64],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let dates: Vec<i32> = records
            .iter()
            .map(|r| r.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let years: Vec<i32> = records.iter().map(|r| r.year()).collect();
        let months: Vec<u32> = records.iter().map(|r| r.month()).collect();
        let precipitation: Vec<f64> = records.iter().map(|r| r.precipitation).collect();
        let temp_max: Vec<f64> = records.iter().map(|r| r.temp_max).collect();
        let temp_min: Vec<f64> = records.iter().map(|r| r.temp_min).collect();
        let wind: Vec<f64> = records.iter().map(|r| r.wind).collect();
        let weather: Vec<&str> = records.iter().map(|r| r.weather.as_str()).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Date32Array::from(dates)),
                Arc::new(Int32Array::from(years)),
                Arc::new(UInt32Array::from(months)),
                Arc::new(Float64Array::from(precipitation)),
                Arc::new(Float64Array::from(temp_max)),
                Arc::new(Float64Array::from(temp_min)),
                Arc::new(Float64Array::from(wind)),
                Arc::new(StringArray::from(weather)),
                Arc::new(Float64Array::from(wind_avg.to_vec())),
            ],
        )?;

        Ok(batch)
    }

    /// Read an exported file back into a dataset (the smoothed column is dropped).
    pub fn read_daily(&self, path: &Path) -> Result<WeatherDataset> {
        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();
        for batch_result in parquet_reader {
            let batch = batch_result?;

            let dates = column::<Date32Array>(&batch, "date")?;
            let precipitation = column::<Float64Array>(&batch, "precipitation")?;
            let temp_max = column::<Float64Array>(&batch, "temp_max")?;
            let temp_min = column::<Float64Array>(&batch, "temp_min")?;
            let wind = column::<Float64Array>(&batch, "wind")?;
            let weather = column::<StringArray>(&batch, "weather")?;

            for i in 0..batch.num_rows() {
                let date = NaiveDate::from_num_days_from_ce_opt(
                    dates.value(i) + UNIX_EPOCH_DAYS_FROM_CE,
                )
                .ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!("Invalid date value {}", dates.value(i)))
                })?;

                records.push(WeatherRecord::new(
                    date,
                    precipitation.value(i),
                    temp_max.value(i),
                    temp_min.value(i),
                    wind.value(i),
                    weather.value(i),
                ));
            }
        }

        WeatherDataset::new(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            Some(metadata.row_group(0).column(0).compression())
        } else {
            None
        };

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Missing or invalid {} column", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Option<Compression>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        let compression = self
            .compression
            .map(|c| format!("{:?}", c))
            .unwrap_or_else(|| "n/a".to_string());

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            compression,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::rolling_wind_average;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn sample_dataset(days: i64) -> WeatherDataset {
        let start = NaiveDate::from_ymd_opt(2012, 12, 28).unwrap();
        let records = (0..days)
            .map(|i| {
                WeatherRecord::new(
                    start + Duration::days(i),
                    (i % 3) as f64,
                    10.0 + i as f64 * 0.5,
                    1.0,
                    2.0 + (i % 4) as f64,
                    if i % 2 == 0 { "rain" } else { "sun" },
                )
            })
            .collect();
        WeatherDataset::new(records).unwrap()
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let dataset = sample_dataset(10);
        let smoothed = rolling_wind_average(&dataset, 7)?;
        let temp_file = NamedTempFile::new()?;

        let writer = ParquetWriter::new().with_row_group_size(4);
        writer.write_daily(&dataset, &smoothed, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 10);
        assert_eq!(info.row_groups, 3);
        assert_eq!(info.row_group_sizes, vec![4, 4, 2]);

        let restored = writer.read_daily(temp_file.path())?;
        assert_eq!(restored, dataset);
        Ok(())
    }

    #[test]
    fn test_write_empty_dataset() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();
        writer.write_daily(&WeatherDataset::default(), &[], temp_file.path())?;

        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 0);
        assert!(writer.read_daily(temp_file.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_misaligned_series_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        let result = ParquetWriter::new().write_daily(&sample_dataset(3), &[1.0], temp_file.path());
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let dataset = sample_dataset(5);
        let smoothed = rolling_wind_average(&dataset, 7)?;

        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_daily(&dataset, &smoothed, temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-ish").is_err());
        Ok(())
    }
}
