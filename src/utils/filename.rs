use chrono::{Local, NaiveDate};
use std::path::PathBuf;

const EXPORT_DIR: &str = "output";
const EXPORT_STEM: &str = "weather-digest";

/// `output/weather-digest-{YYMMDD}.parquet`, stamped with today's local date.
pub fn generate_default_export_filename() -> PathBuf {
    export_filename_for(Local::now().date_naive())
}

fn export_filename_for(date: NaiveDate) -> PathBuf {
    PathBuf::from(EXPORT_DIR).join(format!("{}-{}.parquet", EXPORT_STEM, date.format("%y%m%d")))
}
