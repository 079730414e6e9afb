use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// Weather labels seen in the Seattle daily dataset. The set is open; any
/// other non-empty label is accepted as-is.
pub const KNOWN_WEATHER_LABELS: [&str; 5] = ["sun", "rain", "snow", "fog", "drizzle"];

/// One calendar day of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherRecord {
    pub date: NaiveDate,

    // Daily total (mm)
    #[validate(range(min = 0.0))]
    pub precipitation: f64,

    // Daily extremes (°C)
    pub temp_max: f64,
    pub temp_min: f64,

    // Daily mean wind speed (m/s)
    #[validate(range(min = 0.0))]
    pub wind: f64,

    #[validate(length(min = 1))]
    pub weather: String,
}

impl WeatherRecord {
    pub fn new(
        date: NaiveDate,
        precipitation: f64,
        temp_max: f64,
        temp_min: f64,
        wind: f64,
        weather: impl Into<String>,
    ) -> Self {
        Self {
            date,
            precipitation,
            temp_max,
            temp_min,
            wind,
            weather: weather.into(),
        }
    }

    pub fn builder() -> WeatherRecordBuilder {
        WeatherRecordBuilder::new()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn is_rainy(&self, threshold_mm: f64) -> bool {
        self.precipitation > threshold_mm
    }

    pub fn temperature_spread(&self) -> f64 {
        self.temp_max - self.temp_min
    }

    pub fn has_known_label(&self) -> bool {
        KNOWN_WEATHER_LABELS.contains(&self.weather.as_str())
    }

    /// Reject values that would silently poison the aggregates.
    ///
    /// `row` is the 1-based position used in the resulting error.
    pub fn check_well_formed(&self, row: usize) -> Result<()> {
        let numeric = [
            ("precipitation", self.precipitation),
            ("temp_max", self.temp_max),
            ("temp_min", self.temp_min),
            ("wind", self.wind),
        ];

        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(ProcessingError::malformed(
                    row,
                    format!("{} is not a finite number ({})", name, value),
                ));
            }
        }

        self.validate()
            .map_err(|e| ProcessingError::malformed(row, format!("{} on {}", e, self.date)))
    }
}

#[derive(Default)]
pub struct WeatherRecordBuilder {
    date: Option<NaiveDate>,
    precipitation: Option<f64>,
    temp_max: Option<f64>,
    temp_min: Option<f64>,
    wind: Option<f64>,
    weather: Option<String>,
}

impl WeatherRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn precipitation(mut self, precip: f64) -> Self {
        self.precipitation = Some(precip);
        self
    }

    pub fn temperatures(mut self, min: f64, max: f64) -> Self {
        self.temp_min = Some(min);
        self.temp_max = Some(max);
        self
    }

    pub fn wind(mut self, speed: f64) -> Self {
        self.wind = Some(speed);
        self
    }

    pub fn weather(mut self, label: impl Into<String>) -> Self {
        self.weather = Some(label.into());
        self
    }

    pub fn build(self) -> Result<WeatherRecord> {
        let record = WeatherRecord {
            date: self
                .date
                .ok_or_else(|| ProcessingError::malformed(0, "missing date"))?,
            precipitation: self
                .precipitation
                .ok_or_else(|| ProcessingError::malformed(0, "missing precipitation"))?,
            temp_max: self
                .temp_max
                .ok_or_else(|| ProcessingError::malformed(0, "missing temp_max"))?,
            temp_min: self
                .temp_min
                .ok_or_else(|| ProcessingError::malformed(0, "missing temp_min"))?,
            wind: self
                .wind
                .ok_or_else(|| ProcessingError::malformed(0, "missing wind"))?,
            weather: self
                .weather
                .ok_or_else(|| ProcessingError::malformed(0, "missing weather"))?,
        };

        record.check_well_formed(0)?;
        Ok(record)
    }
}
