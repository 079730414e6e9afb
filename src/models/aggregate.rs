use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::Serializer;
use serde::Serialize;

use crate::models::YearSelection;

/// Scalar reductions over a filtered dataset.
///
/// Means are `None` for an empty dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub avg_temp: Option<f64>,
    pub total_precipitation: f64,
    pub avg_wind: Option<f64>,
    pub rainy_day_count: usize,
    pub total_day_count: usize,
}

impl Summary {
    pub fn rainy_day_percentage(&self) -> Option<f64> {
        if self.total_day_count == 0 {
            return None;
        }
        Some(self.rainy_day_count as f64 / self.total_day_count as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: f64,
}

/// Day counts and rounded percentages keyed by weather label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeatherBreakdown {
    pub categories: BTreeMap<String, CategoryShare>,
}

impl WeatherBreakdown {
    pub fn get(&self, label: &str) -> Option<&CategoryShare> {
        self.categories.get(label)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.categories.values().map(|s| s.count).sum()
    }

    pub fn total_percentage(&self) -> f64 {
        self.categories.values().map(|s| s.percentage).sum()
    }

    /// Most frequent first; equal counts fall back to label order.
    pub fn ranked(&self) -> Vec<(&str, &CategoryShare)> {
        let mut entries: Vec<(&str, &CategoryShare)> = self
            .categories
            .iter()
            .map(|(label, share)| (label.as_str(), share))
            .collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

/// Precipitation totals per (year, month).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyPrecipitation {
    pub totals: BTreeMap<YearMonth, f64>,
}

impl MonthlyPrecipitation {
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        self.totals.get(&YearMonth::new(year, month)).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }
}

// JSON object keys must be strings, so emit a list of rows instead.
impl Serialize for MonthlyPrecipitation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Row {
            year: i32,
            month: u32,
            precipitation: f64,
        }

        serializer.collect_seq(self.totals.iter().map(|(key, total)| Row {
            year: key.year,
            month: key.month,
            precipitation: *total,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingWindPoint {
    pub date: NaiveDate,
    pub wind: f64,
    pub wind_avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixShare {
    pub count: usize,
    pub proportion: f64,
}

/// Weather categories within one calendar month, pooled over years.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthMix {
    pub total_days: usize,
    pub categories: BTreeMap<String, MixShare>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlyWeatherMix {
    pub months: BTreeMap<u32, MonthMix>,
}

impl MonthlyWeatherMix {
    pub fn month(&self, month: u32) -> Option<&MonthMix> {
        self.months.get(&month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    pub year: i32,
    pub temp_max: f64,
    pub temp_min: f64,
    pub spread: f64,
}

/// Everything a presentation layer needs for one year selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub selected_years: YearSelection,
    pub summary: Summary,
    pub weather_breakdown: WeatherBreakdown,
    pub monthly_precipitation: MonthlyPrecipitation,
    pub monthly_weather: MonthlyWeatherMix,
    pub rolling_window: usize,
    pub wind_rolling_7d: Vec<RollingWindPoint>,
    pub daily_temperature: Vec<DailyTemperature>,
}
