use crate::error::{ProcessingError, Result};
use crate::models::{
    AggregateResult, CategoryShare, DailyTemperature, MixShare, MonthMix, MonthlyPrecipitation,
    MonthlyWeatherMix, RollingWindPoint, Summary, WeatherBreakdown, WeatherDataset, YearMonth,
    YearSelection,
};
use crate::settings::AnalysisSettings;
use crate::utils::constants::{
    DEFAULT_PERCENTAGE_DECIMALS, DEFAULT_RAIN_THRESHOLD_MM, DEFAULT_ROLLING_WINDOW,
    MAX_PERCENTAGE_DECIMALS,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Keep the records whose calendar year is selected, preserving order.
///
/// Selecting only years absent from the dataset yields an empty dataset.
pub fn filter_by_years(dataset: &WeatherDataset, years: &YearSelection) -> WeatherDataset {
    let records = dataset
        .iter()
        .filter(|r| years.contains(r.year()))
        .cloned()
        .collect();
    WeatherDataset::from_ordered(records)
}

/// Sorted distinct years present in the dataset.
pub fn available_years(dataset: &WeatherDataset) -> Vec<i32> {
    dataset
        .iter()
        .map(|r| r.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sum precipitation per (year, month).
pub fn monthly_precipitation(filtered: &WeatherDataset) -> MonthlyPrecipitation {
    let mut totals: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for record in filtered {
        *totals
            .entry(YearMonth::new(record.year(), record.month()))
            .or_insert(0.0) += record.precipitation;
    }
    MonthlyPrecipitation { totals }
}

/// Trailing mean of wind over the last `window` days, restarted each year.
///
/// Early days of a year average over however many days have been seen so
/// far. The output has one value per input record, in input order.
pub fn rolling_wind_average(filtered: &WeatherDataset, window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(ProcessingError::InvalidWindow(window));
    }

    let records = filtered.records();
    let mut by_year: HashMap<i32, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        by_year.entry(record.year()).or_default().push(i);
    }

    let mut smoothed = vec![0.0; records.len()];
    for indices in by_year.values_mut() {
        indices.sort_by_key(|&i| records[i].date);

        for (pos, &idx) in indices.iter().enumerate() {
            let start = (pos + 1).saturating_sub(window);
            let span = &indices[start..=pos];
            let sum: f64 = span.iter().map(|&j| records[j].wind).sum();
            smoothed[idx] = sum / span.len() as f64;
        }
    }

    Ok(smoothed)
}

/// Per calendar month (pooled over years): how many days fell in each
/// weather category and what fraction of that month's days they make up.
pub fn monthly_weather_mix(filtered: &WeatherDataset) -> MonthlyWeatherMix {
    let mut counts: BTreeMap<u32, BTreeMap<String, usize>> = BTreeMap::new();
    for record in filtered {
        *counts
            .entry(record.month())
            .or_default()
            .entry(record.weather.clone())
            .or_insert(0) += 1;
    }

    let months = counts
        .into_iter()
        .map(|(month, categories)| {
            let total_days: usize = categories.values().sum();
            let categories = categories
                .into_iter()
                .map(|(label, count)| {
                    let proportion = count as f64 / total_days as f64;
                    (label, MixShare { count, proportion })
                })
                .collect();
            (
                month,
                MonthMix {
                    total_days,
                    categories,
                },
            )
        })
        .collect();

    MonthlyWeatherMix { months }
}

pub fn daily_temperature_range(filtered: &WeatherDataset) -> Vec<DailyTemperature> {
    filtered
        .iter()
        .map(|r| DailyTemperature {
            date: r.date,
            year: r.year(),
            temp_max: r.temp_max,
            temp_min: r.temp_min,
            spread: r.temperature_spread(),
        })
        .collect()
}

/// Split 100% across `counts` in steps of `10^-decimals` percent.
///
/// Largest-remainder rounding: every share is its exact value rounded down or
/// up by one step, and the shares always add up to exactly 100.
fn apportion_percentages(counts: &[(&str, usize)], decimals: u32) -> Vec<f64> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    let scale = 10f64.powi(decimals as i32);
    let total_units = (100.0 * scale).round() as u64;

    let exact: Vec<f64> = counts
        .iter()
        .map(|(_, count)| *count as f64 * total_units as f64 / total as f64)
        .collect();
    let mut units: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let rem_a = exact[a] - units[a] as f64;
        let rem_b = exact[b] - units[b] as f64;
        rem_b
            .total_cmp(&rem_a)
            .then_with(|| counts[a].0.cmp(counts[b].0))
    });

    let leftover = total_units.saturating_sub(units.iter().sum());
    for &i in order.iter().take(leftover as usize) {
        units[i] += 1;
    }

    units.into_iter().map(|u| u as f64 / scale).collect()
}

/// Computes the dashboard aggregates for a year selection.
#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    rolling_window: usize,
    percentage_decimals: u32,
    rain_threshold_mm: f64,
}

impl WeatherAggregator {
    pub fn new() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            percentage_decimals: DEFAULT_PERCENTAGE_DECIMALS,
            rain_threshold_mm: DEFAULT_RAIN_THRESHOLD_MM,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self {
            rolling_window: settings.rolling_window,
            percentage_decimals: settings.percentage_decimals.min(MAX_PERCENTAGE_DECIMALS),
            rain_threshold_mm: settings.rain_threshold_mm,
        }
    }

    pub fn with_rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = window;
        self
    }

    /// Values above `MAX_PERCENTAGE_DECIMALS` are clamped to it.
    pub fn with_percentage_decimals(mut self, decimals: u32) -> Self {
        self.percentage_decimals = decimals.min(MAX_PERCENTAGE_DECIMALS);
        self
    }

    pub fn with_rain_threshold(mut self, threshold_mm: f64) -> Self {
        self.rain_threshold_mm = threshold_mm;
        self
    }

    pub fn rolling_window(&self) -> usize {
        self.rolling_window
    }

    /// Scalar metrics; means are `None` when `filtered` is empty.
    pub fn summarize(&self, filtered: &WeatherDataset) -> Summary {
        let mut temp_sum = 0.0f64;
        let mut precip_sum = 0.0f64;
        let mut wind_sum = 0.0f64;
        let mut rainy_days = 0;

        for record in filtered {
            temp_sum += record.temp_max + record.temp_min;
            precip_sum += record.precipitation;
            wind_sum += record.wind;
            if record.is_rainy(self.rain_threshold_mm) {
                rainy_days += 1;
            }
        }

        let days = filtered.len();
        let (avg_temp, avg_wind) = if days > 0 {
            (
                Some(temp_sum / (2 * days) as f64),
                Some(wind_sum / days as f64),
            )
        } else {
            (None, None)
        };

        Summary {
            avg_temp,
            total_precipitation: precip_sum,
            avg_wind,
            rainy_day_count: rainy_days,
            total_day_count: days,
        }
    }

    /// Day count and rounded share of days for each weather label.
    ///
    /// Percentages are of `filtered.len()` and sum to exactly 100. A share can
    /// therefore differ from `round(100 * count / total)` by one rounding step,
    /// even between labels with equal counts.
    pub fn weather_breakdown(&self, filtered: &WeatherDataset) -> WeatherBreakdown {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in filtered {
            *counts.entry(record.weather.as_str()).or_insert(0) += 1;
        }

        let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
        counts.sort_unstable();
        let percentages = apportion_percentages(&counts, self.percentage_decimals);

        let categories = counts
            .into_iter()
            .zip(percentages)
            .map(|((label, count), percentage)| {
                (label.to_string(), CategoryShare { count, percentage })
            })
            .collect();

        WeatherBreakdown { categories }
    }

    /// Filter by `years` and compute every aggregate over the result.
    pub fn aggregate(
        &self,
        dataset: &WeatherDataset,
        years: &YearSelection,
    ) -> Result<AggregateResult> {
        let filtered = filter_by_years(dataset, years);
        debug!(
            "Selected {} of {} records for years [{}]",
            filtered.len(),
            dataset.len(),
            years.label()
        );

        let smoothed = rolling_wind_average(&filtered, self.rolling_window)?;
        let wind_rolling_7d = filtered
            .iter()
            .zip(smoothed)
            .map(|(record, wind_avg)| RollingWindPoint {
                date: record.date,
                wind: record.wind,
                wind_avg,
            })
            .collect();

        Ok(AggregateResult {
            selected_years: years.clone(),
            summary: self.summarize(&filtered),
            weather_breakdown: self.weather_breakdown(&filtered),
            monthly_precipitation: monthly_precipitation(&filtered),
            monthly_weather: monthly_weather_mix(&filtered),
            rolling_window: self.rolling_window,
            wind_rolling_7d,
            daily_temperature: daily_temperature_range(&filtered),
        })
    }
}

impl Default for WeatherAggregator {
    fn default() -> Self {
        Self::new()
    }
}
