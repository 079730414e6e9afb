use std::collections::BTreeMap;

use crate::models::{AggregateResult, DailyTemperature, WeatherRecord};

const FALLBACK_GLYPH: &str = "🌈";

pub fn weather_glyph(label: &str) -> &'static str {
    match label {
        "sun" => "☀️",
        "snow" => "❄️",
        "rain" => "🌧️",
        "fog" => "🌫️",
        "drizzle" => "🌦️",
        _ => FALLBACK_GLYPH,
    }
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn or_na(value: Option<f64>, precision: usize, unit: &str) -> String {
    value
        .map(|v| format!("{:.*}{}", precision, v, unit))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Human-readable rendering of an aggregate result.
pub fn render_text(result: &AggregateResult) -> String {
    let summary = &result.summary;
    let mut out = String::new();

    out.push_str("=== Key Weather Statistics ===\n");
    out.push_str(&format!(
        "Summary for selected year(s): {}\n\n",
        result.selected_years.label()
    ));
    out.push_str(&format!(
        "Average Temperature: {}\n",
        or_na(summary.avg_temp, 1, "°C")
    ));
    out.push_str(&format!(
        "Total Precipitation: {:.0} mm\n",
        summary.total_precipitation
    ));
    out.push_str(&format!(
        "Average Wind Speed:  {}\n",
        or_na(summary.avg_wind, 1, " m/s")
    ));
    out.push_str(&format!(
        "Rainy Days:          {} / {} ({})\n",
        summary.rainy_day_count,
        summary.total_day_count,
        or_na(summary.rainy_day_percentage(), 0, "%")
    ));

    if summary.total_day_count == 0 {
        out.push_str("\nNo records match the selected year(s).\n");
        return out;
    }

    out.push_str("\n=== Weather Type Distribution ===\n");
    for (label, share) in result.weather_breakdown.ranked() {
        out.push_str(&format!(
            "{} {:<8} {:>4} days  {:>5.1}%\n",
            weather_glyph(label),
            title_case(label),
            share.count,
            share.percentage
        ));
    }

    out.push_str("\n=== Monthly Precipitation Totals (mm) ===\n");
    for (key, total) in &result.monthly_precipitation.totals {
        out.push_str(&format!("{}-{:02}  {:>7.1}\n", key.year, key.month, total));
    }

    out.push_str("\n=== Monthly Weather Patterns ===\n");
    for (month, mix) in &result.monthly_weather.months {
        let parts: Vec<String> = mix
            .categories
            .iter()
            .map(|(label, share)| format!("{} {:.0}%", label, share.proportion * 100.0))
            .collect();
        out.push_str(&format!("{:02}: {}\n", month, parts.join(", ")));
    }

    out.push_str("\n=== Temperature Patterns ===\n");
    out.push_str(&render_temperature(&result.daily_temperature));

    if let (Some(first), Some(last)) = (
        result.wind_rolling_7d.first(),
        result.wind_rolling_7d.last(),
    ) {
        let peak = result
            .wind_rolling_7d
            .iter()
            .max_by(|a, b| a.wind_avg.total_cmp(&b.wind_avg))
            .unwrap_or(first);
        out.push_str(&format!(
            "\n=== Wind Speed Trends ({}-day average) ===\n",
            result.rolling_window
        ));
        out.push_str(&format!(
            "First: {} {:.2} m/s\nLast:  {} {:.2} m/s\nPeak:  {} {:.2} m/s\n",
            first.date, first.wind_avg, last.date, last.wind_avg, peak.date, peak.wind_avg
        ));
    }

    out
}

/// Per-year mean high and low, plus the day with the widest spread.
fn render_temperature(series: &[DailyTemperature]) -> String {
    let mut by_year: BTreeMap<i32, Vec<&DailyTemperature>> = BTreeMap::new();
    for day in series {
        by_year.entry(day.year).or_default().push(day);
    }

    let mut out = String::new();
    for (year, days) in by_year {
        let n = days.len() as f64;
        let mean_high = days.iter().map(|d| d.temp_max).sum::<f64>() / n;
        let mean_low = days.iter().map(|d| d.temp_min).sum::<f64>() / n;
        if let Some(widest) = days.iter().max_by(|a, b| a.spread.total_cmp(&b.spread)) {
            out.push_str(&format!(
                "{}  high {:>5.1}°C  low {:>5.1}°C  widest {:.1}°C on {}\n",
                year, mean_high, mean_low, widest.spread, widest.date
            ));
        }
    }
    out
}

pub fn render_rows(records: &[&WeatherRecord]) -> String {
    let mut out = String::from("date        precip  t_max  t_min  wind  weather\n");
    for r in records {
        out.push_str(&format!(
            "{}  {:>6.1}  {:>5.1}  {:>5.1}  {:>4.1}  {}\n",
            r.date, r.precipitation, r.temp_max, r.temp_min, r.wind, r.weather
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::WeatherAggregator;
    use crate::models::{WeatherDataset, YearSelection};
    use chrono::NaiveDate;

    fn dataset() -> WeatherDataset {
        WeatherDataset::new(vec![
            WeatherRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), 0.0, 10.0, 2.0, 3.0, "sun"),
            WeatherRecord::new(NaiveDate::from_ymd_opt(2012, 1, 2).unwrap(), 5.0, 8.0, 1.0, 5.0, "rain"),
            WeatherRecord::new(NaiveDate::from_ymd_opt(2012, 1, 3).unwrap(), 0.0, 7.0, 1.0, 4.0, "thunder"),
        ])
        .unwrap()
    }

    #[test]
    fn test_glyph_fallback() {
        assert_eq!(weather_glyph("snow"), "❄️");
        assert_eq!(weather_glyph("thunder"), FALLBACK_GLYPH);
    }

    #[test]
    fn test_render_text() {
        let selection = YearSelection::new([2012]).unwrap();
        let result = WeatherAggregator::new().aggregate(&dataset(), &selection).unwrap();
        let text = render_text(&result);

        assert!(text.contains("Summary for selected year(s): 2012"));
        assert!(text.contains("Rainy Days:          1 / 3 (33%)"));
        assert!(text.contains("🌈 Thunder"));
        assert!(text.contains("2012-01      5.0"));
        assert!(text.contains("=== Temperature Patterns ==="));
        assert!(text.contains("2012  high   8.3°C  low   1.3°C  widest 8.0°C on 2012-01-01"));
        assert!(text.contains("(7-day average)"));
    }

    #[test]
    fn test_render_empty_selection() {
        let selection = YearSelection::new([1999]).unwrap();
        let result = WeatherAggregator::new().aggregate(&dataset(), &selection).unwrap();
        let text = render_text(&result);

        assert!(text.contains("Average Temperature: n/a"));
        assert!(text.contains("No records match"));
    }

    #[test]
    fn test_render_rows() {
        let data = dataset();
        let text = render_rows(&data.newest_first()[..1]);
        assert!(text.contains("2012-01-03"));
        assert!(!text.contains("2012-01-01"));
    }
}
