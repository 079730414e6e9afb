use crate::error::{ProcessingError, Result};
use crate::models::{WeatherDataset, WeatherRecord};
use crate::utils::constants::{
    MAX_PLAUSIBLE_PRECIP, MAX_PLAUSIBLE_TEMP, MAX_PLAUSIBLE_WIND, MIN_PLAUSIBLE_TEMP,
    PARALLEL_CHECK_THRESHOLD,
};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub clean_records: usize,
    pub flagged_records: usize,
    pub unknown_labels: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
    pub missing_days: Vec<DateGap>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.missing_days.is_empty()
    }

    pub fn count_of(&self, kind: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == kind)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub date: NaiveDate,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    MaxBelowMin,
    TemperatureOutOfRange,
    ExtremeWind,
    ExtremePrecipitation,
}

/// Run of calendar days with no record, between two recorded days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGap {
    pub after: NaiveDate,
    pub before: NaiveDate,
    pub missing_days: i64,
}

/// Flags records that are well-formed but implausible. Nothing here is fatal.
pub struct IntegrityChecker {
    max_workers: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn check(&self, dataset: &WeatherDataset) -> Result<IntegrityReport> {
        let records = dataset.records();

        let per_record: Vec<Vec<Violation>> = if records.len() >= PARALLEL_CHECK_THRESHOLD {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.max_workers)
                .build()
                .map_err(|e| ProcessingError::Config(e.to_string()))?;
            pool.install(|| records.par_iter().map(Self::check_record).collect())
        } else {
            records.iter().map(Self::check_record).collect()
        };

        let flagged_records = per_record.iter().filter(|v| !v.is_empty()).count();

        let mut unknown_labels = BTreeMap::new();
        for record in records.iter().filter(|r| !r.has_known_label()) {
            *unknown_labels.entry(record.weather.clone()).or_insert(0) += 1;
        }

        Ok(IntegrityReport {
            total_records: records.len(),
            clean_records: records.len() - flagged_records,
            flagged_records,
            unknown_labels,
            violations: per_record.into_iter().flatten().collect(),
            missing_days: Self::find_gaps(records),
        })
    }

    fn check_record(record: &WeatherRecord) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut flag = |violation_type, details: String| {
            violations.push(Violation {
                date: record.date,
                violation_type,
                details,
            })
        };

        if record.temp_max < record.temp_min {
            flag(
                ViolationType::MaxBelowMin,
                format!(
                    "temp_max {:.1}°C below temp_min {:.1}°C",
                    record.temp_max, record.temp_min
                ),
            );
        }

        for (name, temp) in [("temp_max", record.temp_max), ("temp_min", record.temp_min)] {
            if !(MIN_PLAUSIBLE_TEMP..=MAX_PLAUSIBLE_TEMP).contains(&temp) {
                flag(
                    ViolationType::TemperatureOutOfRange,
                    format!(
                        "{} {:.1}°C outside [{}, {}]",
                        name, temp, MIN_PLAUSIBLE_TEMP, MAX_PLAUSIBLE_TEMP
                    ),
                );
            }
        }

        if record.wind > MAX_PLAUSIBLE_WIND {
            flag(
                ViolationType::ExtremeWind,
                format!("wind {:.1} m/s above {}", record.wind, MAX_PLAUSIBLE_WIND),
            );
        }

        if record.precipitation > MAX_PLAUSIBLE_PRECIP {
            flag(
                ViolationType::ExtremePrecipitation,
                format!(
                    "precipitation {:.1} mm above {}",
                    record.precipitation, MAX_PLAUSIBLE_PRECIP
                ),
            );
        }

        violations
    }

    fn find_gaps(records: &[WeatherRecord]) -> Vec<DateGap> {
        records
            .windows(2)
            .filter_map(|pair| {
                let missing = pair[1].date.signed_duration_since(pair[0].date).num_days() - 1;
                (missing > 0).then(|| DateGap {
                    after: pair[0].date,
                    before: pair[1].date,
                    missing_days: missing,
                })
            })
            .collect()
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let pct = |n: usize| {
            if report.total_records == 0 {
                0.0
            } else {
                100.0 * n as f64 / report.total_records as f64
            }
        };

        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Clean Records: {} ({:.1}%)\n",
            report.clean_records,
            pct(report.clean_records)
        ));
        summary.push_str(&format!(
            "Flagged Records: {} ({:.1}%)\n",
            report.flagged_records,
            pct(report.flagged_records)
        ));
        summary.push_str(&format!(
            "Missing Days: {} across {} gap(s)\n",
            report.missing_days.iter().map(|g| g.missing_days).sum::<i64>(),
            report.missing_days.len()
        ));

        if !report.unknown_labels.is_empty() {
            let labels: Vec<String> = report
                .unknown_labels
                .iter()
                .map(|(label, count)| format!("{} ({})", label, count))
                .collect();
            summary.push_str(&format!("Unrecognised Weather Labels: {}\n", labels.join(", ")));
        }

        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    violation.date,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clean_dataset() -> Result<()> {
        let dataset = WeatherDataset::new(vec![
            WeatherRecord::new(day(2012, 1, 1), 0.0, 12.8, 5.0, 4.7, "drizzle"),
            WeatherRecord::new(day(2012, 1, 2), 10.9, 10.6, 2.8, 4.5, "rain"),
        ])?;

        let report = IntegrityChecker::new().check(&dataset)?;
        assert!(report.is_clean());
        assert_eq!(report.clean_records, 2);
        assert!(report.unknown_labels.is_empty());
        Ok(())
    }

    #[test]
    fn test_flags_implausible_values() -> Result<()> {
        let dataset = WeatherDataset::new(vec![
            WeatherRecord::new(day(2012, 1, 1), 0.0, 2.0, 5.0, 4.7, "sun"),
            WeatherRecord::new(day(2012, 1, 2), 600.0, 60.0, 2.8, 55.0, "rain"),
            WeatherRecord::new(day(2012, 1, 3), 1.0, 8.0, 2.0, 3.0, "hail"),
        ])?;

        let report = IntegrityChecker::new().check(&dataset)?;
        assert_eq!(report.flagged_records, 2);
        assert_eq!(report.count_of(ViolationType::MaxBelowMin), 1);
        assert_eq!(report.count_of(ViolationType::TemperatureOutOfRange), 1);
        assert_eq!(report.count_of(ViolationType::ExtremeWind), 1);
        assert_eq!(report.count_of(ViolationType::ExtremePrecipitation), 1);
        assert_eq!(report.unknown_labels.get("hail"), Some(&1));

        let summary = IntegrityChecker::new().generate_summary(&report);
        assert!(summary.contains("Flagged Records: 2"));
        assert!(summary.contains("hail (1)"));
        Ok(())
    }

    #[test]
    fn test_detects_gaps() -> Result<()> {
        let dataset = WeatherDataset::new(vec![
            WeatherRecord::new(day(2012, 2, 27), 0.0, 8.0, 2.0, 3.0, "sun"),
            WeatherRecord::new(day(2012, 2, 28), 0.0, 8.0, 2.0, 3.0, "sun"),
            WeatherRecord::new(day(2012, 3, 2), 0.0, 8.0, 2.0, 3.0, "sun"),
        ])?;

        let report = IntegrityChecker::new().check(&dataset)?;
        assert_eq!(
            report.missing_days,
            vec![DateGap {
                after: day(2012, 2, 28),
                before: day(2012, 3, 2),
                missing_days: 2,
            }]
        );
        Ok(())
    }

    #[test]
    fn test_parallel_path_matches_sequential() -> Result<()> {
        let start = day(1990, 1, 1);
        let records: Vec<WeatherRecord> = (0..PARALLEL_CHECK_THRESHOLD as i64 + 10)
            .map(|i| {
                let temp_max = if i % 1000 == 0 { -1.0 } else { 10.0 };
                WeatherRecord::new(start + Duration::days(i), 0.0, temp_max, 0.0, 2.0, "sun")
            })
            .collect();
        let dataset = WeatherDataset::new(records)?;

        let report = IntegrityChecker::with_max_workers(2).check(&dataset)?;
        assert_eq!(report.total_records, PARALLEL_CHECK_THRESHOLD + 10);
        assert_eq!(report.flagged_records, 11);
        // violations keep record order
        assert!(report.violations.windows(2).all(|w| w[0].date < w[1].date));
        Ok(())
    }

    #[test]
    fn test_empty_dataset_summary() -> Result<()> {
        let report = IntegrityChecker::new().check(&WeatherDataset::default())?;
        let summary = IntegrityChecker::new().generate_summary(&report);
        assert!(summary.contains("Total Records: 0"));
        Ok(())
    }
}
