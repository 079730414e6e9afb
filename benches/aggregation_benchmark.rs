use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weather_digest::analyzers::rolling_wind_average;
use weather_digest::processors::IntegrityChecker;
use weather_digest::{WeatherAggregator, WeatherDataset, WeatherRecord, YearSelection};

const LABELS: [&str; 5] = ["drizzle", "rain", "sun", "snow", "fog"];

fn create_test_dataset(days: usize) -> WeatherDataset {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let records = (0..days)
        .map(|day| {
            let date = start + Duration::days(day as i64);
            let seasonal = ((day % 365) as f64 / 365.0 * std::f64::consts::TAU).sin();
            WeatherRecord::new(
                date,
                if day % 3 == 0 { 0.0 } else { (day % 11) as f64 * 0.7 },
                14.0 + 10.0 * seasonal,
                6.0 + 6.0 * seasonal,
                2.0 + (day % 9) as f64 * 0.4,
                LABELS[day % LABELS.len()],
            )
        })
        .collect();
    WeatherDataset::new(records).unwrap()
}

fn benchmark_aggregate(c: &mut Criterion) {
    let dataset = create_test_dataset(365 * 4);
    let selection = YearSelection::new([2001, 2002]).unwrap();
    let aggregator = WeatherAggregator::new();

    c.bench_function("aggregate_two_years", |b| {
        b.iter(|| {
            let result = aggregator.aggregate(black_box(&dataset), &selection).unwrap();
            black_box(result.summary.total_day_count)
        })
    });
}

fn benchmark_rolling_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_wind_average");
    let dataset = create_test_dataset(365 * 10);

    for &window in &[1usize, 7, 30] {
        group.bench_with_input(BenchmarkId::new("window", window), &window, |b, &window| {
            b.iter(|| black_box(rolling_wind_average(&dataset, window).unwrap().len()))
        });
    }

    group.finish();
}

fn benchmark_integrity_checker(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrity_checker");

    for &days in &[1_000usize, 20_000] {
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            let dataset = create_test_dataset(days);
            let checker = IntegrityChecker::new();
            b.iter(|| black_box(checker.check(&dataset).unwrap().clean_records))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_aggregate,
    benchmark_rolling_window,
    benchmark_integrity_checker
);
criterion_main!(benches);
