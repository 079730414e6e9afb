pub mod aggregate;
pub mod dataset;
pub mod weather;

pub use aggregate::{
    AggregateResult, CategoryShare, DailyTemperature, MixShare, MonthMix, MonthlyPrecipitation,
    MonthlyWeatherMix, RollingWindPoint, Summary, WeatherBreakdown, YearMonth,
};
pub use dataset::{WeatherDataset, YearSelection};
pub use weather::{WeatherRecord, WeatherRecordBuilder, KNOWN_WEATHER_LABELS};
