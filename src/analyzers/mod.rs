pub mod weather_aggregator;

pub use weather_aggregator::{
    available_years, daily_temperature_range, filter_by_years, monthly_precipitation,
    monthly_weather_mix, rolling_wind_average, WeatherAggregator,
};
