pub mod weather_csv_reader;

pub use weather_csv_reader::WeatherCsvReader;
