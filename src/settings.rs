use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_ENCODING, DEFAULT_PERCENTAGE_DECIMALS, DEFAULT_RAIN_THRESHOLD_MM,
    DEFAULT_ROLLING_WINDOW, ENV_PREFIX,
};

/// Tunable parameters for an aggregation run.
///
/// Sources, lowest precedence first: built-in defaults, an optional settings
/// file (any format the `config` crate understands), `WEATHER_DIGEST_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisSettings {
    #[validate(range(min = 1))]
    pub rolling_window: usize,

    #[validate(range(max = 6))]
    pub percentage_decimals: u32,

    #[validate(range(min = 0.0))]
    pub rain_threshold_mm: f64,

    #[validate(length(min = 1))]
    pub encoding: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            percentage_decimals: DEFAULT_PERCENTAGE_DECIMALS,
            rain_threshold_mm: DEFAULT_RAIN_THRESHOLD_MM,
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl AnalysisSettings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = ::config::Config::builder()
            .set_default("rolling_window", defaults.rolling_window as i64)?
            .set_default("percentage_decimals", defaults.percentage_decimals as i64)?
            .set_default("rain_threshold_mm", defaults.rain_threshold_mm)?
            .set_default("encoding", defaults.encoding)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings: Self = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!(?settings, "Loaded analysis settings");
        Ok(settings)
    }

    pub fn with_rolling_window(mut self, window: Option<usize>) -> Self {
        if let Some(window) = window {
            self.rolling_window = window;
        }
        self
    }
}
