use std::path::PathBuf;

use thiserror::Error;

use crate::geodesy::EARTH_RADIUS_KM;
use crate::great_circle::DEFAULT_PATH_SAMPLES;

pub const ENV_START_HOUR: &str = "TERRA_ROUTE_START_HOUR";
pub const ENV_PATH_SAMPLES: &str = "TERRA_ROUTE_PATH_SAMPLES";
pub const ENV_EARTH_RADIUS_KM: &str = "TERRA_ROUTE_EARTH_RADIUS_KM";
pub const ENV_LOG: &str = "TERRA_ROUTE_LOG";

pub const USAGE: &str =
    "Usage: terra-route [--hour <0-23>] [--samples <n>] [--radius <km>] [--log <path>]";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown argument {0:?}")]
    UnknownArgument(String),

    #[error("missing value for {0}")]
    MissingValue(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub start_hour: u32,
    pub path_samples: usize,
    pub earth_radius_km: f64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_hour: 0,
            path_samples: DEFAULT_PATH_SAMPLES,
            earth_radius_km: EARTH_RADIUS_KM,
            log_file: PathBuf::from("terra-route.log"),
        }
    }
}

/// Outcome of reading the command line.
#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Config),
    Help,
}

impl Config {
    /// Reads `.env`, then the process environment, then command line overrides.
    pub fn load() -> Result<Command, ConfigError> {
        dotenvy::dotenv().ok();

        let vars = [ENV_START_HOUR, ENV_PATH_SAMPLES, ENV_EARTH_RADIUS_KM, ENV_LOG]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)));
        let config = Self::default().with_vars(vars)?;

        config.with_args(std::env::args().skip(1))
    }

    /// Applies `(name, value)` pairs using the environment variable names.
    pub fn with_vars<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_START_HOUR => self.start_hour = parse_hour(&key, &value)?,
                ENV_PATH_SAMPLES => self.path_samples = parse_samples(&key, &value)?,
                ENV_EARTH_RADIUS_KM => self.earth_radius_km = parse_radius(&key, &value)?,
                ENV_LOG => self.log_file = PathBuf::from(value),
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn with_args<I>(mut self, args: I) -> Result<Command, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            if flag == "-h" || flag == "--help" {
                return Ok(Command::Help);
            }

            let mut value = || args.next().ok_or_else(|| ConfigError::MissingValue(flag.clone()));
            match flag.as_str() {
                "--hour" => self.start_hour = parse_hour(&flag, &value()?)?,
                "--samples" => self.path_samples = parse_samples(&flag, &value()?)?,
                "--radius" => self.earth_radius_km = parse_radius(&flag, &value()?)?,
                "--log" => self.log_file = PathBuf::from(value()?),
                _ => return Err(ConfigError::UnknownArgument(flag)),
            }
        }
        Ok(Command::Run(self))
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_hour(key: &str, value: &str) -> Result<u32, ConfigError> {
    let hour: u32 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(key, value, e.to_string()))?;
    if hour >= crate::sun::HOURS_PER_DAY {
        return Err(invalid(key, value, "hour must be between 0 and 23"));
    }
    Ok(hour)
}

fn parse_samples(key: &str, value: &str) -> Result<usize, ConfigError> {
    let samples: usize = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(key, value, e.to_string()))?;
    if samples == 0 {
        return Err(invalid(key, value, "at least one sample is required"));
    }
    Ok(samples)
}

fn parse_radius(key: &str, value: &str) -> Result<f64, ConfigError> {
    let radius: f64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| invalid(key, value, e.to_string()))?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(invalid(key, value, "radius must be a positive number"));
    }
    Ok(radius)
}
