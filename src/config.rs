use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::NormalizedStatus;
use crate::error::{Result, TrackItError};
use crate::normalize::StatusVocabulary;

pub const DEFAULT_CONFIG_PATH: &str = "trackit.toml";
pub const ENV_CONFIG_PATH: &str = "TRACKIT_CONFIG";
pub const ENV_PORT: &str = "TRACKIT_PORT";
pub const ENV_METRICS_PORT: &str = "TRACKIT_METRICS_PORT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub simulation: SimulationConfig,
    pub vocabulary: VocabularyConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 50,
            window_secs: 60,
        }
    }
}

/// Knobs for the mock upstream carriers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub mock_shipments: u32,
    /// Chance (0..=1) that a tracking request is delayed by `latency_ms`
    pub latency_probability: f64,
    pub latency_ms: u64,
    /// Chance (0..=1) that a tracking request moves one random shipment along
    pub drift_probability: f64,
    /// Fixed RNG seed for reproducible mock data
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mock_shipments: 100,
            latency_probability: 0.10,
            latency_ms: 1500,
            drift_probability: 0.05,
            seed: None,
        }
    }
}

/// Status tokens added on top of the built-in vocabulary
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub entries: HashMap<String, NormalizedStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9898,
        }
    }
}

impl Config {
    /// Load from `$TRACKIT_CONFIG`, else `trackit.toml` if present, else defaults.
    /// Environment overrides are applied last.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => Self::load_from(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TrackItError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply port overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = parse_port(ENV_PORT, &port)?;
        }
        if let Some(port) = lookup(ENV_METRICS_PORT) {
            self.metrics.port = parse_port(ENV_METRICS_PORT, &port)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("simulation.latency_probability", self.simulation.latency_probability),
            ("simulation.drift_probability", self.simulation.drift_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TrackItError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, p
                )));
            }
        }
        if self.rate_limit.window_secs == 0 {
            return Err(TrackItError::Config(
                "rate_limit.window_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Built-in vocabulary extended with the configured entries
    pub fn status_vocabulary(&self) -> StatusVocabulary {
        StatusVocabulary::with_entries(
            self.vocabulary
                .entries
                .iter()
                .map(|(token, status)| (token.as_str(), *status)),
        )
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| TrackItError::Config(format!("{} is not a valid port: {:?}", key, value)))
}
