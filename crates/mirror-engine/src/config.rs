use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Detection loop configuration.
///
/// Loaded from an optional TOML file, then overridden by `MIRROR_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Pause between cycles in milliseconds. 0 yields to the scheduler only.
    pub cycle_interval_ms: u64,
    /// Confidence an expression must exceed to count (happy checked first).
    pub emotion_threshold: f32,
    /// Exclusive lower bound of the placeholder matcher's descriptor-mean band.
    pub match_band_low: f32,
    /// Exclusive upper bound of the placeholder matcher's descriptor-mean band.
    pub match_band_high: f32,
    /// Chance that a fallback verdict says "primary person".
    pub fallback_primary_probability: f64,
    /// Seed for reproducible fallback verdicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_seed: Option<u64>,
    /// Directory holding recognition model files.
    pub model_dir: PathBuf,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // About one display refresh at 60 Hz.
            cycle_interval_ms: 16,
            emotion_threshold: 0.6,
            match_band_low: 0.1,
            match_band_high: 0.3,
            fallback_primary_probability: 0.3,
            fallback_seed: None,
            model_dir: mirror_core::default_model_dir(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `MIRROR_*` overrides. Unparseable values keep the current setting.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = &lookup;

        if let Some(v) = parsed(lookup, "MIRROR_CYCLE_INTERVAL_MS") {
            self.cycle_interval_ms = v;
        }
        if let Some(v) = parsed(lookup, "MIRROR_EMOTION_THRESHOLD") {
            self.emotion_threshold = v;
        }
        if let Some(v) = parsed(lookup, "MIRROR_MATCH_BAND_LOW") {
            self.match_band_low = v;
        }
        if let Some(v) = parsed(lookup, "MIRROR_MATCH_BAND_HIGH") {
            self.match_band_high = v;
        }
        if let Some(v) = parsed(lookup, "MIRROR_FALLBACK_PRIMARY_PROBABILITY") {
            self.fallback_primary_probability = v;
        }
        if let Some(v) = parsed(lookup, "MIRROR_FALLBACK_SEED") {
            self.fallback_seed = Some(v);
        }
        if let Some(v) = lookup("MIRROR_MODEL_DIR") {
            self.model_dir = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.emotion_threshold) {
            return Err(ConfigError::Invalid(format!(
                "emotion_threshold must be in [0, 1], got {}",
                self.emotion_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.fallback_primary_probability) {
            return Err(ConfigError::Invalid(format!(
                "fallback_primary_probability must be in [0, 1], got {}",
                self.fallback_primary_probability
            )));
        }
        if !(self.match_band_low < self.match_band_high) {
            return Err(ConfigError::Invalid(format!(
                "match band is empty: ({}, {})",
                self.match_band_low, self.match_band_high
            )));
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
