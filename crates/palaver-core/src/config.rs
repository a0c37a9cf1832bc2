use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result, anyhow};

use crate::format::{is_valid_date_pattern, Clock, TimeFormat, DEFAULT_DATE_PATTERN};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub clock: Clock,
    pub date_format: String,
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub simulation: SimulationConfig,
}

/// Timings and odds for the simulated correspondent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub typing_debounce_ms: u64,
    pub presence_interval_ms: u64,
    pub online_probability: f64,
    pub reply_probability: f64,
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub history_load_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            typing_debounce_ms: 1000,
            presence_interval_ms: 30_000,
            online_probability: 0.7,
            reply_probability: 0.5,
            reply_delay_min_ms: 1000,
            reply_delay_max_ms: 3000,
            history_load_delay_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            clock: Clock::H24,
            date_format: TimeFormat::default().date_pattern,
            data_dir: None,
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let mut config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", config_path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Replace values that would break rendering with their defaults.
    pub fn sanitize(&mut self) {
        if !is_valid_date_pattern(&self.date_format) {
            tracing::warn!(pattern = %self.date_format, "invalid date_format, using default");
            self.date_format = DEFAULT_DATE_PATTERN.to_string();
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        Ok(())
    }

    /// Where the database, avatars and log file live.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        Ok(data_dir.join("palaver"))
    }

    pub fn time_format(&self) -> TimeFormat {
        TimeFormat {
            clock: self.clock,
            date_pattern: self.date_format.clone(),
        }
    }

    /// Zero-length debounce or presence periods are raised to 1ms; tokio
    /// intervals cannot have a zero period.
    pub fn session_settings(&self) -> SessionSettings {
        let sim = &self.simulation;
        SessionSettings {
            typing_debounce: Duration::from_millis(sim.typing_debounce_ms.max(1)),
            presence_interval: Duration::from_millis(sim.presence_interval_ms.max(1)),
            online_probability: sim.online_probability,
            reply_probability: sim.reply_probability,
            reply_delay_min: Duration::from_millis(sim.reply_delay_min_ms),
            reply_delay_max: Duration::from_millis(sim.reply_delay_max_ms),
            history_load_delay: Duration::from_millis(sim.history_load_delay_ms),
            time_format: self.time_format(),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("palaver").join("config.json"))
    }
}

/// Immutable settings a chat session runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub typing_debounce: Duration,
    pub presence_interval: Duration,
    pub online_probability: f64,
    pub reply_probability: f64,
    pub reply_delay_min: Duration,
    pub reply_delay_max: Duration,
    pub history_load_delay: Duration,
    pub time_format: TimeFormat,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Config::new().session_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"clock":"h12","simulation":{"reply_probability":1.0}}"#).unwrap();
        assert_eq!(config.clock, Clock::H12);
        assert_eq!(config.date_format, "%-m/%-d/%Y");
        assert_eq!(config.simulation.reply_probability, 1.0);
        assert_eq!(config.simulation.typing_debounce_ms, 1000);
    }

    #[test]
    fn test_session_settings_defaults() {
        let settings = SessionSettings::default();
        assert_eq!(settings.typing_debounce, Duration::from_secs(1));
        assert_eq!(settings.presence_interval, Duration::from_secs(30));
        assert_eq!(settings.reply_delay_min, Duration::from_secs(1));
        assert_eq!(settings.reply_delay_max, Duration::from_secs(3));
        assert_eq!(settings.online_probability, 0.7);
    }

    #[test]
    fn test_invalid_date_format_is_replaced() {
        let mut config: Config = serde_json::from_str(r#"{"date_format":"%Q"}"#).unwrap();
        config.sanitize();
        assert_eq!(config.date_format, DEFAULT_DATE_PATTERN);

        let mut config: Config = serde_json::from_str(r#"{"date_format":"%d.%m.%Y"}"#).unwrap();
        config.sanitize();
        assert_eq!(config.date_format, "%d.%m.%Y");
    }

    #[test]
    fn test_zero_periods_are_clamped() {
        let config: Config = serde_json::from_str(
            r#"{"simulation":{"presence_interval_ms":0,"typing_debounce_ms":0}}"#,
        )
        .unwrap();
        let settings = config.session_settings();
        assert_eq!(settings.presence_interval, Duration::from_millis(1));
        assert_eq!(settings.typing_debounce, Duration::from_millis(1));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/palaver-test")),
            ..Config::new()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/palaver-test"));
    }
}
