use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::capture::RetryPolicy;
use crate::tokenizer::GapRule;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Caption capture config
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Exercise behaviour config
    #[serde(default)]
    pub exercise: ExerciseConfig,

    /// Terminal drill config
    #[serde(default)]
    pub drill: DrillConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Caption capture settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CaptureConfig {
    // @field: Attach attempts before giving up, first one included
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    // @field: Delay between attach attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    // @field: Delay before re-attaching after native captions are switched on
    #[serde(default = "default_toggle_restart_delay_ms")]
    pub toggle_restart_delay_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            toggle_restart_delay_ms: default_toggle_restart_delay_ms(),
        }
    }
}

impl CaptureConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn toggle_restart_delay(&self) -> Duration {
        Duration::from_millis(self.toggle_restart_delay_ms)
    }
}

/// Exercise settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExerciseConfig {
    // @field: How far (seconds) a seek may land outside the exercise segment
    #[serde(default = "default_seek_tolerance_secs")]
    pub seek_tolerance_secs: f64,

    // @field: Seconds replayed before the segment start
    #[serde(default = "default_replay_lead_in_secs")]
    pub replay_lead_in_secs: f64,

    // @field: Which words become gaps
    #[serde(default)]
    pub gap_rule: GapRule,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            seek_tolerance_secs: default_seek_tolerance_secs(),
            replay_lead_in_secs: default_replay_lead_in_secs(),
            gap_rule: GapRule::default(),
        }
    }
}

/// Terminal drill settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DrillConfig {
    // @field: Simulation tick in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    // @field: Playback speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f64,

    // @field: Stream words into captions one by one
    #[serde(default = "default_true")]
    pub stream_words: bool,

    // @field: Chance per tick of re-rendering an unchanged caption node
    #[serde(default)]
    pub recreate_probability: f64,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            speed: default_speed(),
            stream_words: default_true(),
            recreate_probability: 0.0,
        }
    }
}

impl DrillConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    300
}

fn default_toggle_restart_delay_ms() -> u64 {
    300
}

fn default_seek_tolerance_secs() -> f64 {
    1.0
}

fn default_replay_lead_in_secs() -> f64 {
    0.5
}

fn default_tick_ms() -> u64 {
    100
}

fn default_speed() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.capture.retry_attempts == 0 {
            return Err(anyhow!("capture.retry_attempts must be at least 1"));
        }

        if !self.exercise.seek_tolerance_secs.is_finite() || self.exercise.seek_tolerance_secs < 0.0 {
            return Err(anyhow!(
                "exercise.seek_tolerance_secs must be a non-negative number, got {}",
                self.exercise.seek_tolerance_secs
            ));
        }

        if !self.exercise.replay_lead_in_secs.is_finite() || self.exercise.replay_lead_in_secs < 0.0 {
            return Err(anyhow!(
                "exercise.replay_lead_in_secs must be a non-negative number, got {}",
                self.exercise.replay_lead_in_secs
            ));
        }

        if self.exercise.gap_rule.min_len == 0 {
            return Err(anyhow!("exercise.gap_rule.min_len must be at least 1"));
        }

        if self.drill.tick_ms == 0 {
            return Err(anyhow!("drill.tick_ms must be at least 1"));
        }

        if !self.drill.speed.is_finite() || self.drill.speed <= 0.0 {
            return Err(anyhow!("drill.speed must be positive, got {}", self.drill.speed));
        }

        if !(0.0..=1.0).contains(&self.drill.recreate_probability) {
            return Err(anyhow!(
                "drill.recreate_probability must be within [0, 1], got {}",
                self.drill.recreate_probability
            ));
        }

        Ok(())
    }

    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))
    }

    /// Load the configuration, writing the default one when the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }
}
