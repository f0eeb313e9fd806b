use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Working hours for a day view. `start_hour < end_hour <= 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    /// Grid granularity in minutes. Should divide 60.
    pub slot_minutes: u32,
}

impl Default for WorkingWindow {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            slot_minutes: 15,
        }
    }
}

impl WorkingWindow {
    pub fn hours(&self) -> std::ops::Range<u32> {
        self.start_hour..self.end_hour
    }
}

/// Read-only day-view configuration, injected into every core call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub window: WorkingWindow,
    /// Height of one hour row, in the grid's length unit (rem).
    pub hour_height: f64,
    /// Render-time floor for an item's height.
    pub min_item_height: f64,
    pub show_current_time: bool,
    pub min_appointment_duration: u32,
    pub max_appointment_duration: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            window: WorkingWindow::default(),
            hour_height: 4.0,
            min_item_height: 1.5,
            show_current_time: true,
            min_appointment_duration: 15,
            max_appointment_duration: 240,
        }
    }
}

impl SchedulerConfig {
    /// Build from `DAYBOOK_*` environment variables, defaulting unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            window: WorkingWindow {
                start_hour: env_or("DAYBOOK_START_HOUR", d.window.start_hour)?,
                end_hour: env_or("DAYBOOK_END_HOUR", d.window.end_hour)?,
                slot_minutes: env_or("DAYBOOK_SLOT_MINUTES", d.window.slot_minutes)?,
            },
            hour_height: env_or("DAYBOOK_HOUR_HEIGHT", d.hour_height)?,
            min_item_height: d.min_item_height,
            show_current_time: env_or("DAYBOOK_SHOW_CURRENT_TIME", d.show_current_time)?,
            min_appointment_duration: env_or("DAYBOOK_MIN_DURATION", d.min_appointment_duration)?,
            max_appointment_duration: env_or("DAYBOOK_MAX_DURATION", d.max_appointment_duration)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.window;
        if w.start_hour >= w.end_hour || w.end_hour > 24 {
            return Err(ConfigError::Inconsistent(
                "start_hour must be before end_hour, end_hour <= 24",
            ));
        }
        if w.slot_minutes == 0 || w.slot_minutes > 60 {
            return Err(ConfigError::Inconsistent("slot_minutes must be within 1..=60"));
        }
        if self.hour_height <= 0.0 {
            return Err(ConfigError::Inconsistent("hour_height must be positive"));
        }
        if self.min_appointment_duration > self.max_appointment_duration {
            return Err(ConfigError::Inconsistent(
                "min_appointment_duration exceeds max_appointment_duration",
            ));
        }
        Ok(())
    }
}

/// Listener settings for the service binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_connections: usize,
    pub metrics_port: Option<u16>,
    /// Load the demo roster and today's demo appointments at startup.
    pub seed: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let metrics_port = match std::env::var("DAYBOOK_METRICS_PORT") {
            Ok(raw) => Some(parse_var("DAYBOOK_METRICS_PORT", &raw)?),
            Err(_) => None,
        };
        Ok(Self {
            bind: std::env::var("DAYBOOK_BIND").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("DAYBOOK_PORT", 5480)?,
            max_connections: env_or("DAYBOOK_MAX_CONNECTIONS", 256)?,
            metrics_port,
            seed: env_or("DAYBOOK_SEED", true)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_var(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_var<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid {
            key,
            value: raw.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    Inconsistent(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
            ConfigError::Inconsistent(msg) => write!(f, "inconsistent configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
