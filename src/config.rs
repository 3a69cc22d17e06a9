//! Appliance configuration loaded from TOML.
//!
//! Every section and key is optional; missing values fall back to the
//! defaults the appliance ships with.
//!
//! ```toml
//! [pid]
//! kp = 0.1
//! ki = 0.01
//! kd = 0.001
//! p_on = 1.0
//! min_output = 0.0
//! max_output = 255.0
//! direction = "direct"
//!
//! [kalman]
//! measurement_error = 2.0
//! estimate_error = 2.0
//! process_noise = 0.01
//!
//! [thermistor]
//! beta = 3950.0
//! r0 = 10000.0
//! t0 = 25.0
//! r_series = 100000.0
//! v_ref = 3.3
//!
//! [heating]
//! poll_interval_ms = 100
//! ```

use crate::control::{ControlError, Direction, KalmanFilter, Pid, PidTunings, ThermistorParams};
use crate::machines::heating::MEASUREMENTS_PER_CYCLE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Top-level appliance configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplianceConfig {
    pub pid: PidConfig,
    pub kalman: KalmanConfig,
    pub thermistor: ThermistorParams,
    pub heating: HeatingConfig,
}

impl ApplianceConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::ReadError(e.to_string())
            }
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pid
            .tunings()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        if self.pid.min_output >= self.pid.max_output {
            return Err(ConfigError::ValidationError(format!(
                "pid.min_output ({}) must be below pid.max_output ({})",
                self.pid.min_output, self.pid.max_output
            )));
        }
        if self.heating.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "heating.poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[pid]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub p_on: f64,
    pub min_output: f64,
    pub max_output: f64,
    pub direction: Direction,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.1,
            ki: 0.01,
            kd: 0.001,
            p_on: 1.0,
            min_output: 0.0,
            max_output: 255.0,
            direction: Direction::Direct,
        }
    }
}

impl PidConfig {
    pub fn tunings(&self) -> PidTunings {
        PidTunings {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            p_on: self.p_on,
        }
    }

    /// A controller with these settings and a zero setpoint.
    pub fn controller(&self) -> Result<Pid, ControlError> {
        Pid::new(
            self.direction,
            self.tunings(),
            0.0,
            self.min_output,
            self.max_output,
        )
    }
}

/// `[kalman]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KalmanConfig {
    pub measurement_error: f64,
    pub estimate_error: f64,
    pub process_noise: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            measurement_error: 2.0,
            estimate_error: 2.0,
            process_noise: 0.01,
        }
    }
}

impl KalmanConfig {
    pub fn filter(&self) -> KalmanFilter {
        KalmanFilter::new(self.measurement_error, self.estimate_error, self.process_noise)
    }
}

/// `[heating]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatingConfig {
    /// Sensor polling period.
    pub poll_interval_ms: u64,
}

impl Default for HeatingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

impl HeatingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Nominal seconds between two PID cycles.
    pub fn pid_period_seconds(&self) -> f64 {
        self.poll_interval().as_secs_f64() * f64::from(MEASUREMENTS_PER_CYCLE)
    }
}
