//! Temperature-control math used by the heating collaborators.
//!
//! - [`Pid`]: PID controller with proportional-on-measurement blending
//! - [`KalmanFilter`]: scalar Kalman filter for noisy sensor readings
//! - [`thermistor`]: beta-equation conversion from ADC readings

mod kalman;
mod pid;
pub mod thermistor;


pub use kalman::KalmanFilter;
pub use pid::{Direction, Pid, PidTunings};
pub use thermistor::ThermistorParams;

use thiserror::Error;

/// Errors raised when configuring a controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("PID gains must be non-negative (kp={kp}, ki={ki}, kd={kd})")]
    NegativeGain { kp: f64, ki: f64, kd: f64 },

    #[error("p_on must be within 0..=1, got {0}")]
    ProportionalBlendOutOfRange(f64),

    #[error("output limits must satisfy min < max (min {min}, max {max})")]
    InvertedLimits { min: f64, max: f64 },
}
