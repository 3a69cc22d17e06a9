//! PID controller with proportional-on-measurement blending and integral
//! clamping.
//!
//! `p_on = 1` is classic proportional-on-error, `p_on = 0` is pure
//! proportional-on-measurement; values in between blend the two. The
//! integral accumulator is clamped to the output limits, the output itself is
//! not (callers map it onto their actuator range).

use crate::control::ControlError;
use serde::{Deserialize, Serialize};

/// Controller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Output rises when the input is below the setpoint.
    #[default]
    Direct,
    /// Output rises when the input is above the setpoint.
    Reverse,
}

/// PID gains as configured by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidTunings {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Share of the proportional term computed on error (0..=1).
    pub p_on: f64,
}

impl Default for PidTunings {
    fn default() -> Self {
        Self {
            kp: 0.1,
            ki: 0.01,
            kd: 0.001,
            p_on: 0.0,
        }
    }
}

impl PidTunings {
    pub fn validate(&self) -> Result<(), ControlError> {
        if self.kp < 0.0 || self.ki < 0.0 || self.kd < 0.0 {
            return Err(ControlError::NegativeGain {
                kp: self.kp,
                ki: self.ki,
                kd: self.kd,
            });
        }
        if !(0.0..=1.0).contains(&self.p_on) {
            return Err(ControlError::ProportionalBlendOutOfRange(self.p_on));
        }
        Ok(())
    }
}

/// PID controller.
#[derive(Debug, Clone)]
pub struct Pid {
    direction: Direction,
    tunings: PidTunings,
    /// Signed gains derived from `tunings` and `direction`.
    kp_error: f64,
    kp_measurement: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    min_output: f64,
    max_output: f64,
    integral: f64,
    last_input: f64,
    output: f64,
}

impl Pid {
    pub fn new(
        direction: Direction,
        tunings: PidTunings,
        setpoint: f64,
        min_output: f64,
        max_output: f64,
    ) -> Result<Self, ControlError> {
        if min_output >= max_output {
            return Err(ControlError::InvertedLimits {
                min: min_output,
                max: max_output,
            });
        }

        let mut pid = Self {
            direction,
            tunings,
            kp_error: 0.0,
            kp_measurement: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint,
            min_output,
            max_output,
            integral: 0.0,
            last_input: 0.0,
            output: 0.0,
        };
        pid.set_tunings(tunings)?;
        Ok(pid)
    }

    /// Replace the gains. Invalid tunings leave the controller unchanged.
    pub fn set_tunings(&mut self, tunings: PidTunings) -> Result<(), ControlError> {
        tunings.validate()?;

        let sign = match self.direction {
            Direction::Direct => 1.0,
            Direction::Reverse => -1.0,
        };
        let kp = sign * tunings.kp;
        self.ki = sign * tunings.ki;
        self.kd = sign * tunings.kd;
        self.kp_error = tunings.p_on * kp;
        self.kp_measurement = (1.0 - tunings.p_on) * kp;
        self.tunings = tunings;
        Ok(())
    }

    pub fn tunings(&self) -> PidTunings {
        self.tunings
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Last computed output.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Run one control cycle for `input` after `dt` seconds.
    ///
    /// A non-positive `dt` skips the cycle and returns the previous output.
    pub fn compute(&mut self, input: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return self.output;
        }

        let error = self.setpoint - input;
        let derivative = input - self.last_input;

        self.integral += self.ki * error * dt;
        self.integral -= self.kp_measurement * derivative;
        self.integral = self.integral.clamp(self.min_output, self.max_output);

        self.output = self.kp_error * error + self.integral - self.kd * derivative / dt;
        self.last_input = input;
        self.output
    }

    /// Clear the integral and derivative memory.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_input = 0.0;
        self.output = 0.0;
    }
}
