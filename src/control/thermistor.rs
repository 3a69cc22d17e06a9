//! NTC thermistor conversion using the beta equation.
//!
//! The thermistor sits on the low side of a divider with `r_series` on the
//! high side; the ADC reports the divider voltage as a fraction of `v_ref`.

use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;

/// Divider and thermistor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThermistorParams {
    pub beta: f64,
    /// Resistance at `t0`, in ohms.
    pub r0: f64,
    /// Reference temperature, in °C.
    pub t0: f64,
    pub r_series: f64,
    pub v_ref: f64,
}

impl Default for ThermistorParams {
    fn default() -> Self {
        Self {
            beta: 3950.0,
            r0: 10_000.0,
            t0: 25.0,
            r_series: 100_000.0,
            v_ref: 3.3,
        }
    }
}

impl ThermistorParams {
    /// Thermistor resistance for an ADC reading in `0.0..=1.0`.
    pub fn resistance(&self, adc: f64) -> f64 {
        let v = adc * self.v_ref;
        self.r_series * (v / (self.v_ref - v))
    }

    /// Temperature in °C for an ADC reading.
    ///
    /// Readings at or beyond the rails mean an open or shorted sensor and
    /// yield `None`.
    pub fn celsius(&self, adc: f64) -> Option<f64> {
        if !(adc > 0.0 && adc < 1.0) {
            return None;
        }
        let r = self.resistance(adc);
        let kelvin = 1.0 / (1.0 / (self.t0 + KELVIN_OFFSET) + (r / self.r0).ln() / self.beta);
        Some(kelvin - KELVIN_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_resistance_reads_reference_temperature() {
        let params = ThermistorParams {
            r_series: 10_000.0,
            ..ThermistorParams::default()
        };
        // Equal resistors put the divider at half scale.
        assert!((params.resistance(0.5) - 10_000.0).abs() < 1e-6);
        assert!((params.celsius(0.5).unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn lower_resistance_means_hotter() {
        let params = ThermistorParams::default();
        assert!(params.celsius(0.05).unwrap() > params.celsius(0.1).unwrap());
    }

    #[test]
    fn rail_readings_are_rejected() {
        let params = ThermistorParams::default();
        assert_eq!(params.celsius(0.0), None);
        assert_eq!(params.celsius(1.0), None);
        assert_eq!(params.celsius(f64::NAN), None);
    }
}
