//! Scalar Kalman filter for smoothing temperature readings.

/// One-dimensional Kalman filter.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanFilter {
    measurement_error: f64,
    estimate_error: f64,
    process_noise: f64,
    gain: f64,
    estimate: f64,
}

impl KalmanFilter {
    pub fn new(measurement_error: f64, estimate_error: f64, process_noise: f64) -> Self {
        Self {
            measurement_error,
            estimate_error,
            process_noise,
            gain: 0.0,
            estimate: 0.0,
        }
    }

    /// Fold a new measurement into the estimate and return the estimate.
    pub fn update_estimate(&mut self, measurement: f64) -> f64 {
        let last = self.estimate;
        self.gain = self.estimate_error / (self.estimate_error + self.measurement_error);
        self.estimate = last + self.gain * (measurement - last);
        self.estimate_error = (1.0 - self.gain) * self.estimate_error
            + (last - self.estimate).abs() * self.process_noise;
        self.estimate
    }

    pub fn set_measurement_error(&mut self, measurement_error: f64) {
        self.measurement_error = measurement_error;
    }

    pub fn set_estimate_error(&mut self, estimate_error: f64) {
        self.estimate_error = estimate_error;
    }

    pub fn set_process_noise(&mut self, process_noise: f64) {
        self.process_noise = process_noise;
    }

    /// Gain used by the last update.
    pub fn kalman_gain(&self) -> f64 {
        self.gain
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }
}
