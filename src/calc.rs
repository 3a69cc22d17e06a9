//! Pure numeric helpers used by transition guards and actuator collaborators.
//!
//! These functions never fail. Degenerate inputs produce non-finite values
//! or the [`INVALID`] sentinel, and callers decide what that means.

/// Specific heat capacity of water in J/(kg·°C).
pub const SPECIFIC_HEAT_WATER: f64 = 4186.0;

/// Sentinel returned by [`cooling_constant`] and [`map_range`] when their
/// inputs are out of domain.
pub const INVALID: f64 = -1.0;

/// Seconds needed to heat `volume_liters` of water from `initial_c` to
/// `final_c` with a `power_watts` element, assuming 1 L = 1 kg and no losses.
///
/// Zero power yields an infinite (or NaN) time; callers must treat a
/// non-finite result as "not ready".
pub fn heating_time_seconds(
    volume_liters: f64,
    power_watts: f64,
    initial_c: f64,
    final_c: f64,
) -> f64 {
    let heat_joules = volume_liters * SPECIFIC_HEAT_WATER * (final_c - initial_c);
    heat_joules / power_watts
}

/// Newton cooling constant `k` from two temperature observations `elapsed_s`
/// seconds apart, given the ambient temperature.
///
/// Returns [`INVALID`] if either observation is at or below ambient, if
/// `elapsed_s <= 0`, or if the temperature ratio is not positive.
pub fn cooling_constant(initial_c: f64, later_c: f64, ambient_c: f64, elapsed_s: f64) -> f64 {
    if later_c <= ambient_c || initial_c <= ambient_c || elapsed_s <= 0.0 {
        return INVALID;
    }

    let ratio = (later_c - ambient_c) / (initial_c - ambient_c);
    if ratio <= 0.0 {
        return INVALID;
    }

    -ratio.ln() / elapsed_s
}

/// Linearly map `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping. Returns [`INVALID`] when the input range is empty.
pub fn map_range(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let run = in_max - in_min;
    if run == 0.0 {
        return INVALID;
    }
    (x - in_min) * (out_max - out_min) / run + out_min
}
