//! Energy estimate of a run and improvement-per-kWh efficiency metrics.
//!
//! Energy is estimated as a constant average power drawn over the elapsed
//! wall-clock time. Hardware counters are not read.

use std::time::Instant;

/// Average power assumed when none is configured, in watts.
pub const DEFAULT_AVG_POWER_W: f64 = 50.0;

/// Energy in Wh drawn at `avg_power_w` over `elapsed_s` seconds.
pub fn energy_wh(elapsed_s: f64, avg_power_w: f64) -> f64 {
    avg_power_w * (elapsed_s.max(0.0) / 3600.0)
}

/// Runs `run` and returns its output with the estimated energy in Wh.
///
/// ```
/// use ca_alns::eval::measure_energy_wh;
///
/// let (value, e_wh) = measure_energy_wh(50.0, || 2 + 2);
/// assert_eq!(value, 4);
/// assert!(e_wh >= 0.0);
/// ```
pub fn measure_energy_wh<T>(avg_power_w: f64, run: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let output = run();
    let e_wh = energy_wh(start.elapsed().as_secs_f64(), avg_power_w);
    tracing::debug!(e_wh, avg_power_w, "estimated run energy");
    (output, e_wh)
}

/// Relative improvement over a reference cost, in percent per kWh.
///
/// Without measurable energy (`e_wh <= 0`) any improvement is infinite and
/// anything else is zero.
pub fn improvement_per_kwh(j_ref: f64, j_alg: f64, e_wh: f64) -> f64 {
    if e_wh <= 0.0 {
        return zero_energy_score(j_ref, j_alg);
    }
    (100.0 * (j_ref - j_alg) / j_ref.max(1e-9)) / (e_wh / 1000.0)
}

/// Absolute cost improvement over a reference, per kWh.
pub fn improvement_abs_per_kwh(j_ref: f64, j_alg: f64, e_wh: f64) -> f64 {
    if e_wh <= 0.0 {
        return zero_energy_score(j_ref, j_alg);
    }
    (j_ref - j_alg) / (e_wh / 1000.0)
}

fn zero_energy_score(j_ref: f64, j_alg: f64) -> f64 {
    if j_alg < j_ref {
        f64::INFINITY
    } else {
        0.0
    }
}
