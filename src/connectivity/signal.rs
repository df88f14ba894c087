//! Log-distance path loss and SNR link budget.

use super::config::SignalParams;

/// Path loss in dB at distance `d`.
///
/// `PL0 + 10 n log10(d)` for `d > 1`, `PL0` otherwise. The exponent is the
/// line-of-sight one below `los_distance` and the NLoS one beyond.
pub fn path_loss_db(d: f64, params: &SignalParams) -> f64 {
    if d <= 1.0 {
        return params.pl0_db;
    }
    let n = if d < params.los_distance {
        params.los_exponent
    } else {
        params.nlos_exponent
    };
    params.pl0_db + 10.0 * n * d.log10()
}

/// Received power in dBm at distance `d`.
pub fn rx_power_dbm(d: f64, params: &SignalParams) -> f64 {
    params.tx_power_dbm - path_loss_db(d, params)
}

fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Signal-to-noise(-plus-interference) ratio in dB.
pub fn snr_db(rx_dbm: f64, noise_dbm: f64, interference_dbm: Option<f64>) -> f64 {
    let interference_mw = interference_dbm.map_or(0.0, dbm_to_mw);
    let denom = (dbm_to_mw(noise_dbm) + interference_mw).max(1e-12);
    10.0 * (dbm_to_mw(rx_dbm) / denom).log10()
}

/// Link decision from the SNR measured in each direction.
pub fn link_ok(snr_uv: f64, snr_vu: f64, params: &SignalParams) -> bool {
    let th = params.snr_threshold_db;
    if params.bidirectional {
        snr_uv >= th && snr_vu >= th
    } else {
        snr_uv >= th || snr_vu >= th
    }
}

/// SNR of a link of length `d` under `params`. The channel is reciprocal,
/// so both directions share this value.
pub fn link_snr_db(d: f64, params: &SignalParams) -> f64 {
    snr_db(
        rx_power_dbm(d.max(1.0), params),
        params.noise_dbm,
        params.interference_dbm,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_loss_short_distance() {
        let p = SignalParams::default();
        assert_eq!(path_loss_db(0.5, &p), p.pl0_db);
        assert_eq!(path_loss_db(1.0, &p), p.pl0_db);
    }

    #[test]
    fn test_path_loss_exponent_switch() {
        let p = SignalParams::default();
        let los = path_loss_db(100.0, &p);
        assert!((los - (32.4 + 10.0 * 2.1 * 2.0)).abs() < 1e-9);
        let nlos = path_loss_db(1000.0, &p);
        assert!((nlos - (32.4 + 10.0 * 3.0 * 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_snr_without_interference() {
        // rx -60 dBm over -96 dBm noise: 36 dB
        assert!((snr_db(-60.0, -96.0, None) - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_interference_lowers_snr() {
        let clean = snr_db(-60.0, -96.0, None);
        let noisy = snr_db(-60.0, -96.0, Some(-96.0));
        // Equal noise and interference doubles the floor: ~3 dB loss.
        assert!((clean - noisy - 10.0 * 2f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_bidirectional_requires_both_directions() {
        let p = SignalParams::default();
        assert!(link_ok(10.0, 10.0, &p));
        assert!(!link_ok(10.0, 5.9, &p));
        assert!(!link_ok(5.9, 10.0, &p));

        let one_way = SignalParams {
            bidirectional: false,
            ..p
        };
        assert!(link_ok(10.0, 5.9, &one_way));
        assert!(!link_ok(5.0, 5.9, &one_way));
    }

    #[test]
    fn test_snr_decreases_with_distance() {
        let p = SignalParams::default();
        assert!(link_snr_db(100.0, &p) > link_snr_db(200.0, &p));
    }
}
