//! Ramp productivity curve.
//!
//! A placement does not produce at full rate from its first day: it climbs
//! for a few days, peaks on day 4, sags once it overstays its natural
//! engagement window and then settles at full value for long runs.
//!
//! Multipliers are kept as integer basis points (`1.0 = 10_000`) so that
//! model coefficients stay exact integers.
//!
//! | offset | multiplier |
//! |--------|-----------|
//! | 0 | 0.0000 |
//! | 1 | 0.5555 |
//! | 2 | 0.7788 |
//! | 3 | 0.9930 |
//! | 4 | 1.0000 |
//! | 5 | 0.5547 |
//! | 6 | 0.4201 |
//! | 7 | 0.2962 |
//! | ≥8 | 1.0000 |

/// Fixed-point scale of the multipliers (`1.0`).
pub const SCALE: i64 = 10_000;

/// Largest `productivity_ref` whose scaled cell contribution fits `i64`.
pub const MAX_PRODUCTIVITY_REF: i64 = i64::MAX / SCALE;

const RAMP: [i64; 8] = [0, 5_555, 7_788, 9_930, 10_000, 5_547, 4_201, 2_962];

/// Multiplier reached once the ramp table is exhausted.
const PLATEAU: i64 = SCALE;

/// Multiplier for `offset` days after the start, in basis points.
pub fn multiplier_bp(offset: usize) -> i64 {
    RAMP.get(offset).copied().unwrap_or(PLATEAU)
}

/// Multiplier for `offset` days after the start.
pub fn multiplier(offset: usize) -> f64 {
    multiplier_bp(offset) as f64 / SCALE as f64
}

/// Scaled contribution of one schedule cell.
///
/// `start_day == 0` is the "not started" sentinel and yields zero for every
/// offset. Real start days are 1-based.
///
/// `productivity_ref` must not exceed [`MAX_PRODUCTIVITY_REF`]; catalogue
/// validation rejects larger values before any model is built.
pub fn contribution_scaled(start_day: i64, offset: usize, productivity_ref: i64) -> i64 {
    if start_day == 0 {
        return 0;
    }
    productivity_ref * multiplier_bp(offset)
}

/// Contribution of one schedule cell in productivity units.
pub fn contribution(start_day: i64, offset: usize, productivity_ref: i64) -> f64 {
    contribution_scaled(start_day, offset, productivity_ref) as f64 / SCALE as f64
}

/// Scaled coefficient vector of a schedule row.
pub fn row_coefficients(start_day: i64, len: usize, productivity_ref: i64) -> Vec<i64> {
    (0..len)
        .map(|offset| contribution_scaled(start_day, offset, productivity_ref))
        .collect()
}

/// Realized productivity of a placement that starts on `start_day` and
/// stays active for `duration` days.
pub fn realized(start_day: i64, duration: i64, productivity_ref: i64) -> f64 {
    let days = duration.max(0) as usize;
    let total: i64 = row_coefficients(start_day, days, productivity_ref)
        .into_iter()
        .sum();
    total as f64 / SCALE as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_table() {
        let expected = [0.0, 0.5555, 0.7788, 0.9930, 1.0, 0.5547, 0.4201, 0.2962];
        for (offset, m) in expected.iter().enumerate() {
            assert!((multiplier(offset) - m).abs() < 1e-12, "offset {offset}");
        }
    }

    #[test]
    fn test_plateau() {
        for offset in [8, 9, 30, 365] {
            assert_eq!(multiplier_bp(offset), SCALE);
        }
    }

    #[test]
    fn test_contribution_key_offsets() {
        assert_eq!(contribution(1, 0, 1000), 0.0);
        assert_eq!(contribution(1, 4, 1000), 1000.0);
        assert_eq!(contribution(3, 8, 1000), 1000.0);
        assert_eq!(contribution(3, 20, 777), 777.0);
    }

    #[test]
    fn test_day_zero_contributes_nothing() {
        for offset in 0..12 {
            assert_eq!(contribution_scaled(0, offset, 5000), 0);
        }
        assert!(row_coefficients(0, 10, 5000).iter().all(|&c| c == 0));
    }

    #[test]
    fn test_row_coefficients() {
        let row = row_coefficients(2, 10, 1);
        assert_eq!(row, vec![0, 5_555, 7_788, 9_930, 10_000, 5_547, 4_201, 2_962, 10_000, 10_000]);
    }

    #[test]
    fn test_realized() {
        // 0 + 0.5555 + 0.7788
        assert!((realized(1, 3, 1000) - 1334.3).abs() < 1e-9);
        assert_eq!(realized(1, 0, 1000), 0.0);
        assert_eq!(realized(0, 5, 1000), 0.0);
    }
}
