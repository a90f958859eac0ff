//! Core types and fixed-point helpers for percentage arithmetic.
//!
//! Percentages are exposed as `f64`, but every engine result is settled in
//! hundredths of a percent so that `33.34 + 33.33 + 33.33` really is `100.00`.

/// Asset identifier as typed by the user. Empty means "not chosen yet".
pub type Symbol = String;

/// What cash plus every entry adds up to in a complete allocation.
pub const FULL_ALLOCATION: f64 = 100.0;

/// Largest distance from [`FULL_ALLOCATION`] the validation gate accepts.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// [`FULL_ALLOCATION`] in hundredths of a percent.
pub(crate) const FULL_UNITS: i64 = 100_00;

/// Map any input onto `[0, 100]`. NaN and negatives become 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, FULL_ALLOCATION)
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage → hundredths, clamped to `[0, 100]`.
pub(crate) fn to_units(value: f64) -> i64 {
    (clamp_percent(value) * 100.0).round() as i64
}

/// Hundredths → percentage.
pub(crate) fn from_units(units: i64) -> f64 {
    units as f64 / 100.0
}

/// Settle raw percentages into hundredths summing exactly to `target`.
///
/// Uses largest-remainder rounding: every value is floored, then the units
/// still missing go to the values with the largest fractional parts (ties go
/// to the earlier index). Non-finite or negative raw values count as 0.
pub(crate) fn settle(raw: &[f64], target: i64) -> Vec<i64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let target = target.max(0);

    let scaled: Vec<f64> = raw
        .iter()
        .map(|&v| if v.is_finite() && v > 0.0 { v * 100.0 } else { 0.0 })
        .collect();
    let mut units: Vec<i64> = scaled.iter().map(|v| v.floor() as i64).collect();

    let mut order: Vec<usize> = (0..raw.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = scaled[a] - scaled[a].floor();
        let fb = scaled[b] - scaled[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });

    let mut diff = target - units.iter().sum::<i64>();

    let mut i = 0;
    while diff > 0 {
        units[order[i % order.len()]] += 1;
        diff -= 1;
        i += 1;
    }

    // Overshoot only comes from float error; take it back from the smallest
    // remainders first.
    let mut j = order.len();
    while diff < 0 {
        j = if j == 0 { order.len() - 1 } else { j - 1 };
        let k = order[j];
        if units[k] > 0 {
            units[k] -= 1;
            diff += 1;
        }
    }

    units
}
