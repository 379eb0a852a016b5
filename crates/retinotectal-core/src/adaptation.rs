use crate::constants::ADAPTATION_DECIMALS;

/// Round to the fixed number of decimals used for adapted signal levels.
/// The value is rounded through its decimal representation, not by scaling.
pub fn round_fixed(value: f64) -> f64 {
    format!("{:.*}", ADAPTATION_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// Adaptation coefficient from a window of potentials, oldest first.
///
/// Newer samples weigh more: sample `k` (1-based) has weight `k`, so the
/// argument of the logarithm is a recency-weighted mean of `|p|`.
pub fn adaptation_coefficient(window: &[f64], mu: f64) -> f64 {
    if window.is_empty() {
        return 1.0;
    }
    let (weighted, weights) = window
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, norm), (i, p)| {
            let k = (i + 1) as f64;
            (sum + k * p.abs(), norm + k)
        });
    round_fixed(1.0 + (1.0 + mu * weighted / weights).ln())
}

/// Spring force pulling `current` back toward its `start` baseline.
pub fn reset_force(start: f64, current: f64, lambda: f64) -> f64 {
    lambda * (start - current)
}

/// Adapted signal level, floored at zero.
pub fn adapt(current: f64, coefficient: f64, reset: f64) -> f64 {
    round_fixed((current * coefficient + reset).max(0.0))
}
