//! Folding a limit-check report into one bounded security score.

use gridsec_core::ScoreWeights;

use crate::detect::LimitCheckReport;

/// Weighted scalar loss for one report.
///
/// Zero exactly when the report carries no violations and no penalty mass;
/// unbounded above.
pub fn security_loss(report: &LimitCheckReport, weights: &ScoreWeights) -> f64 {
    weights.voltage_violation * report.n_voltage as f64
        + weights.thermal_violation * report.n_thermal as f64
        + weights.voltage_margin * report.voltage_margin_penalty.value()
        + weights.thermal_overload * report.thermal_overload_penalty
}

/// Security score in (0, 1]: `1 / (1 + loss)`.
///
/// The reciprocal form bounds the score without clamping: strictly
/// decreasing in every loss term, exactly 1.0 at zero loss, and
/// asymptotically approaching 0 as loss grows.
pub fn security_score(report: &LimitCheckReport, weights: &ScoreWeights) -> f64 {
    1.0 / (1.0 + security_loss(report, weights))
}
