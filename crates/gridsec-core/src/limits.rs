//! Per-request operating limits and the scoring weight configuration.

use serde::{Deserialize, Serialize};

use crate::units::PerUnit;

/// Operating limits applied to one assessment request.
///
/// Callers may supply any subset of the fields; the rest fill in from the
/// defaults below. Immutable for the duration of a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Lower bus-voltage bound in per-unit.
    #[serde(default = "default_vmin")]
    pub vmin: PerUnit,
    /// Upper bus-voltage bound in per-unit.
    #[serde(default = "default_vmax")]
    pub vmax: PerUnit,
    /// Slack added to thermal ratings so flows sitting exactly on their
    /// rating do not flag on floating-point noise. Not an engineering margin.
    #[serde(default = "default_thermal_eps")]
    pub thermal_eps: f64,
}

fn default_vmin() -> PerUnit {
    PerUnit(0.95)
}

fn default_vmax() -> PerUnit {
    PerUnit(1.05)
}

fn default_thermal_eps() -> f64 {
    1e-6
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            vmin: default_vmin(),
            vmax: default_vmax(),
            thermal_eps: default_thermal_eps(),
        }
    }
}

/// Multipliers that fold violation counts and penalty magnitudes into the
/// scalar loss behind the security score.
///
/// The defaults are a deliberately simple heuristic, not a calibrated
/// engineering model. They live in configuration rather than as embedded
/// constants precisely so a refined weighting scheme can replace them
/// without touching the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Flat loss per voltage violation.
    #[serde(default = "default_voltage_violation")]
    pub voltage_violation: f64,
    /// Flat loss per thermal violation.
    #[serde(default = "default_thermal_violation")]
    pub thermal_violation: f64,
    /// Loss per per-unit of accumulated voltage deviation.
    #[serde(default = "default_voltage_margin")]
    pub voltage_margin: f64,
    /// Loss per unit of accumulated fractional overload.
    #[serde(default = "default_thermal_overload")]
    pub thermal_overload: f64,
}

fn default_voltage_violation() -> f64 {
    1.0
}

fn default_thermal_violation() -> f64 {
    0.8
}

fn default_voltage_margin() -> f64 {
    5.0
}

fn default_thermal_overload() -> f64 {
    2.0
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            voltage_violation: default_voltage_violation(),
            thermal_violation: default_thermal_violation(),
            voltage_margin: default_voltage_margin(),
            thermal_overload: default_thermal_overload(),
        }
    }
}
