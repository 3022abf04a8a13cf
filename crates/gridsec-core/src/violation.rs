//! Violation records and the assessment result returned to callers.

use serde::Serialize;

use crate::units::{MegavoltAmperes, PerUnit};
use crate::{BranchIdx, BusId};

/// A single operating-limit violation found in a power-flow solution.
///
/// Serialized as a tagged union: `{"type": "voltage_low" | "voltage_high" |
/// "thermal", ...}` with per-variant locator and value/limit fields.
/// `severity` is unit-consistent within a variant (per-unit deviation for
/// voltage, fractional overload for thermal) but not comparable across
/// variants without the scorer's weighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    /// Bus voltage below the lower bound; severity is the per-unit shortfall.
    VoltageLow {
        bus: BusId,
        value_pu: PerUnit,
        limit_pu: PerUnit,
        severity: f64,
    },
    /// Bus voltage above the upper bound; severity is the per-unit excess.
    VoltageHigh {
        bus: BusId,
        value_pu: PerUnit,
        limit_pu: PerUnit,
        severity: f64,
    },
    /// Branch apparent power above its thermal rating; severity is the
    /// fractional overload, S / rating − 1.
    Thermal {
        branch_idx: Option<BranchIdx>,
        #[serde(rename = "value_MVA")]
        value_mva: MegavoltAmperes,
        #[serde(rename = "limit_MVA")]
        limit_mva: MegavoltAmperes,
        severity: f64,
    },
}

impl Violation {
    /// Magnitude past the violated threshold, in the variant's native unit.
    pub fn severity(&self) -> f64 {
        match self {
            Violation::VoltageLow { severity, .. }
            | Violation::VoltageHigh { severity, .. }
            | Violation::Thermal { severity, .. } => *severity,
        }
    }

    /// True for either voltage variant.
    pub fn is_voltage(&self) -> bool {
        !matches!(self, Violation::Thermal { .. })
    }
}

/// Aggregate counts, observed voltage extremes, and penalty accumulators
/// for one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssessmentSummary {
    pub n_viol: usize,
    pub n_voltage_viol: usize,
    pub n_thermal_viol: usize,
    /// Lowest voltage observed across all buses, violating or not.
    pub vmin: PerUnit,
    /// Highest voltage observed across all buses, violating or not.
    pub vmax: PerUnit,
    /// Sum of per-unit deviations past the voltage bounds.
    pub v_margin_pen: PerUnit,
    /// Sum of fractional overloads past thermal ratings.
    pub thermal_over_pen: f64,
}

/// The result of assessing one power-flow solution.
///
/// Produced fresh per request and never persisted. `violations` lists all
/// voltage violations (in bus input order) followed by all thermal
/// violations (in branch input order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub ok: bool,
    /// Security score in (0, 1]; 1.0 means no violations at all.
    pub score: f64,
    pub summary: AssessmentSummary,
    pub violations: Vec<Violation>,
}
