//! Voltage and thermal limit checks over canonical records.

use gridsec_core::{AssessmentSummary, BranchFlow, BusVoltage, Limits, PerUnit, Violation};

/// Everything one limit sweep learns about an operating point.
///
/// `violations` lists all voltage violations in bus input order, then all
/// thermal violations in branch input order. The observed voltage extremes
/// are tracked across every bus, violating or not, so a clean solution still
/// reports where its voltage profile sits.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitCheckReport {
    pub violations: Vec<Violation>,
    pub n_voltage: usize,
    pub n_thermal: usize,
    pub observed_vmin: PerUnit,
    pub observed_vmax: PerUnit,
    /// Sum of per-unit deviations past either voltage bound.
    pub voltage_margin_penalty: PerUnit,
    /// Sum of fractional overloads past thermal ratings.
    pub thermal_overload_penalty: f64,
}

impl LimitCheckReport {
    /// The wire-format summary block.
    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            n_viol: self.violations.len(),
            n_voltage_viol: self.n_voltage,
            n_thermal_viol: self.n_thermal,
            vmin: self.observed_vmin,
            vmax: self.observed_vmax,
            v_margin_pen: self.voltage_margin_penalty,
            thermal_over_pen: self.thermal_overload_penalty,
        }
    }
}

/// Classify every bus and branch against `limits`.
///
/// Pure function of its inputs; nothing persists between calls. Voltage
/// checks are mutually exclusive per bus (a value cannot be below the lower
/// and above the upper bound at once) and exactly-at-bound values are
/// compliant. Branches that fail the thermal preconditions are skipped
/// without comment — see [`BranchFlow::thermal_loading`].
pub fn check_limits(
    buses: &[BusVoltage],
    branches: &[BranchFlow],
    limits: &Limits,
) -> LimitCheckReport {
    let mut violations = Vec::new();
    let mut observed_vmin = PerUnit(f64::INFINITY);
    let mut observed_vmax = PerUnit(f64::NEG_INFINITY);
    let mut voltage_margin_penalty = PerUnit::ZERO;

    for bus in buses {
        observed_vmin = observed_vmin.min(bus.voltage);
        observed_vmax = observed_vmax.max(bus.voltage);

        if bus.voltage < limits.vmin {
            let shortfall = limits.vmin - bus.voltage;
            voltage_margin_penalty = voltage_margin_penalty + shortfall;
            violations.push(Violation::VoltageLow {
                bus: bus.id,
                value_pu: bus.voltage,
                limit_pu: limits.vmin,
                severity: shortfall.value(),
            });
        } else if bus.voltage > limits.vmax {
            let excess = bus.voltage - limits.vmax;
            voltage_margin_penalty = voltage_margin_penalty + excess;
            violations.push(Violation::VoltageHigh {
                bus: bus.id,
                value_pu: bus.voltage,
                limit_pu: limits.vmax,
                severity: excess.value(),
            });
        }
    }

    let n_voltage = violations.len();
    let mut thermal_overload_penalty = 0.0;

    for branch in branches {
        let Some((s, rating)) = branch.thermal_loading() else {
            continue;
        };
        if s.value() > rating.value() + limits.thermal_eps {
            let severity = s / rating - 1.0;
            thermal_overload_penalty += severity;
            violations.push(Violation::Thermal {
                branch_idx: branch.index,
                value_mva: s,
                limit_mva: rating,
                severity,
            });
        }
    }
    let n_thermal = violations.len() - n_voltage;

    LimitCheckReport {
        violations,
        n_voltage,
        n_thermal,
        observed_vmin,
        observed_vmax,
        voltage_margin_penalty,
        thermal_overload_penalty,
    }
}
