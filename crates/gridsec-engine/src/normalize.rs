//! Tolerant normalization of raw power-flow documents.
//!
//! Upstream solvers disagree about what a power-flow result looks like:
//! dictionary-based exports emit lists of keyed mappings, MATPOWER-style
//! exports emit fixed-column numeric matrices, and the voltage key varies in
//! case across toolchains. This module reduces all of them to the canonical
//! records in `gridsec-core`.
//!
//! The tolerance policy lives entirely here:
//! - absent or odd-shaped sections, short matrix rows, non-mapping elements,
//!   and records missing a required field are dropped silently (counted in
//!   [`NormalizeStats`], invisible to the caller);
//! - a value that is present and non-null but not numeric is a fatal
//!   [`GridsecError::InvalidField`] for the whole request — dropping such a
//!   record would mean assessing data we know is wrong.

use serde_json::{Map, Value};

use gridsec_core::{
    BranchFlow, BranchIdx, BusId, BusVoltage, GridsecError, GridsecResult, Megavars,
    MegavoltAmperes, Megawatts, PerUnit,
};

/// MATPOWER bus matrix: identifier column.
const BUS_ID_COL: usize = 0;
/// MATPOWER bus matrix: voltage magnitude column.
const BUS_VM_COL: usize = 7;

/// Voltage keys tried on mapping records, in priority order.
const VOLTAGE_KEYS: [&str; 4] = ["Vm_pu", "Vm", "vm", "VM"];

/// The closed set of shapes a bus section can arrive in, resolved once from
/// the type of the first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusShape {
    /// List of keyed mappings.
    Records,
    /// List of fixed-column numeric rows.
    Matrix,
    /// Anything else; normalizes to no buses.
    Unrecognized,
}

impl BusShape {
    fn of(rows: &[Value]) -> Self {
        match rows.first() {
            Some(Value::Object(_)) => BusShape::Records,
            Some(Value::Array(_)) => BusShape::Matrix,
            _ => BusShape::Unrecognized,
        }
    }
}

/// Counts of records the tolerance policy dropped. Surfaces in debug logs
/// only, never in the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Mapping bus records missing an id or voltage, plus non-mapping
    /// elements inside a record-shaped bus list.
    pub buses_dropped: usize,
    /// Matrix rows shorter than the voltage column, plus non-list rows.
    pub rows_dropped: usize,
    /// Branch entries that were not mappings.
    pub branches_dropped: usize,
}

impl NormalizeStats {
    pub fn total(&self) -> usize {
        self.buses_dropped + self.rows_dropped + self.branches_dropped
    }
}

/// Canonical view of one raw document, plus the drop counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub buses: Vec<BusVoltage>,
    pub branches: Vec<BranchFlow>,
    pub stats: NormalizeStats,
}

/// Normalize the `bus` and `branch` sections of a power-flow document.
///
/// Record order follows input order in both lists; nothing is sorted or
/// deduplicated. An empty bus list is a valid outcome here — whether that is
/// fatal is the orchestrator's decision, not the normalizer's.
pub fn normalize_document(document: &Map<String, Value>) -> GridsecResult<NormalizedInput> {
    let mut stats = NormalizeStats::default();
    let buses = normalize_bus_section(document.get("bus"), &mut stats)?;
    let branches = normalize_branch_section(document.get("branch"), &mut stats)?;
    Ok(NormalizedInput {
        buses,
        branches,
        stats,
    })
}

fn normalize_bus_section(
    section: Option<&Value>,
    stats: &mut NormalizeStats,
) -> GridsecResult<Vec<BusVoltage>> {
    let Some(rows) = section.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut buses = Vec::new();
    match BusShape::of(rows) {
        BusShape::Records => {
            for element in rows {
                match bus_from_record(element)? {
                    Some(bus) => buses.push(bus),
                    None => stats.buses_dropped += 1,
                }
            }
        }
        BusShape::Matrix => {
            for element in rows {
                match bus_from_row(element)? {
                    Some(bus) => buses.push(bus),
                    None => stats.rows_dropped += 1,
                }
            }
        }
        BusShape::Unrecognized => {}
    }
    Ok(buses)
}

fn normalize_branch_section(
    section: Option<&Value>,
    stats: &mut NormalizeStats,
) -> GridsecResult<Vec<BranchFlow>> {
    let Some(rows) = section.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    // Matrix-style branch rows are unsupported: only keyed mappings carry
    // the flow and rating fields the thermal check reads.
    if !matches!(rows.first(), Some(Value::Object(_))) {
        return Ok(Vec::new());
    }

    let mut branches = Vec::new();
    for element in rows {
        match branch_from_record(element)? {
            Some(branch) => branches.push(branch),
            None => stats.branches_dropped += 1,
        }
    }
    Ok(branches)
}

/// Extract one canonical bus from a mapping record.
///
/// `Ok(None)` is the silent-drop channel: non-mapping element, id/voltage
/// key entirely absent, or an explicit `null` under the winning key. `Err`
/// is the fatal channel: a present value that refuses numeric coercion.
fn bus_from_record(element: &Value) -> GridsecResult<Option<BusVoltage>> {
    let Some(record) = element.as_object() else {
        return Ok(None);
    };

    // `bus_i` is consulted only when the `id` key is absent; a present
    // `null` under `id` does not fall through to it. Same rule for the
    // voltage keys: the first present key wins, null or not.
    let id = record
        .get("id")
        .map(|value| ("id", value))
        .or_else(|| record.get("bus_i").map(|value| ("bus_i", value)));
    let vm = VOLTAGE_KEYS
        .iter()
        .find_map(|key| record.get(*key).map(|value| (*key, value)));

    let (Some((id_field, id)), Some((vm_field, vm))) = (id, vm) else {
        return Ok(None);
    };
    if id.is_null() || vm.is_null() {
        return Ok(None);
    }

    let id = coerce_integer(id).ok_or_else(|| invalid("bus", id_field, id))?;
    let vm = coerce_number(vm).ok_or_else(|| invalid("bus", vm_field, vm))?;
    Ok(Some(BusVoltage {
        id: BusId::new(id),
        voltage: PerUnit(vm),
    }))
}

/// Extract one canonical bus from a fixed-column matrix row.
///
/// Rows that are not lists, or too short to carry the voltage column, are
/// dropped. Unlike mapping records, a `null` in a required column is a
/// coercion failure here — the column is positionally present.
fn bus_from_row(element: &Value) -> GridsecResult<Option<BusVoltage>> {
    let Some(row) = element.as_array() else {
        return Ok(None);
    };
    if row.len() <= BUS_VM_COL {
        return Ok(None);
    }

    let id = coerce_integer(&row[BUS_ID_COL])
        .ok_or_else(|| invalid("bus row", "column 0", &row[BUS_ID_COL]))?;
    let vm = coerce_number(&row[BUS_VM_COL])
        .ok_or_else(|| invalid("bus row", "column 7", &row[BUS_VM_COL]))?;
    Ok(Some(BusVoltage {
        id: BusId::new(id),
        voltage: PerUnit(vm),
    }))
}

/// Extract one canonical branch from a mapping record. Every field is
/// independently optional; the detector resolves nullability later.
fn branch_from_record(element: &Value) -> GridsecResult<Option<BranchFlow>> {
    let Some(record) = element.as_object() else {
        return Ok(None);
    };

    Ok(Some(BranchFlow {
        index: optional_integer(record, "idx")?.map(BranchIdx::new),
        active_power: optional_number(record, "Pf_MW")?.map(Megawatts),
        reactive_power: optional_number(record, "Qf_Mvar")?.map(Megavars),
        rating: optional_number(record, "rateA_MVA")?.map(MegavoltAmperes),
    }))
}

fn optional_number(
    record: &Map<String, Value>,
    field: &'static str,
) -> GridsecResult<Option<f64>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_number(value)
            .map(Some)
            .ok_or_else(|| invalid("branch", field, value)),
    }
}

fn optional_integer(
    record: &Map<String, Value>,
    field: &'static str,
) -> GridsecResult<Option<i64>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_integer(value)
            .map(Some)
            .ok_or_else(|| invalid("branch", field, value)),
    }
}

/// Numbers pass through; strings that parse as numbers pass (some exporters
/// stringify their floats); everything else refuses.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Identifier coercion additionally accepts integral floats, because
/// all-float matrix exports report ids as `3.0`. It refuses to truncate a
/// fractional value to an id.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn invalid(entity: &'static str, field: &'static str, value: &Value) -> GridsecError {
    GridsecError::InvalidField {
        entity,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().expect("test document").clone()
    }

    #[test]
    fn test_bus_records_extract_in_order() {
        let document = doc(json!({
            "bus": [
                {"id": 1, "Vm_pu": 1.01},
                {"id": 2, "Vm_pu": 0.99},
                {"id": 3, "Vm_pu": 1.00}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();

        assert_eq!(
            normalized.buses,
            vec![
                BusVoltage::new(1, 1.01),
                BusVoltage::new(2, 0.99),
                BusVoltage::new(3, 1.00),
            ]
        );
        assert_eq!(normalized.stats.total(), 0);
    }

    #[test]
    fn test_bus_i_fallback_when_id_absent() {
        let document = doc(json!({"bus": [{"bus_i": 7, "Vm_pu": 1.02}]}));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(normalized.buses, vec![BusVoltage::new(7, 1.02)]);
    }

    #[test]
    fn test_null_id_does_not_fall_through_to_bus_i() {
        // `id` is present (as null), so `bus_i` is never consulted and the
        // record drops.
        let document = doc(json!({"bus": [{"id": null, "bus_i": 7, "Vm_pu": 1.02}]}));
        let normalized = normalize_document(&document).unwrap();
        assert!(normalized.buses.is_empty());
        assert_eq!(normalized.stats.buses_dropped, 1);
    }

    #[test]
    fn test_voltage_key_priority_order() {
        let document = doc(json!({
            "bus": [
                {"id": 1, "Vm_pu": 1.01, "Vm": 9.0, "vm": 9.0, "VM": 9.0},
                {"id": 2, "Vm": 1.02, "vm": 9.0},
                {"id": 3, "vm": 1.03, "VM": 9.0},
                {"id": 4, "VM": 1.04}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();
        let voltages: Vec<f64> = normalized
            .buses
            .iter()
            .map(|bus| bus.voltage.value())
            .collect();
        assert_eq!(voltages, vec![1.01, 1.02, 1.03, 1.04]);
    }

    #[test]
    fn test_records_missing_fields_drop_silently() {
        let document = doc(json!({
            "bus": [
                {"id": 1, "Vm_pu": 1.00},
                {"id": 2},
                {"Vm_pu": 0.97},
                {"id": 4, "Vm_pu": null},
                {"id": 5, "Vm_pu": 1.01}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(
            normalized.buses,
            vec![BusVoltage::new(1, 1.00), BusVoltage::new(5, 1.01)]
        );
        assert_eq!(normalized.stats.buses_dropped, 3);
    }

    #[test]
    fn test_non_mapping_elements_in_record_list_drop() {
        let document = doc(json!({
            "bus": [
                {"id": 1, "Vm_pu": 1.00},
                42,
                [1, 2, 3],
                {"id": 2, "Vm_pu": 0.98}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(normalized.buses.len(), 2);
        assert_eq!(normalized.stats.buses_dropped, 2);
    }

    #[test]
    fn test_numeric_strings_coerce() {
        let document = doc(json!({"bus": [{"id": " 3 ", "Vm_pu": "1.02"}]}));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(normalized.buses, vec![BusVoltage::new(3, 1.02)]);
    }

    #[test]
    fn test_non_numeric_voltage_is_fatal() {
        let document = doc(json!({"bus": [{"id": 1, "vm": "abc"}]}));
        assert_eq!(
            normalize_document(&document),
            Err(GridsecError::InvalidField {
                entity: "bus",
                field: "vm",
                value: "\"abc\"".to_string(),
            })
        );
    }

    #[test]
    fn test_boolean_id_is_fatal() {
        let document = doc(json!({"bus": [{"id": true, "Vm_pu": 1.0}]}));
        let err = normalize_document(&document).unwrap_err();
        assert_eq!(err.reason(), "invalid_field");
    }

    #[test]
    fn test_fractional_id_is_fatal() {
        // Truncating 3.7 to bus 3 would silently mislabel the violation.
        let document = doc(json!({"bus": [{"id": 3.7, "Vm_pu": 1.0}]}));
        assert!(normalize_document(&document).is_err());
    }

    #[test]
    fn test_matrix_rows_extract_id_and_voltage_columns() {
        let document = doc(json!({
            "bus": [
                [1.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.01, 0.0],
                [2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.93]
            ]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(
            normalized.buses,
            vec![BusVoltage::new(1, 1.01), BusVoltage::new(2, 0.93)]
        );
    }

    #[test]
    fn test_short_and_non_list_rows_drop() {
        let document = doc(json!({
            "bus": [
                [1, 0, 0, 0, 0, 0, 0, 1.0],
                [2, 0, 0, 0, 0, 0, 0],
                "noise",
                [3, 0, 0, 0, 0, 0, 0, 0.97]
            ]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(
            normalized.buses,
            vec![BusVoltage::new(1, 1.0), BusVoltage::new(3, 0.97)]
        );
        assert_eq!(normalized.stats.rows_dropped, 2);
    }

    #[test]
    fn test_matrix_null_column_is_fatal() {
        let document = doc(json!({"bus": [[null, 0, 0, 0, 0, 0, 0, 1.0]]}));
        assert_eq!(
            normalize_document(&document),
            Err(GridsecError::InvalidField {
                entity: "bus row",
                field: "column 0",
                value: "null".to_string(),
            })
        );

        let document = doc(json!({"bus": [[1, 0, 0, 0, 0, 0, 0, "bad"]]}));
        let err = normalize_document(&document).unwrap_err();
        assert!(err.to_string().contains("column 7"));
    }

    #[test]
    fn test_unrecognized_bus_shapes_yield_empty() {
        for section in [
            json!({}),
            json!({"bus": null}),
            json!({"bus": "not a list"}),
            json!({"bus": []}),
            json!({"bus": [42, 43]}),
            json!({"bus": {"0": {"id": 1, "Vm_pu": 1.0}}}),
        ] {
            let normalized = normalize_document(&doc(section)).unwrap();
            assert!(normalized.buses.is_empty());
        }
    }

    #[test]
    fn test_branch_records_extract_all_fields() {
        let document = doc(json!({
            "branch": [
                {"idx": 3, "Pf_MW": 80.0, "Qf_Mvar": 60.0, "rateA_MVA": 90.0}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();

        assert_eq!(
            normalized.branches,
            vec![BranchFlow {
                index: Some(BranchIdx::new(3)),
                active_power: Some(Megawatts(80.0)),
                reactive_power: Some(Megavars(60.0)),
                rating: Some(MegavoltAmperes(90.0)),
            }]
        );
    }

    #[test]
    fn test_branch_fields_independently_nullable() {
        let document = doc(json!({
            "branch": [
                {"idx": null, "Pf_MW": 10.0},
                {"Qf_Mvar": 5.0, "rateA_MVA": null},
                {}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();

        assert_eq!(normalized.branches.len(), 3);
        assert_eq!(
            normalized.branches[0],
            BranchFlow {
                index: None,
                active_power: Some(Megawatts(10.0)),
                reactive_power: None,
                rating: None,
            }
        );
        assert_eq!(
            normalized.branches[1],
            BranchFlow {
                index: None,
                active_power: None,
                reactive_power: Some(Megavars(5.0)),
                rating: None,
            }
        );
        assert_eq!(normalized.branches[2], BranchFlow::default());
    }

    #[test]
    fn test_non_numeric_branch_flow_is_fatal() {
        let document = doc(json!({
            "bus": [{"id": 1, "Vm_pu": 1.0}],
            "branch": [{"idx": 1, "Pf_MW": "lots"}]
        }));
        assert_eq!(
            normalize_document(&document),
            Err(GridsecError::InvalidField {
                entity: "branch",
                field: "Pf_MW",
                value: "\"lots\"".to_string(),
            })
        );
    }

    #[test]
    fn test_matrix_branch_section_yields_empty() {
        // List-row branch data carries no recognizable flow fields.
        let document = doc(json!({
            "branch": [[1, 2, 0.01, 0.1, 0.0, 250.0]]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert!(normalized.branches.is_empty());
        assert_eq!(normalized.stats.branches_dropped, 0);
    }

    #[test]
    fn test_non_mapping_branch_elements_drop() {
        let document = doc(json!({
            "branch": [
                {"idx": 1, "Pf_MW": 1.0, "Qf_Mvar": 1.0, "rateA_MVA": 10.0},
                "noise",
                {"idx": 2}
            ]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(normalized.branches.len(), 2);
        assert_eq!(normalized.stats.branches_dropped, 1);
    }

    #[test]
    fn test_stats_total_spans_both_sections() {
        let document = doc(json!({
            "bus": [{"id": 1, "Vm_pu": 1.0}, {"id": 2}],
            "branch": [{"idx": 1}, false]
        }));
        let normalized = normalize_document(&document).unwrap();
        assert_eq!(normalized.stats.buses_dropped, 1);
        assert_eq!(normalized.stats.branches_dropped, 1);
        assert_eq!(normalized.stats.total(), 2);
    }
}
